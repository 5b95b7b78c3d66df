use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gamewire_registry::RegistryHandle;
use gamewire_session::{ConnectionListener, SessionConfig, SessionError};
use tracing::info;

use crate::cmd::ServeArgs;
use crate::exit::{session_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_packet, OutputFormat};

// How often a quiet connection checks for Ctrl-C.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub fn run(args: ServeArgs, registry: RegistryHandle, format: OutputFormat) -> CliResult<i32> {
    let config = SessionConfig {
        drop_unknown_packets: args.drop_unknown,
        ..SessionConfig::default()
    };
    let listener = ConnectionListener::bind_tcp(args.addr.as_str(), RegistryHandle::clone(&registry))
        .map_err(|err| session_error("bind failed", err))?
        .with_config(config);
    if let Some(addr) = listener.local_addr() {
        info!(%addr, echo = args.echo, "serving");
    }

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let conn = listener
            .accept()
            .map_err(|err| session_error("accept failed", err))?;

        while running.load(Ordering::SeqCst) {
            let packet = match conn.recv_timeout(POLL_INTERVAL) {
                Ok(packet) => packet,
                Err(SessionError::Timeout(_)) => continue,
                Err(SessionError::Closed) => break,
                Err(err) => return Err(session_error("receive failed", err)),
            };

            print_packet(&packet, &registry, conn.id(), format);
            printed = printed.saturating_add(1);

            if args.echo {
                conn.send(packet)
                    .map_err(|err| session_error("echo failed", err))?;
            }

            if let Some(count) = args.count {
                if printed >= count {
                    return Ok(SUCCESS);
                }
            }
        }
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
