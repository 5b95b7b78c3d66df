use gamewire_packet::Packet;
use gamewire_registry::RegistryHandle;
use gamewire_session::connect_tcp;

use crate::cmd::{parse_duration, parse_payload, SendArgs};
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_packet, OutputFormat};

pub fn run(args: SendArgs, registry: RegistryHandle, format: OutputFormat) -> CliResult<i32> {
    let wait_timeout = parse_duration(&args.wait_timeout)?;
    let value = parse_payload(&registry, args.id, &args.json)?;

    let conn = connect_tcp(args.addr.as_str(), RegistryHandle::clone(&registry))
        .map_err(|err| session_error("connect failed", err))?;
    conn.send(Packet::new(args.id, value))
        .map_err(|err| session_error("send failed", err))?;

    if args.wait {
        let packet = conn
            .recv_timeout(wait_timeout)
            .map_err(|err| session_error("receive failed", err))?;
        print_packet(&packet, &registry, conn.id(), format);
    }

    Ok(SUCCESS)
}
