use std::time::Duration;

use clap::{Args, Subcommand};
use gamewire_registry::{Shape, TypeRegistry};

use crate::exit::{CliError, CliResult, DATA_INVALID, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod registry;
pub mod send;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode one packet from JSON and print the frame as hex.
    Encode(EncodeArgs),
    /// Decode frames from hex (argument or stdin).
    Decode(DecodeArgs),
    /// List registered packets.
    Registry,
    /// Accept TCP connections and print decoded packets.
    Serve(ServeArgs),
    /// Send a single packet.
    Send(SendArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, registry: TypeRegistry, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, &registry, format),
        Command::Decode(args) => decode::run(args, &registry, format),
        Command::Registry => registry::run(&registry, format),
        Command::Serve(args) => serve::run(args, registry.into_handle(), format),
        Command::Send(args) => send::run(args, registry.into_handle(), format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Packet id.
    #[arg(long)]
    pub id: u8,
    /// Payload as JSON, converted through the registered shape.
    #[arg(long)]
    pub json: String,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Hex-encoded frames. Reads stdin when omitted.
    pub hex: Option<String>,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// TCP address to listen on.
    pub addr: String,
    /// Exit after receiving N packets.
    #[arg(long)]
    pub count: Option<usize>,
    /// Send every received packet back to its sender.
    #[arg(long)]
    pub echo: bool,
    /// Skip frames with unknown ids instead of closing the connection.
    #[arg(long)]
    pub drop_unknown: bool,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// TCP address to connect to.
    pub addr: String,
    /// Packet id.
    #[arg(long)]
    pub id: u8,
    /// Payload as JSON, converted through the registered shape.
    #[arg(long)]
    pub json: String,
    /// Wait for one response packet and print it.
    #[arg(long)]
    pub wait: bool,
    /// Maximum time to wait for response when --wait is set (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub wait_timeout: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `--json` and build a value of the shape registered for `id`.
/// Unregistered ids take the value as the JSON describes it.
pub(crate) fn parse_payload(
    registry: &TypeRegistry,
    id: u8,
    json: &str,
) -> CliResult<gamewire_value::Value> {
    let doc: serde_json::Value = serde_json::from_str(json)
        .map_err(|err| CliError::new(USAGE, format!("--json is not valid JSON: {err}")))?;
    let any = Shape::Any;
    let shape = registry.lookup(id).unwrap_or(&any);
    shape.value_from_json(&doc).map_err(|err| {
        CliError::new(
            DATA_INVALID,
            format!("payload does not fit packet {id} ({}): {err}", shape.describe()),
        )
    })
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
