use gamewire_registry::TypeRegistry;

use crate::cmd::{parse_payload, EncodeArgs};
use crate::exit::{packet_error, CliResult, SUCCESS};
use crate::output::{print_frame_hex, OutputFormat};

pub fn run(args: EncodeArgs, registry: &TypeRegistry, format: OutputFormat) -> CliResult<i32> {
    let value = parse_payload(registry, args.id, &args.json)?;
    let wire = encode_to_vec(registry, args.id, &value)?;
    print_frame_hex(args.id, &wire, format);
    Ok(SUCCESS)
}

fn encode_to_vec(
    registry: &TypeRegistry,
    id: u8,
    value: &gamewire_value::Value,
) -> CliResult<Vec<u8>> {
    let mut wire = Vec::new();
    gamewire_packet::io::write(&mut wire, id, value, registry)
        .map_err(|err| packet_error("encode failed", err))?;
    Ok(wire)
}
