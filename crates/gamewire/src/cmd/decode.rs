use std::io::{Cursor, Read};

use gamewire_packet::Decoder;
use gamewire_registry::TypeRegistry;
use tracing::warn;

use crate::cmd::DecodeArgs;
use crate::exit::{io_error, packet_error, CliError, CliResult, FAILURE, SUCCESS, USAGE};
use crate::output::{print_packet, OutputFormat};

pub fn run(args: DecodeArgs, registry: &TypeRegistry, format: OutputFormat) -> CliResult<i32> {
    let text = match args.hex {
        Some(text) => text,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|err| io_error("failed reading stdin", err))?;
            text
        }
    };
    let wire = parse_hex(&text)?;

    let mut decoder = Decoder::new(Cursor::new(wire), registry);
    let mut decoded = 0usize;
    loop {
        match decoder.decode() {
            Ok(packet) => {
                print_packet(&packet, registry, "input", format);
                decoded += 1;
            }
            Err(err) if err.is_connection_closed() => break,
            Err(err) if !err.is_fatal() => warn!(error = %err, "skipping packet"),
            Err(err) => return Err(packet_error("decode failed", err)),
        }
    }

    Ok(if decoded > 0 { SUCCESS } else { FAILURE })
}

/// Accepts whitespace between bytes and an optional `0x` prefix.
fn parse_hex(text: &str) -> CliResult<Vec<u8>> {
    let compact: String = text.split_whitespace().collect();
    let digits = compact.strip_prefix("0x").unwrap_or(&compact);
    hex::decode(digits).map_err(|err| CliError::new(USAGE, format!("input is not valid hex: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_tolerates_spacing() {
        assert_eq!(
            parse_hex("00 00 00 02\n00 08").unwrap(),
            vec![0, 0, 0, 2, 0, 8]
        );
        assert_eq!(parse_hex("0x000000020008").unwrap().len(), 6);
        assert_eq!(parse_hex("0g").unwrap_err().code, USAGE);
    }
}
