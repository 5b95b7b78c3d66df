use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use gamewire_packet::Packet;
use gamewire_registry::json::value_to_json;
use gamewire_registry::TypeRegistry;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct PacketOutput<'a> {
    id: u8,
    name: Option<&'a str>,
    value: serde_json::Value,
    source: &'a str,
    timestamp: String,
}

/// Print one decoded packet. `source` names where it came from (a
/// connection id, or `stdin`).
pub fn print_packet(packet: &Packet, registry: &TypeRegistry, source: &str, format: OutputFormat) {
    let name = registry.name_of(packet.id);
    let value = value_to_json(&packet.obj);
    match format {
        OutputFormat::Json => {
            let out = PacketOutput {
                id: packet.id.get(),
                name,
                value,
                source,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ID", "NAME", "SOURCE", "VALUE"])
                .add_row(vec![
                    packet.id.to_string(),
                    name.unwrap_or("-").to_string(),
                    source.to_string(),
                    value.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "id={} ({}) source={} value={}",
                packet.id,
                name.unwrap_or("unnamed"),
                source,
                value
            );
        }
    }
}

#[derive(Serialize)]
struct EntryOutput<'a> {
    id: u8,
    name: &'a str,
    shape: String,
}

pub fn print_registry(registry: &TypeRegistry, format: OutputFormat) {
    let entries: Vec<EntryOutput<'_>> = registry
        .all()
        .map(|(id, entry)| EntryOutput {
            id: id.get(),
            name: &entry.name,
            shape: entry.shape.describe(),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&serde_json::json!({
                    "sentinel": registry.config().sentinel.get(),
                    "packets": entries,
                }))
                .unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ID", "NAME", "SHAPE"]);
            for entry in &entries {
                table.add_row(vec![
                    entry.id.to_string(),
                    entry.name.to_string(),
                    entry.shape.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for entry in &entries {
                println!("{:>3}  {:<16} {}", entry.id, entry.name, entry.shape);
            }
            println!("sentinel: {}", registry.config().sentinel);
        }
    }
}

/// Print an encoded frame as hex.
pub fn print_frame_hex(id: u8, wire: &[u8], format: OutputFormat) {
    let encoded = hex::encode(wire);
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "id": id, "size": wire.len(), "hex": encoded })
        ),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ID", "SIZE", "HEX"])
                .add_row(vec![id.to_string(), wire.len().to_string(), encoded]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{encoded}"),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
