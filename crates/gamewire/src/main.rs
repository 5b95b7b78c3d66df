mod cmd;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;
use gamewire_packet::catalog;
use gamewire_registry::TypeRegistry;

use crate::cmd::Command;
use crate::exit::{registry_error, CliResult};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "gamewire", version, about = "Game packet codec CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Registry manifest (JSON) to use instead of the built-in catalog.
    #[arg(long, value_name = "FILE", env = "GAMEWIRE_REGISTRY", global = true)]
    registry: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn load_registry(path: Option<&PathBuf>) -> CliResult<TypeRegistry> {
    match path {
        Some(path) => TypeRegistry::from_manifest_file(path)
            .map_err(|err| registry_error(&format!("failed loading {}", path.display()), err)),
        None => catalog::registry().map_err(|err| registry_error("catalog", err)),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = load_registry(cli.registry.as_ref())
        .and_then(|registry| cmd::run(cli.command, registry, format));

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
