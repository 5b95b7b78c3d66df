use gamewire_registry::TypeRegistry;

use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_registry, OutputFormat};

pub fn run(registry: &TypeRegistry, format: OutputFormat) -> CliResult<i32> {
    print_registry(registry, format);
    Ok(SUCCESS)
}
