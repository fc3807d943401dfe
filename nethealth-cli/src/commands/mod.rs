//! Command handler modules for the CLI.

mod device;
mod export;
mod poll;

use std::path::Path;

use crate::cli::Commands;
use crate::error::CliError;

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(
    registry_path: &Path,
    settings_path: Option<&Path>,
    command: Commands,
) -> Result<(), CliError> {
    match command {
        Commands::Poll { format } => poll::cmd_poll(registry_path, settings_path, format),
        Commands::Device { name } => device::cmd_device(registry_path, settings_path, &name),
        Commands::Export { output_dir } => {
            export::cmd_export(registry_path, settings_path, &output_dir)
        }
    }
}
