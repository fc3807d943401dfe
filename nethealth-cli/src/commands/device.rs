//! Single-device poll command.

use std::path::Path;

use nethealth_core::{DeviceProber, SshGateway};

use crate::error::CliError;
use crate::util::{create_runtime, load_registry, load_settings};

/// Device command handler: polls one device and prints its record as JSON
pub fn cmd_device(
    registry_path: &Path,
    settings_path: Option<&Path>,
    name: &str,
) -> Result<(), CliError> {
    let registry = load_registry(registry_path)?;
    let settings = load_settings(settings_path)?;

    let config = registry
        .get(name)
        .ok_or_else(|| CliError::DeviceNotFound(name.to_string()))?;

    let runtime = create_runtime()?;
    let prober = DeviceProber::with_command_timeout(settings.effective_command_timeout());
    let gateway = SshGateway::new();

    let record = runtime.block_on(prober.probe(config, &gateway));
    let body = serde_json::to_string_pretty(&record).map_err(|e| CliError::Export(e.to_string()))?;
    println!("{body}");

    Ok(())
}
