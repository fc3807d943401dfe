//! Report export command.

use std::path::Path;

use nethealth_core::{ExportReport, FleetCollector, SshGateway, report_filename};

use crate::error::CliError;
use crate::util::{create_runtime, load_registry, load_settings};

/// Export command handler: polls the fleet and writes the report file
pub fn cmd_export(
    registry_path: &Path,
    settings_path: Option<&Path>,
    output_dir: &Path,
) -> Result<(), CliError> {
    let registry = load_registry(registry_path)?;
    let settings = load_settings(settings_path)?;
    let runtime = create_runtime()?;

    let collector = FleetCollector::from_settings(&settings);
    let gateway = SshGateway::new();
    let snapshot = runtime.block_on(collector.collect(&registry, &gateway));

    let report = ExportReport::from_snapshot(&snapshot);
    let body = serde_json::to_string_pretty(&report).map_err(|e| CliError::Export(e.to_string()))?;

    std::fs::create_dir_all(output_dir).map_err(|e| {
        CliError::Export(format!(
            "Failed to create '{}': {e}",
            output_dir.display()
        ))
    })?;

    let path = output_dir.join(report_filename(report.timestamp));
    std::fs::write(&path, body)
        .map_err(|e| CliError::Export(format!("Failed to write '{}': {e}", path.display())))?;

    println!("Report saved as {}", path.display());
    Ok(())
}
