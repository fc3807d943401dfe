//! Shared helpers for command handlers.

use std::path::Path;

use nethealth_core::{DeviceRegistry, PollSettings};

use crate::error::CliError;

/// Loads and validates the device registry
pub fn load_registry(path: &Path) -> Result<DeviceRegistry, CliError> {
    DeviceRegistry::load(path).map_err(|e| CliError::Registry(e.to_string()))
}

/// Loads poll settings from a file, or returns the defaults
pub fn load_settings(path: Option<&Path>) -> Result<PollSettings, CliError> {
    path.map_or_else(
        || Ok(PollSettings::default()),
        |p| PollSettings::load(p).map_err(|e| CliError::Settings(e.to_string())),
    )
}

/// Creates the async runtime used to drive a poll
pub fn create_runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Runtime(format!("Failed to create async runtime: {e}")))
}
