//! CLI error types and exit codes.

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - registry, settings, or I/O problems
    pub const GENERAL_ERROR: i32 = 1;
    /// Lookup failure - the requested device is unknown to the registry
    pub const DEVICE_NOT_FOUND: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Registry could not be loaded
    #[error("Registry error: {0}")]
    Registry(String),

    /// Poll settings could not be loaded
    #[error("Settings error: {0}")]
    Settings(String),

    /// Device name not present in the registry
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Async runtime could not be created
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Report file could not be written
    #[error("Export error: {0}")]
    Export(String),
}

impl CliError {
    /// Exit code this error maps to
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::DeviceNotFound(_) => exit_codes::DEVICE_NOT_FOUND,
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            CliError::DeviceNotFound("R9".to_string()).exit_code(),
            exit_codes::DEVICE_NOT_FOUND
        );
        assert_eq!(
            CliError::Registry("bad file".to_string()).exit_code(),
            exit_codes::GENERAL_ERROR
        );
    }
}
