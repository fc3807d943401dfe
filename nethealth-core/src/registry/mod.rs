//! Device registry: the static inventory of network devices to poll
//!
//! The registry maps a device name to its connection parameters. It is
//! loaded once from a TOML file and validated up front, so the polling
//! engine never has to second-guess a half-filled entry at call time.
//! Devices authenticate with a private key only — the registry has no
//! concept of a password.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading or validating a device registry
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry file could not be read
    #[error("Failed to read registry file '{path}': {source}")]
    Io {
        /// Path that failed to load
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The registry file is not valid TOML
    #[error("Failed to parse registry file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A device entry is missing a required value
    #[error("Device '{device}' has an empty '{field}' field")]
    EmptyField {
        /// Name of the offending device
        device: String,
        /// Name of the empty field
        field: &'static str,
    },

    /// Two device entries share the same name
    #[error("Duplicate device name '{0}' in registry")]
    DuplicateName(String),

    /// The registry contains no devices
    #[error("Registry contains no devices")]
    Empty,
}

/// Result type alias for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Kind of network device, used for display and reporting only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceKind {
    /// Layer-3 router
    #[serde(alias = "router")]
    Router,
    /// Layer-2/3 switch
    #[serde(alias = "switch")]
    Switch,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Router => write!(f, "Router"),
            Self::Switch => write!(f, "Switch"),
        }
    }
}

/// Connection parameters for a single device.
///
/// Immutable for the lifetime of the process; the polling engine only
/// ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Unique device identifier (registry key)
    pub name: String,
    /// Hostname or IP address
    pub host: String,
    /// SSH port
    #[serde(default = "default_port")]
    pub port: u16,
    /// SSH username
    pub username: String,
    /// Path to the SSH private key (`~` is expanded at load time)
    pub key_file: PathBuf,
    /// Device kind (router or switch)
    pub kind: DeviceKind,
}

const fn default_port() -> u16 {
    22
}

impl DeviceConfig {
    /// Validates that no required field is empty
    fn validate(&self) -> RegistryResult<()> {
        let check = |value: &str, field: &'static str| {
            if value.trim().is_empty() {
                Err(RegistryError::EmptyField {
                    device: if field == "name" {
                        self.host.clone()
                    } else {
                        self.name.clone()
                    },
                    field,
                })
            } else {
                Ok(())
            }
        };
        check(&self.name, "name")?;
        check(&self.host, "host")?;
        check(&self.username, "username")?;
        check(&self.key_file.to_string_lossy(), "key_file")?;
        Ok(())
    }
}

/// On-disk shape of the registry file: a `[[devices]]` array of tables
#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    devices: Vec<DeviceConfig>,
}

/// The fleet inventory: an ordered collection of [`DeviceConfig`] entries
/// with unique names.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: Vec<DeviceConfig>,
}

impl DeviceRegistry {
    /// Builds a registry from a list of device configs, validating each
    /// entry and rejecting duplicate names.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if any entry has an empty required field
    /// or if two entries share a name.
    pub fn from_devices(devices: Vec<DeviceConfig>) -> RegistryResult<Self> {
        let mut seen = std::collections::HashSet::new();
        for device in &devices {
            device.validate()?;
            if !seen.insert(device.name.clone()) {
                return Err(RegistryError::DuplicateName(device.name.clone()));
            }
        }
        Ok(Self { devices })
    }

    /// Loads and validates a registry from a TOML file.
    ///
    /// Expands `~` in each device's `key_file` so entries can be written
    /// the way operators keep them in shell configs.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the file cannot be read or parsed,
    /// if validation fails, or if the file declares no devices.
    pub fn load(path: impl AsRef<Path>) -> RegistryResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: RegistryFile = toml::from_str(&contents)?;
        if file.devices.is_empty() {
            return Err(RegistryError::Empty);
        }

        let devices = file
            .devices
            .into_iter()
            .map(|mut device| {
                let expanded = shellexpand::tilde(&device.key_file.to_string_lossy()).into_owned();
                device.key_file = PathBuf::from(expanded);
                device
            })
            .collect();

        Self::from_devices(devices)
    }

    /// Returns the devices in declaration order
    pub fn devices(&self) -> &[DeviceConfig] {
        &self.devices
    }

    /// Looks up a device by name
    pub fn get(&self, name: &str) -> Option<&DeviceConfig> {
        self.devices.iter().find(|d| d.name == name)
    }

    /// Number of devices in the registry
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns true if the registry has no devices
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn device(name: &str) -> DeviceConfig {
        DeviceConfig {
            name: name.to_string(),
            host: "172.31.42.4".to_string(),
            port: 22,
            username: "admin".to_string(),
            key_file: PathBuf::from("/home/admin/.ssh/admin_key"),
            kind: DeviceKind::Router,
        }
    }

    #[test]
    fn test_from_devices_accepts_valid_entries() {
        let registry = DeviceRegistry::from_devices(vec![device("R1-P"), device("R2-P")]).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("R1-P").unwrap().host, "172.31.42.4");
        assert!(registry.get("R9").is_none());
    }

    #[test]
    fn test_from_devices_rejects_duplicates() {
        let result = DeviceRegistry::from_devices(vec![device("R1-P"), device("R1-P")]);
        assert!(matches!(result, Err(RegistryError::DuplicateName(name)) if name == "R1-P"));
    }

    #[test]
    fn test_from_devices_rejects_empty_host() {
        let mut bad = device("S1-P");
        bad.host = "  ".to_string();
        let result = DeviceRegistry::from_devices(vec![bad]);
        assert!(matches!(
            result,
            Err(RegistryError::EmptyField { device, field: "host" }) if device == "S1-P"
        ));
    }

    #[test]
    fn test_load_parses_toml_and_expands_key_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[[devices]]
name = "R1-P"
host = "172.31.42.4"
username = "admin"
key_file = "~/.ssh/admin_key"
kind = "router"

[[devices]]
name = "S1-P"
host = "172.31.42.3"
port = 2222
username = "admin"
key_file = "/etc/keys/admin_key"
kind = "Switch"
"#
        )
        .unwrap();

        let registry = DeviceRegistry::load(file.path()).unwrap();
        assert_eq!(registry.len(), 2);

        let r1 = registry.get("R1-P").unwrap();
        assert_eq!(r1.port, 22);
        assert_eq!(r1.kind, DeviceKind::Router);
        assert!(!r1.key_file.to_string_lossy().starts_with('~'));

        let s1 = registry.get("S1-P").unwrap();
        assert_eq!(s1.port, 2222);
        assert_eq!(s1.kind, DeviceKind::Switch);
    }

    #[test]
    fn test_load_rejects_empty_registry() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# no devices here").unwrap();
        assert!(matches!(
            DeviceRegistry::load(file.path()),
            Err(RegistryError::Empty)
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = DeviceRegistry::load("/nonexistent/devices.toml");
        assert!(matches!(result, Err(RegistryError::Io { .. })));
    }

    #[test]
    fn test_device_kind_display() {
        assert_eq!(DeviceKind::Router.to_string(), "Router");
        assert_eq!(DeviceKind::Switch.to_string(), "Switch");
    }

    #[test]
    fn test_device_kind_serializes_capitalized() {
        assert_eq!(
            serde_json::to_string(&DeviceKind::Router).unwrap(),
            "\"Router\""
        );
    }
}
