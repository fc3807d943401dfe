//! Fleet-wide polling: bounded concurrent fan-out over the registry
//!
//! The fleet collector spawns one device probe per registry entry,
//! bounded by a configurable concurrency limit, gathers records in
//! completion order, and produces a complete snapshot — a device that
//! fails or hangs still contributes its (Offline) record rather than
//! being omitted.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collector::{DEFAULT_COMMAND_TIMEOUT_SECS, DeviceProber};
use crate::record::{DeviceHealthRecord, FleetSnapshot};
use crate::registry::DeviceRegistry;
use crate::session::SessionGateway;

/// Default number of simultaneous device sessions.
///
/// Kept low so a poll does not flood device CLI command queues.
pub const DEFAULT_CONCURRENCY: usize = 3;

/// Default wall-clock bound for a single device's whole poll (seconds)
pub const DEFAULT_DEVICE_DEADLINE_SECS: u64 = 60;

/// Errors that can occur while loading poll settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid TOML
    #[error("Failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunable knobs for a fleet poll (TOML-loadable).
///
/// Concurrency trades poll latency against load on the devices' CLI
/// handlers; the deadlines are the only escape hatches for hung
/// sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSettings {
    /// Simultaneous device sessions (clamped 1–32)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-command deadline in seconds (clamped 1–120)
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
    /// Whole-device poll deadline in seconds (clamped 1–600)
    #[serde(default = "default_device_deadline_secs")]
    pub device_deadline_secs: u64,
}

const fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

const fn default_command_timeout_secs() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_SECS
}

const fn default_device_deadline_secs() -> u64 {
    DEFAULT_DEVICE_DEADLINE_SECS
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
            device_deadline_secs: DEFAULT_DEVICE_DEADLINE_SECS,
        }
    }
}

impl PollSettings {
    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Concurrency clamped to the valid range
    #[must_use]
    pub const fn effective_concurrency(&self) -> usize {
        if self.concurrency == 0 {
            1
        } else if self.concurrency > 32 {
            32
        } else {
            self.concurrency
        }
    }

    /// Per-command deadline clamped to the valid range
    #[must_use]
    pub fn effective_command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.clamp(1, 120))
    }

    /// Per-device deadline clamped to the valid range
    #[must_use]
    pub fn effective_device_deadline(&self) -> Duration {
        Duration::from_secs(self.device_deadline_secs.clamp(1, 600))
    }
}

/// Polls every registry device concurrently and assembles the snapshot.
#[derive(Debug, Clone)]
pub struct FleetCollector {
    concurrency: usize,
    command_timeout: Duration,
    device_deadline: Duration,
}

impl FleetCollector {
    /// Creates a collector with default settings
    #[must_use]
    pub const fn new() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            command_timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
            device_deadline: Duration::from_secs(DEFAULT_DEVICE_DEADLINE_SECS),
        }
    }

    /// Creates a collector from (clamped) poll settings
    #[must_use]
    pub fn from_settings(settings: &PollSettings) -> Self {
        Self {
            concurrency: settings.effective_concurrency(),
            command_timeout: settings.effective_command_timeout(),
            device_deadline: settings.effective_device_deadline(),
        }
    }

    /// Sets the maximum number of simultaneous device sessions
    #[must_use]
    pub const fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the per-command deadline
    #[must_use]
    pub const fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Sets the whole-device poll deadline
    #[must_use]
    pub const fn device_deadline(mut self, deadline: Duration) -> Self {
        self.device_deadline = deadline;
        self
    }

    /// Polls the whole fleet and returns a complete snapshot.
    ///
    /// One probe task per registry device, at most `concurrency` in
    /// flight, gathered in completion order. A device whose probe does
    /// not finish within the device deadline is abandoned and recorded
    /// as Offline with a timeout error — the snapshot key set always
    /// equals the registry key set. The snapshot timestamp is taken when
    /// the last task completes.
    pub async fn collect(
        &self,
        registry: &DeviceRegistry,
        gateway: &dyn SessionGateway,
    ) -> FleetSnapshot {
        let prober = DeviceProber::with_command_timeout(self.command_timeout);
        let deadline = self.device_deadline;

        tracing::info!(
            devices = registry.len(),
            concurrency = self.concurrency.max(1),
            "starting fleet poll"
        );

        let records: Vec<DeviceHealthRecord> = stream::iter(registry.devices())
            .map(|config| {
                let prober = &prober;
                async move {
                    match tokio::time::timeout(deadline, prober.probe(config, gateway)).await {
                        Ok(record) => record,
                        Err(_) => {
                            tracing::warn!(device = %config.name, deadline_secs = deadline.as_secs(),
                                "device poll abandoned at deadline");
                            DeviceHealthRecord::offline(
                                config,
                                format!("health poll timed out after {}s", deadline.as_secs()),
                            )
                        }
                    }
                }
            })
            .buffer_unordered(self.concurrency.max(1))
            .collect()
            .await;

        let snapshot = FleetSnapshot::from_records(records);
        let online = snapshot.devices.values().filter(|r| r.is_online()).count();
        tracing::info!(online, total = snapshot.len(), "fleet poll complete");
        snapshot
    }
}

impl Default for FleetCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds the most recently published snapshot behind an atomic swap.
///
/// Readers always see a fully-formed snapshot or none at all — never
/// one under construction.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    inner: RwLock<Option<Arc<FleetSnapshot>>>,
}

impl SnapshotStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a completed snapshot, replacing the previous one
    pub fn publish(&self, snapshot: FleetSnapshot) -> Arc<FleetSnapshot> {
        let snapshot = Arc::new(snapshot);
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(Arc::clone(&snapshot));
        snapshot
    }

    /// Returns the last published snapshot, if any
    #[must_use]
    pub fn latest(&self) -> Option<Arc<FleetSnapshot>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns one device's record from the last snapshot
    #[must_use]
    pub fn device(&self, name: &str) -> Option<DeviceHealthRecord> {
        self.latest()?.device(name).cloned()
    }

    /// When the last snapshot was collected, if any
    #[must_use]
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.latest().map(|s| s.collected_at)
    }
}
