//! Health record data model and fleet snapshot aggregation
//!
//! Field names on the serialized types are a stable contract with the
//! presentation layer and must not be renamed casually. Numeric
//! percentage fields are authoritative; the `*_usage` display strings
//! are derived conveniences.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::registry::{DeviceConfig, DeviceKind};

/// Placeholder shown for metrics that could not be collected
pub const UNKNOWN: &str = "Unknown";

/// Rounds to one decimal place (matches the reporting contract)
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Whether a session could be opened to the device this poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceStatus {
    /// A session was opened and authenticated
    Online,
    /// No session could be opened
    Offline,
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => write!(f, "Online"),
            Self::Offline => write!(f, "Offline"),
        }
    }
}

/// State of one discovered interface, rebuilt from scratch each poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceState {
    /// Interface name (e.g. `GigabitEthernet0/1`)
    pub name: String,
    /// Assigned IP address, or the device's placeholder (`unassigned`)
    pub ip: String,
    /// Link status column
    pub status: String,
    /// Protocol status column
    pub protocol: String,
    /// True only when both link and protocol are "up"
    pub up: bool,
}

/// Counts over the kept (physical) interfaces of one device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceSummary {
    /// Interfaces kept after filtering
    pub total: usize,
    /// Interfaces with link and protocol both up
    pub up: usize,
    /// Interfaces that are not fully up
    pub down: usize,
}

/// Per-device result of one health poll.
///
/// Exactly one record is produced per device per poll, Online or not.
/// If `status` is Offline, every metric is at its unknown default and
/// only `error` carries information; if Online, `response_time` is
/// always present and the remaining fields are independently
/// best-effort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceHealthRecord {
    /// Device identifier (registry key)
    pub device_name: String,
    /// Hostname or IP the poll targeted
    pub host: String,
    /// Device kind
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    /// Reachability this poll
    pub status: DeviceStatus,
    /// Human-readable failure detail, present only when Offline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Uptime as reported by the device, or "Unknown"
    pub uptime: String,
    /// CPU usage display string, or "Unknown"
    pub cpu_usage: String,
    /// Memory usage display string, or "Unknown"
    pub memory_usage: String,
    /// Temperature display string (e.g. "42°C"), or "Unknown"
    pub temperature: String,
    /// Physical interfaces in discovery order
    pub interfaces: Vec<InterfaceState>,
    /// Interface counts over the kept rows
    pub interface_summary: InterfaceSummary,
    /// CPU utilization percentage, when parsed
    pub cpu_percentage: Option<u8>,
    /// Memory usage percentage (one decimal), when parsed
    pub memory_percentage: Option<f64>,
    /// Session-open latency in milliseconds; absent when Offline
    pub response_time: Option<f64>,
    /// When this record was produced
    pub last_checked: DateTime<Utc>,
}

impl DeviceHealthRecord {
    fn base(config: &DeviceConfig, status: DeviceStatus) -> Self {
        Self {
            device_name: config.name.clone(),
            host: config.host.clone(),
            kind: config.kind,
            status,
            error: None,
            uptime: UNKNOWN.to_string(),
            cpu_usage: UNKNOWN.to_string(),
            memory_usage: UNKNOWN.to_string(),
            temperature: UNKNOWN.to_string(),
            interfaces: Vec::new(),
            interface_summary: InterfaceSummary::default(),
            cpu_percentage: None,
            memory_percentage: None,
            response_time: None,
            last_checked: Utc::now(),
        }
    }

    /// Record for a device whose session opened; `response_time_ms` is
    /// the measured open latency
    #[must_use]
    pub fn online(config: &DeviceConfig, response_time_ms: f64) -> Self {
        let mut record = Self::base(config, DeviceStatus::Online);
        record.response_time = Some(response_time_ms);
        record
    }

    /// Record for a device that could not be reached
    #[must_use]
    pub fn offline(config: &DeviceConfig, error: impl Into<String>) -> Self {
        let mut record = Self::base(config, DeviceStatus::Offline);
        record.error = Some(error.into());
        record
    }

    /// Sets the CPU metric and its display string
    pub fn set_cpu(&mut self, percent: u8) {
        self.cpu_percentage = Some(percent);
        self.cpu_usage = format!("{percent}%");
    }

    /// Sets the memory metric and its display string
    pub fn set_memory(&mut self, percent: f64) {
        self.memory_percentage = Some(percent);
        self.memory_usage = format!("{percent}%");
    }

    /// Returns true if the device was reachable this poll
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.status == DeviceStatus::Online
    }
}

/// Complete, internally consistent result of one fleet-wide poll.
///
/// Contains exactly one record per registry device; never published
/// partially filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    /// Records keyed by device name
    pub devices: BTreeMap<String, DeviceHealthRecord>,
    /// When the last device task completed
    pub collected_at: DateTime<Utc>,
}

impl FleetSnapshot {
    /// Builds a snapshot from completed records, stamped now
    #[must_use]
    pub fn from_records(records: Vec<DeviceHealthRecord>) -> Self {
        let devices = records
            .into_iter()
            .map(|r| (r.device_name.clone(), r))
            .collect();
        Self {
            devices,
            collected_at: Utc::now(),
        }
    }

    /// Looks up one device's record
    #[must_use]
    pub fn device(&self, name: &str) -> Option<&DeviceHealthRecord> {
        self.devices.get(name)
    }

    /// Number of devices in the snapshot
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns true if the snapshot holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

/// Fleet-wide summary statistics, recomputed on demand from a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Devices in the snapshot
    pub total_devices: usize,
    /// Devices that were Online
    pub online_devices: usize,
    /// Devices that were Offline
    pub offline_devices: usize,
    /// `round(online/total × 100, 1)`, or 0 for an empty fleet
    pub health_percentage: f64,
}

impl SummaryStats {
    /// Computes summary statistics for a snapshot. Pure; no I/O.
    #[must_use]
    pub fn from_snapshot(snapshot: &FleetSnapshot) -> Self {
        let total = snapshot.devices.len();
        let online = snapshot.devices.values().filter(|r| r.is_online()).count();
        let health_percentage = if total == 0 {
            0.0
        } else {
            round1(online as f64 / total as f64 * 100.0)
        };
        Self {
            total_devices: total,
            online_devices: online,
            offline_devices: total - online,
            health_percentage,
        }
    }
}
