//! Report envelopes consumed by the presentation layer
//!
//! Shapes here mirror the JSON bodies the dashboard endpoints serve and
//! the exported report artifact. The engine only builds the values; the
//! consumer decides where they go.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{DeviceHealthRecord, FleetSnapshot, SummaryStats};

/// Body of a health query: every device's record plus the fleet summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    /// Records keyed by device name
    pub devices: BTreeMap<String, DeviceHealthRecord>,
    /// Fleet-wide summary statistics
    pub summary: SummaryStats,
    /// When the snapshot was collected, if a poll has completed
    pub last_update: Option<DateTime<Utc>>,
}

impl HealthReport {
    /// Builds the report body for a completed snapshot
    #[must_use]
    pub fn from_snapshot(snapshot: &FleetSnapshot) -> Self {
        Self {
            devices: snapshot.devices.clone(),
            summary: SummaryStats::from_snapshot(snapshot),
            last_update: Some(snapshot.collected_at),
        }
    }
}

/// Exported report artifact: a health report stamped at export time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReport {
    /// When the export was produced
    pub timestamp: DateTime<Utc>,
    /// Records keyed by device name
    pub devices: BTreeMap<String, DeviceHealthRecord>,
    /// Fleet-wide summary statistics
    pub summary: SummaryStats,
}

impl ExportReport {
    /// Builds the export artifact for a snapshot, stamped now
    #[must_use]
    pub fn from_snapshot(snapshot: &FleetSnapshot) -> Self {
        Self {
            timestamp: Utc::now(),
            devices: snapshot.devices.clone(),
            summary: SummaryStats::from_snapshot(snapshot),
        }
    }
}

/// File name for an exported report at the given instant:
/// `network_health_report_<YYYYMMDD_HHMMSS>.json`
#[must_use]
pub fn report_filename(at: DateTime<Utc>) -> String {
    format!("network_health_report_{}.json", at.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_report_filename_pattern() {
        let at = Utc.with_ymd_and_hms(2026, 8, 29, 14, 30, 5).unwrap();
        assert_eq!(
            report_filename(at),
            "network_health_report_20260829_143005.json"
        );
    }

    #[test]
    fn test_health_report_from_empty_snapshot() {
        let snapshot = FleetSnapshot::from_records(Vec::new());
        let report = HealthReport::from_snapshot(&snapshot);
        assert!(report.devices.is_empty());
        assert_eq!(report.summary.total_devices, 0);
        assert_eq!(report.last_update, Some(snapshot.collected_at));

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["devices"].is_object());
        assert!(json["summary"]["health_percentage"].is_number());
        assert!(json["last_update"].is_string());
    }

    #[test]
    fn test_export_report_shape() {
        let snapshot = FleetSnapshot::from_records(Vec::new());
        let export = ExportReport::from_snapshot(&snapshot);
        let json = serde_json::to_value(&export).unwrap();
        assert!(json["timestamp"].is_string());
        assert!(json["summary"]["total_devices"].is_number());
    }
}
