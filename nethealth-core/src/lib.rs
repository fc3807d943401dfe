//! `nethealth` core library
//!
//! A fleet health-polling engine for network devices: opens interactive
//! SSH sessions, issues read-only diagnostic commands, parses their
//! free-text output into structured metrics, and aggregates per-device
//! results into a fleet-wide snapshot — tolerating the failure of any
//! individual device without blocking the others.
//!
//! # Crate Structure
//!
//! - [`registry`] - Device inventory loading and validation
//! - [`session`] - Interactive remote sessions (SSH gateway)
//! - [`extract`] - Pure text-to-metric extractors and command literals
//! - [`record`] - Health records, snapshots, and summary statistics
//! - [`collector`] - Per-device poll lifecycle (isolation boundary)
//! - [`fleet`] - Bounded concurrent fan-out and snapshot publication
//! - [`report`] - JSON envelopes for the presentation layer

#![warn(missing_docs)]

pub mod collector;
pub mod extract;
pub mod fleet;
pub mod record;
pub mod registry;
pub mod report;
pub mod session;

pub use collector::{DEFAULT_COMMAND_TIMEOUT_SECS, DeviceProber};
pub use fleet::{
    DEFAULT_CONCURRENCY, DEFAULT_DEVICE_DEADLINE_SECS, FleetCollector, PollSettings,
    SettingsError, SnapshotStore,
};
pub use record::{
    DeviceHealthRecord, DeviceStatus, FleetSnapshot, InterfaceState, InterfaceSummary,
    SummaryStats,
};
pub use registry::{DeviceConfig, DeviceKind, DeviceRegistry, RegistryError, RegistryResult};
pub use report::{ExportReport, HealthReport, report_filename};
pub use session::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DeviceSession, SessionError, SessionGateway, SessionResult,
    SshGateway,
};
