//! Per-device health collection
//!
//! Drives one device through its poll lifecycle: open a session, run
//! the fixed diagnostic command sequence through the extractors, and
//! assemble a [`DeviceHealthRecord`]. This is the isolation boundary —
//! whatever goes wrong with one device, the output is always exactly
//! one record and never an error surfaced to the caller.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::extract;
use crate::record::DeviceHealthRecord;
use crate::registry::DeviceConfig;
use crate::session::{DeviceSession, SessionGateway};

/// Default per-command deadline (seconds)
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 10;

/// Collects the health record for a single device per poll.
#[derive(Debug, Clone)]
pub struct DeviceProber {
    command_timeout: Duration,
}

impl DeviceProber {
    /// Creates a prober with the default per-command deadline
    #[must_use]
    pub const fn new() -> Self {
        Self {
            command_timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
        }
    }

    /// Creates a prober with a custom per-command deadline
    #[must_use]
    pub const fn with_command_timeout(command_timeout: Duration) -> Self {
        Self { command_timeout }
    }

    /// Polls one device and returns its health record.
    ///
    /// Never fails: a connection error yields an Offline record with the
    /// error captured, and each metric that cannot be collected is left
    /// at its unknown default without aborting the remaining probes. The
    /// session is closed exactly once on every path.
    pub async fn probe(
        &self,
        config: &DeviceConfig,
        gateway: &dyn SessionGateway,
    ) -> DeviceHealthRecord {
        let start = Instant::now();

        let mut session = match gateway.open(config).await {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(device = %config.name, host = %config.host, error = %err,
                    "device unreachable");
                return DeviceHealthRecord::offline(config, err.to_string());
            }
        };

        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        let mut record = DeviceHealthRecord::online(config, (latency_ms * 100.0).round() / 100.0);
        tracing::debug!(device = %config.name, latency_ms, "session open, querying");

        // Each distinct command is sent at most once per poll; metrics
        // sharing a command read from the cached output.
        let mut outputs: HashMap<&'static str, Option<String>> = HashMap::new();

        if let Some(output) = self.run(session.as_mut(), extract::SHOW_VERSION, &mut outputs).await
            && let Some(value) = extract::uptime(output)
        {
            record.uptime = value;
        }

        for &command in extract::CPU_COMMANDS {
            if let Some(output) = self.run(session.as_mut(), command, &mut outputs).await
                && let Some(percent) = extract::cpu_percent(output)
            {
                record.set_cpu(percent);
                break;
            }
        }

        for &command in extract::MEMORY_COMMANDS {
            if let Some(output) = self.run(session.as_mut(), command, &mut outputs).await
                && let Some(percent) = extract::memory_percent(output)
            {
                record.set_memory(percent);
                break;
            }
        }

        if let Some(output) = self
            .run(session.as_mut(), extract::SHOW_IP_INTERFACE_BRIEF, &mut outputs)
            .await
        {
            let (interfaces, summary) = extract::interface_table(output);
            record.interfaces = interfaces;
            record.interface_summary = summary;
        }

        for &command in extract::TEMPERATURE_COMMANDS {
            if let Some(output) = self.run(session.as_mut(), command, &mut outputs).await
                && let Some(value) = extract::temperature(output)
            {
                record.temperature = value;
                break;
            }
        }

        session.close().await;
        record
    }

    /// Executes `command` unless its output (or failure) is already
    /// cached; a failed command is cached as a miss so it is not re-sent
    /// within the same poll.
    async fn run<'a>(
        &self,
        session: &mut dyn DeviceSession,
        command: &'static str,
        outputs: &'a mut HashMap<&'static str, Option<String>>,
    ) -> Option<&'a String> {
        if !outputs.contains_key(command) {
            let result = match session.execute(command, self.command_timeout).await {
                Ok(output) => Some(output),
                Err(err) => {
                    tracing::debug!(command, error = %err, "command failed, metric left unset");
                    None
                }
            };
            outputs.insert(command, result);
        }
        outputs.get(command).and_then(Option::as_ref)
    }
}

impl Default for DeviceProber {
    fn default() -> Self {
        Self::new()
    }
}
