//! Interactive remote command sessions against network devices
//!
//! A [`SessionGateway`] opens one authenticated session per device; the
//! resulting [`DeviceSession`] issues CLI commands and returns their raw
//! text output. This layer knows nothing about parsing or aggregation,
//! and performs no retries — a failed open stays failed until the next
//! poll cycle.

mod ssh;

pub use ssh::{DEFAULT_CONNECT_TIMEOUT_SECS, SshGateway};

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::registry::DeviceConfig;

/// Errors that can occur at the session layer
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session could not be opened (auth, network, timeout)
    #[error("Failed to connect: {0}")]
    Connect(String),

    /// A command failed after the session was open
    #[error("Command '{command}' failed: {reason}")]
    Command {
        /// The command that was sent
        command: String,
        /// Why it failed
        reason: String,
    },

    /// A command did not complete within its deadline
    #[error("Command '{command}' timed out after {seconds}s")]
    Timeout {
        /// The command that was sent
        command: String,
        /// The deadline that expired
        seconds: u64,
    },

    /// The session was already closed
    #[error("Session is closed")]
    Closed,
}

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// An open interactive session with one device.
///
/// Exclusively owned by the worker polling that device; never shared.
#[async_trait]
pub trait DeviceSession: Send {
    /// Sends a command and returns its raw text output.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Command`] if the exchange fails,
    /// [`SessionError::Timeout`] if no complete response arrives within
    /// `timeout`, or [`SessionError::Closed`] after [`close`](Self::close).
    async fn execute(&mut self, command: &str, timeout: Duration) -> SessionResult<String>;

    /// Releases the underlying connection.
    ///
    /// Idempotent: safe to call more than once, and safe even if the
    /// session never fully opened.
    async fn close(&mut self);
}

/// Opens authenticated sessions against devices.
#[async_trait]
pub trait SessionGateway: Send + Sync {
    /// Opens a session for `config`, authenticating with its private key.
    ///
    /// Makes a single connection attempt; the caller decides whether a
    /// later poll retries.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Connect`] if the device is unreachable or
    /// authentication fails.
    async fn open(&self, config: &DeviceConfig) -> SessionResult<Box<dyn DeviceSession>>;
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted in-memory gateway used by collector and fleet tests.

    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::{DeviceSession, SessionError, SessionGateway, SessionResult};
    use crate::registry::DeviceConfig;

    /// How a fake device behaves when opened
    #[derive(Clone)]
    pub enum Script {
        /// Session opens; each command maps to a canned output
        Respond(HashMap<String, String>),
        /// Session open fails with this error message
        Refuse(String),
        /// Session open never completes (hung device)
        Hang,
    }

    /// In-memory gateway keyed by device name
    #[derive(Default)]
    pub struct FakeGateway {
        scripts: HashMap<String, Script>,
        closes: Arc<AtomicUsize>,
    }

    impl FakeGateway {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn script(mut self, device: &str, script: Script) -> Self {
            self.scripts.insert(device.to_string(), script);
            self
        }

        /// Device that answers the given command/output pairs
        pub fn responding(self, device: &str, outputs: &[(&str, &str)]) -> Self {
            let map = outputs
                .iter()
                .map(|(c, o)| ((*c).to_string(), (*o).to_string()))
                .collect();
            self.script(device, Script::Respond(map))
        }

        /// Total number of `close` calls across all sessions
        pub fn close_count(&self) -> usize {
            self.closes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SessionGateway for FakeGateway {
        async fn open(&self, config: &DeviceConfig) -> SessionResult<Box<dyn DeviceSession>> {
            match self.scripts.get(&config.name) {
                Some(Script::Respond(outputs)) => Ok(Box::new(FakeSession {
                    outputs: outputs.clone(),
                    closed: false,
                    closes: Arc::clone(&self.closes),
                })),
                Some(Script::Refuse(reason)) => Err(SessionError::Connect(reason.clone())),
                Some(Script::Hang) => {
                    tokio::time::sleep(Duration::from_secs(86_400)).await;
                    Err(SessionError::Connect("hung device woke up".to_string()))
                }
                None => Err(SessionError::Connect(format!(
                    "no script for device '{}'",
                    config.name
                ))),
            }
        }
    }

    struct FakeSession {
        outputs: HashMap<String, String>,
        closed: bool,
        closes: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DeviceSession for FakeSession {
        async fn execute(&mut self, command: &str, _timeout: Duration) -> SessionResult<String> {
            if self.closed {
                return Err(SessionError::Closed);
            }
            self.outputs
                .get(command)
                .cloned()
                .ok_or_else(|| SessionError::Command {
                    command: command.to_string(),
                    reason: "unrecognized command".to_string(),
                })
        }

        async fn close(&mut self) {
            if !self.closed {
                self.closed = true;
                self.closes.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
}
