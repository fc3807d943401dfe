//! SSH-backed device sessions
//!
//! Each device gets one interactive `ssh` child process for the duration
//! of a poll. Commands are written to the child's stdin and the response
//! is read back until the device CLI prompt reappears, under a
//! per-command deadline. Authentication is private-key only.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};

use super::{DeviceSession, SessionError, SessionGateway, SessionResult};
use crate::registry::DeviceConfig;

/// Default timeout for opening a session (seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Sent right after login so command output arrives without paging stops
const DISABLE_PAGING_COMMAND: &str = "terminal length 0";

/// Opens interactive SSH sessions by spawning the system `ssh` client.
#[derive(Debug, Clone)]
pub struct SshGateway {
    connect_timeout: Duration,
}

impl SshGateway {
    /// Creates a gateway with the default connect timeout
    #[must_use]
    pub const fn new() -> Self {
        Self {
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Creates a gateway with a custom connect timeout
    #[must_use]
    pub const fn with_connect_timeout(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for SshGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionGateway for SshGateway {
    async fn open(&self, config: &DeviceConfig) -> SessionResult<Box<dyn DeviceSession>> {
        let session = SshSession::open(config, self.connect_timeout).await?;
        Ok(Box::new(session))
    }
}

/// Builds the `ssh` invocation for a device.
///
/// `-tt` forces a pty so the device presents its interactive CLI instead
/// of refusing a non-terminal exec channel.
fn build_ssh_command(config: &DeviceConfig, connect_timeout: Duration) -> Command {
    let mut cmd = Command::new("ssh");
    cmd.arg("-tt");
    // Key auth only; never fall back to a password prompt
    cmd.arg("-o").arg("BatchMode=yes");
    cmd.arg("-o").arg("StrictHostKeyChecking=no");
    cmd.arg("-o")
        .arg(format!("ConnectTimeout={}", connect_timeout.as_secs()));
    if config.port != 22 {
        cmd.arg("-p").arg(config.port.to_string());
    }
    cmd.arg("-i").arg(&config.key_file);
    cmd.arg(format!("{}@{}", config.username, config.host));
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    cmd.kill_on_drop(true);
    cmd
}

/// Returns true when the buffered output ends at a device CLI prompt
/// (`Router>` or `Router#`). Heuristic: only the final line is checked.
fn ends_with_prompt(text: &str) -> bool {
    text.lines().last().is_some_and(|line| {
        let line = line.trim_end();
        !line.is_empty() && (line.ends_with('>') || line.ends_with('#'))
    })
}

/// Strips the echoed command line and the trailing prompt line from a
/// prompt-delimited exchange, leaving only the command's output.
fn strip_framing(raw: &str, command: &str) -> String {
    let mut lines: Vec<&str> = raw.lines().collect();
    if lines.first().is_some_and(|l| l.contains(command)) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|l| {
        let l = l.trim_end();
        l.ends_with('>') || l.ends_with('#')
    }) {
        lines.pop();
    }
    lines.join("\n")
}

struct SshSession {
    child: Option<Child>,
    stdin: ChildStdin,
    stdout: ChildStdout,
    stderr: Option<ChildStderr>,
    device: String,
}

impl SshSession {
    async fn open(config: &DeviceConfig, connect_timeout: Duration) -> SessionResult<Self> {
        let mut cmd = build_ssh_command(config, connect_timeout);
        let mut child = cmd
            .spawn()
            .map_err(|e| SessionError::Connect(format!("failed to spawn ssh: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SessionError::Connect("ssh stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SessionError::Connect("ssh stdout unavailable".to_string()))?;
        let stderr = child.stderr.take();

        let mut session = Self {
            child: Some(child),
            stdin,
            stdout,
            stderr,
            device: config.name.clone(),
        };

        // The first prompt is what confirms authentication succeeded.
        if let Err(err) = session.read_until_prompt("login", connect_timeout).await {
            session.shutdown().await;
            let detail = session.drain_stderr().await;
            let reason = if detail.is_empty() {
                err.to_string()
            } else {
                format!("{err}: {detail}")
            };
            return Err(SessionError::Connect(reason));
        }

        if let Err(err) = session.exchange(DISABLE_PAGING_COMMAND, connect_timeout).await {
            tracing::debug!(device = %session.device, error = %err, "could not disable paging");
        }

        tracing::debug!(device = %session.device, host = %config.host, "session opened");
        Ok(session)
    }

    /// Sends one command and reads its prompt-delimited response
    async fn exchange(&mut self, command: &str, timeout: Duration) -> SessionResult<String> {
        let write = async {
            self.stdin.write_all(command.as_bytes()).await?;
            self.stdin.write_all(b"\n").await?;
            self.stdin.flush().await
        };
        write.await.map_err(|e| SessionError::Command {
            command: command.to_string(),
            reason: format!("failed to send: {e}"),
        })?;

        let raw = self.read_until_prompt(command, timeout).await?;
        Ok(strip_framing(&raw, command))
    }

    /// Accumulates output until the device prompt reappears or the
    /// deadline expires
    async fn read_until_prompt(&mut self, command: &str, timeout: Duration) -> SessionResult<String> {
        let stdout = &mut self.stdout;
        let read = async {
            let mut buf: Vec<u8> = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = stdout.read(&mut chunk).await.map_err(|e| SessionError::Command {
                    command: command.to_string(),
                    reason: e.to_string(),
                })?;
                if n == 0 {
                    return Err(SessionError::Command {
                        command: command.to_string(),
                        reason: "session closed before prompt".to_string(),
                    });
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf);
                if ends_with_prompt(&text) {
                    return Ok(text.into_owned());
                }
            }
        };

        match tokio::time::timeout(timeout, read).await {
            Ok(result) => result,
            Err(_) => Err(SessionError::Timeout {
                command: command.to_string(),
                seconds: timeout.as_secs(),
            }),
        }
    }

    /// Kills the child once; subsequent calls are no-ops
    async fn shutdown(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill().await;
            tracing::debug!(device = %self.device, "session closed");
        }
    }

    /// Reads whatever the child wrote to stderr (after shutdown the pipe
    /// is at EOF, so this returns promptly)
    async fn drain_stderr(&mut self) -> String {
        let Some(stderr) = self.stderr.as_mut() else {
            return String::new();
        };
        let mut buf = Vec::new();
        let _ = tokio::time::timeout(Duration::from_millis(200), stderr.read_to_end(&mut buf)).await;
        String::from_utf8_lossy(&buf).trim().to_string()
    }
}

#[async_trait]
impl DeviceSession for SshSession {
    async fn execute(&mut self, command: &str, timeout: Duration) -> SessionResult<String> {
        if self.child.is_none() {
            return Err(SessionError::Closed);
        }
        tracing::trace!(device = %self.device, command, "sending command");
        self.exchange(command, timeout).await
    }

    async fn close(&mut self) {
        self.shutdown().await;
    }
}
