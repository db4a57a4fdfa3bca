//! Where the host server lives and how to make sure it is up.
//!
//! Address and timeouts are explicit ([`ServerConfig`]) so every
//! combination can be exercised in tests. Starting the server process
//! is not this crate's job; callers inject a [`ServerLauncher`] that
//! knows how.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{Result, TetherError};
use crate::session;
use crate::transport;

/// Port the host server listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 5037;

/// Query string for the server's protocol version.
pub const VERSION_QUERY: &str = "host:version";

// ── ServerConfig ─────────────────────────────────────────────────

/// Address and timeouts used for every connection to the host server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host name or IP of the server.
    pub host: String,
    /// TCP port of the server.
    pub port: u16,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Read timeout in milliseconds (0 = wait forever).
    pub socket_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: DEFAULT_PORT,
            connect_timeout_ms: 5_000,
            socket_timeout_ms: 10_000,
        }
    }
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = millis(timeout);
        self
    }

    /// `None` disables the read timeout.
    pub fn with_socket_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.socket_timeout_ms = timeout.map_or(0, millis);
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn socket_timeout(&self) -> Option<Duration> {
        (self.socket_timeout_ms > 0).then(|| Duration::from_millis(self.socket_timeout_ms))
    }

    /// `host:port`, suitable for `TcpStream::connect`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// ── ServerLauncher ───────────────────────────────────────────────

/// Capability to bring the host server up before it is queried.
#[async_trait]
pub trait ServerLauncher: Send + Sync {
    /// Return once a server is accepting connections at `config`.
    async fn ensure_running(&self, config: &ServerConfig) -> Result<()>;
}

/// Launcher for callers that manage the server themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeRunning;

#[async_trait]
impl ServerLauncher for AssumeRunning {
    async fn ensure_running(&self, _config: &ServerConfig) -> Result<()> {
        Ok(())
    }
}

// ── Queries ──────────────────────────────────────────────────────

/// Ask the server for its protocol version.
pub async fn server_version(config: &ServerConfig) -> Result<u32> {
    let mut conn = transport::connect(config).await?;
    let result = async {
        session::send(&mut conn, VERSION_QUERY).await?;
        let body = session::read_response_payload(&mut conn).await?;
        parse_version(&body)
    }
    .await;
    let _ = conn.shutdown().await;

    if let Ok(version) = &result {
        debug!(version, "server version");
    }
    result
}

fn parse_version(body: &str) -> Result<u32> {
    u32::from_str_radix(body.trim(), 16)
        .map_err(|_| TetherError::Protocol("malformed version payload"))
}

// ── Tests ────────────────────────────────────────────────────────
