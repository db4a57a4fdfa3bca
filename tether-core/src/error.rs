//! Domain-specific error types for the host control protocol.
//!
//! All fallible operations return `Result<T, TetherError>`.
//! No panics on malformed server output; every error is typed and
//! reported to the immediate caller without retry.

use std::time::Duration;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TetherError>;

/// The canonical error type for the host control protocol.
#[derive(Debug, Error)]
pub enum TetherError {
    // ── Encoding Errors ──────────────────────────────────────────
    /// A request does not fit in a 4-hex-digit length prefix.
    #[error("command too long: {size} bytes (max {max})")]
    CommandTooLong { size: usize, max: usize },

    // ── Protocol Errors ──────────────────────────────────────────
    /// The server violated the wire contract.
    #[error("protocol violation: {0}")]
    Protocol(&'static str),

    /// A length prefix was not four ASCII hex digits.
    #[error("invalid length prefix: {0:?}")]
    InvalidLengthPrefix([u8; 4]),

    /// A response body was not valid UTF-8.
    #[error("invalid utf-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    // ── Command Errors ───────────────────────────────────────────
    /// The server answered `FAIL` to a request.
    #[error("command `{command}` failed: {diagnostic}")]
    CommandFailed { command: String, diagnostic: String },

    // ── Connection Errors ────────────────────────────────────────
    /// The TCP/IO layer reported an error.
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    /// Connecting to the server exceeded its deadline.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// The server launcher could not bring the server up.
    #[error("server launch failed: {0}")]
    Launch(String),

    // ── Configuration Errors ─────────────────────────────────────
    /// A selector string could not be parsed.
    #[error("invalid selector: {0}")]
    InvalidSelector(String),
}

/// Coarse classification of a [`TetherError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request could not be framed.
    Encoding,
    /// The server broke the wire contract; retrying will not help.
    Protocol,
    /// The server rejected a request with a diagnostic.
    Command,
    /// Socket-level connect, read, write or timeout failure.
    Connection,
    /// Caller-supplied configuration was unusable.
    Config,
}

impl TetherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CommandTooLong { .. } => ErrorKind::Encoding,
            Self::Protocol(_) | Self::InvalidLengthPrefix(_) | Self::InvalidUtf8(_) => {
                ErrorKind::Protocol
            }
            Self::CommandFailed { .. } => ErrorKind::Command,
            Self::Connection(_) | Self::Timeout(_) | Self::Launch(_) => ErrorKind::Connection,
            Self::InvalidSelector(_) => ErrorKind::Config,
        }
    }

    /// Server-authored diagnostic text, if the server answered `FAIL`.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::CommandFailed { diagnostic, .. } => Some(diagnostic.as_str()),
            _ => None,
        }
    }

    /// Whether this error came from a connect or read deadline.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Connection(e) => e.kind() == std::io::ErrorKind::TimedOut,
            _ => false,
        }
    }
}
