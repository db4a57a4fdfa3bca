//! Device enumeration via `host:devices-l`.
//!
//! The listing body is one device per line, whitespace separated:
//!
//! ```text
//! 59652cce               device usb:34603008X product:NE2213EEA model:NE2213 device:OP516FL1 transport_id:5
//! emulator-5554          offline transport_id:2
//! ```
//!
//! Only the serial (first field) and `transport_id:` are required. Lines
//! without a usable transport id are skipped, since unauthorized or
//! half-connected entries can legitimately appear in the listing.

use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::FramedRead;
use tracing::{debug, trace};

use crate::codec::HostCodec;
use crate::error::{Result, TetherError};
use crate::server::ServerConfig;
use crate::session;
use crate::transport;

/// Query string for the long-form device listing.
pub const LIST_DEVICES_QUERY: &str = "host:devices-l";

// ── DeviceState ──────────────────────────────────────────────────

/// Connection state column of a listing line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceState {
    Device,
    Offline,
    Unauthorized,
    Other(String),
}

impl DeviceState {
    fn parse(token: &str) -> Self {
        match token {
            "device" => Self::Device,
            "offline" => Self::Offline,
            "unauthorized" => Self::Unauthorized,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, Self::Device)
    }
}

// ── DeviceRecord ─────────────────────────────────────────────────

/// One attached device or emulator, as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub serial: String,
    pub transport_id: u64,
    /// Second column, when it is a bare word rather than `key:value`.
    pub state: Option<DeviceState>,
    pub product: Option<String>,
    pub model: Option<String>,
    pub device: Option<String>,
}

impl DeviceRecord {
    pub fn new(serial: impl Into<String>, transport_id: u64) -> Self {
        Self {
            serial: serial.into(),
            transport_id,
            state: None,
            product: None,
            model: None,
            device: None,
        }
    }
}

/// Parse one listing line. `None` when the line carries no
/// `transport_id:<digits>` field.
///
/// If several `transport_id:` fields appear the first one wins.
pub fn parse_device_line(line: &str) -> Option<DeviceRecord> {
    let mut fields = line.split_whitespace();
    let serial = fields.next()?;

    let mut transport_id = None;
    let mut record = DeviceRecord::new(serial, 0);
    for (idx, field) in fields.enumerate() {
        match field.split_once(':') {
            Some(("transport_id", digits)) if is_digits(digits) => {
                if transport_id.is_none() {
                    transport_id = Some(digits.parse::<u64>().ok()?);
                }
            }
            Some(("product", v)) => record.product = Some(v.to_string()),
            Some(("model", v)) => record.model = Some(v.to_string()),
            Some(("device", v)) => record.device = Some(v.to_string()),
            Some(_) => {}
            None if idx == 0 => record.state = Some(DeviceState::parse(field)),
            None => {}
        }
    }

    record.transport_id = transport_id?;
    Some(record)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a whole listing body, dropping lines that yield no record.
pub fn parse_device_list(body: &str) -> Vec<DeviceRecord> {
    body.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let record = parse_device_line(line);
            if record.is_none() {
                trace!(line, "skipping listing line without transport id");
            }
            record
        })
        .collect()
}

// ── Queries ──────────────────────────────────────────────────────

/// Enumerate attached devices on a fresh connection.
///
/// The connection is closed before returning, whether the query
/// succeeded or not.
pub async fn list_devices(config: &ServerConfig) -> Result<Vec<DeviceRecord>> {
    let mut conn = transport::connect(config).await?;
    let result = list_devices_on(&mut conn).await;
    let _ = conn.shutdown().await;
    result
}

/// Run the listing query on an already-connected socket.
pub async fn list_devices_on<S>(conn: &mut S) -> Result<Vec<DeviceRecord>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    session::send(conn, LIST_DEVICES_QUERY).await?;

    // The server closes its side after the body, so buffering past it
    // through the framed reader is harmless.
    let mut frames = FramedRead::new(conn, HostCodec);
    let body = match frames.next().await {
        Some(frame) => frame?,
        None => return Err(TetherError::Protocol("unexpected end of stream")),
    };

    let devices = parse_device_list(&body);
    debug!(count = devices.len(), "listed devices");
    Ok(devices)
}

// ── Tests ────────────────────────────────────────────────────────
