//! Wire codec for the host control protocol.
//!
//! Every request and every string response is a *frame*:
//!
//! ```text
//! length:   4 ASCII hex digits, lowercase, zero-padded (UTF-8 byte count)
//! payload:  `length` bytes of UTF-8
//! ```
//!
//! Responses to a request start with a 4-byte status token, `OKAY` or
//! `FAIL`. A `FAIL` is followed by one frame holding the server's
//! diagnostic text.

use bytes::{Buf, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{Result, TetherError};

// ── Constants ────────────────────────────────────────────────────

/// Size of the hex length prefix in bytes.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Size of a status token in bytes.
pub const STATUS_SIZE: usize = 4;

/// Largest payload a 4-hex-digit prefix can describe.
pub const MAX_FRAME_LEN: usize = 0xFFFF;

// ── Status ───────────────────────────────────────────────────────

/// Status token the server sends after every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Okay,
    Fail,
}

impl Status {
    pub fn from_token(token: &[u8; STATUS_SIZE]) -> Result<Self> {
        match token {
            b"OKAY" => Ok(Self::Okay),
            b"FAIL" => Ok(Self::Fail),
            _ => Err(TetherError::Protocol("unexpected status token")),
        }
    }
}

// ── Free functions ───────────────────────────────────────────────

/// Frame `command` for the wire: `hex4(len) + command`.
pub fn encode(command: &str) -> Result<Bytes> {
    let mut dst = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + command.len());
    HostCodec.encode(command, &mut dst)?;
    Ok(dst.freeze())
}

/// Parse a 4-byte ASCII hex length prefix.
///
/// Both cases are accepted; anything other than four hex digits is a
/// protocol violation.
pub fn decode_length(prefix: &[u8; LENGTH_PREFIX_SIZE]) -> Result<usize> {
    prefix
        .iter()
        .try_fold(0usize, |acc, b| {
            (*b as char).to_digit(16).map(|d| (acc << 4) | d as usize)
        })
        .ok_or(TetherError::InvalidLengthPrefix(*prefix))
}

/// Decode one complete frame from the front of `src`.
///
/// Returns `Ok(None)` and leaves `src` untouched while the frame is
/// still incomplete.
pub fn decode_frame(src: &mut BytesMut) -> Result<Option<String>> {
    HostCodec.decode(src)
}

/// Read exactly `n` bytes, treating early EOF as a protocol violation.
pub async fn read_exact<R>(source: &mut R, n: usize) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = vec![0u8; n];
    source.read_exact(&mut buf).await.map_err(read_error)?;
    Ok(buf)
}

/// Read one fixed 4-byte token (status or length prefix).
pub async fn read_token<R>(source: &mut R) -> Result<[u8; 4]>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut token = [0u8; 4];
    source.read_exact(&mut token).await.map_err(read_error)?;
    Ok(token)
}

/// Read one length-prefixed UTF-8 frame.
pub async fn read_frame<R>(source: &mut R) -> Result<String>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let len = decode_length(&read_token(source).await?)?;
    let body = read_exact(source, len).await?;
    Ok(String::from_utf8(body)?)
}

fn read_error(e: std::io::Error) -> TetherError {
    match e.kind() {
        std::io::ErrorKind::UnexpectedEof => TetherError::Protocol("unexpected end of stream"),
        _ => TetherError::Connection(e),
    }
}

// ── HostCodec ────────────────────────────────────────────────────

/// `tokio_util` codec for length-prefixed string frames.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostCodec;

impl Decoder for HostCodec {
    type Item = String;
    type Error = TetherError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if src.len() < LENGTH_PREFIX_SIZE {
            return Ok(None);
        }

        let prefix = [src[0], src[1], src[2], src[3]];
        let len = decode_length(&prefix)?;
        if src.len() < LENGTH_PREFIX_SIZE + len {
            src.reserve(LENGTH_PREFIX_SIZE + len - src.len());
            return Ok(None);
        }

        src.advance(LENGTH_PREFIX_SIZE);
        let body = src.split_to(len);
        Ok(Some(String::from_utf8(body.to_vec())?))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            None => Err(TetherError::Protocol("unexpected end of stream")),
        }
    }
}

impl<'a> Encoder<&'a str> for HostCodec {
    type Error = TetherError;

    fn encode(&mut self, item: &'a str, dst: &mut BytesMut) -> Result<()> {
        let len = item.len();
        if len > MAX_FRAME_LEN {
            return Err(TetherError::CommandTooLong {
                size: len,
                max: MAX_FRAME_LEN,
            });
        }

        dst.reserve(LENGTH_PREFIX_SIZE + len);
        dst.extend_from_slice(format!("{len:04x}").as_bytes());
        dst.extend_from_slice(item.as_bytes());
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────
