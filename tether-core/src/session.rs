//! Single request → status exchange on an already-connected socket.
//!
//! ```text
//! Client ──[hex4 len][command]──────────► Server
//! Server ──OKAY─────────────────────────► Client   (nothing else consumed)
//!   or
//! Server ──FAIL[hex4 len][diagnostic]───► Client
//! ```
//!
//! No retries happen here: a rejected command is reported verbatim.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::codec::{self, Status};
use crate::error::{Result, TetherError};

/// Send `command` and wait for its status.
///
/// On `OKAY` nothing past the status token is read, so the caller can
/// continue with whatever the server sends next (a payload, or raw
/// stream bytes).
pub async fn send<S>(conn: &mut S, command: &str) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + ?Sized,
{
    let frame = codec::encode(command)?;
    conn.write_all(&frame).await?;
    conn.flush().await?;

    let token = codec::read_token(conn).await?;
    match Status::from_token(&token)? {
        Status::Okay => {
            debug!(command, "OKAY");
            Ok(())
        }
        Status::Fail => {
            let diagnostic = codec::read_frame(conn).await?;
            debug!(command, %diagnostic, "FAIL");
            Err(TetherError::CommandFailed {
                command: command.to_string(),
                diagnostic,
            })
        }
    }
}

/// Read one length-prefixed response body (listing, features, version).
pub async fn read_response_payload<S>(conn: &mut S) -> Result<String>
where
    S: AsyncRead + Unpin + ?Sized,
{
    codec::read_frame(conn).await
}

// ── Tests ────────────────────────────────────────────────────────
