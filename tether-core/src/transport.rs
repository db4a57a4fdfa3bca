//! Transport binding: connect, pick a device, pick a service.
//!
//! ```text
//! Client ──connect──────────────────────► Server
//! Client ──[selector]  (e.g. host:transport-any)
//! Server ──OKAY / FAIL
//! Client ──[destination] (e.g. shell:)
//! Server ──OKAY / FAIL
//!         ... raw pass-through from here on ...
//! ```
//!
//! The selector's status must be read before the destination is
//! written; the server's state machine depends on that ordering.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::error::{Result, TetherError};
use crate::server::ServerConfig;
use crate::session;
use crate::stream::HostStream;

/// Open a fresh connection to the server.
///
/// The connect is bounded by the configured connect timeout; reads on
/// the returned stream are bounded by the socket timeout.
pub async fn connect(config: &ServerConfig) -> Result<HostStream<TcpStream>> {
    let addr = config.address();
    let timeout = config.connect_timeout();

    debug!(%addr, "connecting to host server");
    let stream = tokio::time::timeout(timeout, TcpStream::connect(&addr))
        .await
        .map_err(|_| TetherError::Timeout(timeout))??;
    stream.set_nodelay(true)?;

    Ok(HostStream::new(stream, config.socket_timeout()))
}

/// Run both handshake steps on `stream`.
///
/// On success the stream is returned to the caller in raw mode. On
/// failure it is shut down before the error is returned, so no
/// connection outlives a failed handshake.
pub async fn bind<S>(mut stream: S, selector: &str, destination: &str) -> Result<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match bind_steps(&mut stream, selector, destination).await {
        Ok(()) => Ok(stream),
        Err(e) => {
            warn!(selector, destination, error = %e, "handshake failed");
            let _ = stream.shutdown().await;
            Err(e)
        }
    }
}

async fn bind_steps<S>(stream: &mut S, selector: &str, destination: &str) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    session::send(stream, selector).await?;
    debug!(selector, "device selected");
    session::send(stream, destination).await?;
    debug!(destination, "destination accepted");
    Ok(())
}

/// Connect and bind in one step.
pub async fn handshake(
    config: &ServerConfig,
    selector: &str,
    destination: &str,
) -> Result<HostStream<TcpStream>> {
    let stream = connect(config).await?;
    bind(stream, selector, destination).await
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::ScriptedConnection;

    #[tokio::test]
    async fn both_steps_succeed() {
        let conn = ScriptedConnection::replying(b"OKAYOKAYraw bytes");
        let probe = conn.clone();

        bind(conn, "host:transport-any", "shell:").await.unwrap();

        assert_eq!(
            probe.writes(),
            vec![b"0012host:transport-any".to_vec(), b"0006shell:".to_vec()]
        );
        // Nothing after the second status belongs to the handshake.
        assert_eq!(probe.unread(), b"raw bytes");
        assert_eq!(probe.shutdowns(), 0);
    }

    #[tokio::test]
    async fn destination_waits_for_selector_status() {
        // The server goes away before answering the selector.
        let conn = ScriptedConnection::default();
        let probe = conn.clone();

        let err = bind(conn, "host:transport-usb", "shell:").await.unwrap_err();

        assert!(matches!(err, TetherError::Protocol("unexpected end of stream")));
        assert_eq!(probe.writes(), vec![b"0012host:transport-usb".to_vec()]);
        assert_eq!(probe.shutdowns(), 1);
    }

    #[tokio::test]
    async fn selector_failure_stops_the_handshake() {
        let conn = ScriptedConnection::replying(b"FAIL0014more than one device");
        let probe = conn.clone();

        let err = bind(conn, "host:transport-any", "shell:").await.unwrap_err();

        assert_eq!(err.diagnostic(), Some("more than one device"));
        assert_eq!(probe.writes().len(), 1);
        assert_eq!(probe.shutdowns(), 1);
    }

    #[tokio::test]
    async fn destination_failure_closes_exactly_once() {
        let conn = ScriptedConnection::replying(b"OKAYFAIL0013closed: unknown svc");
        let probe = conn.clone();

        let err = bind(conn, "host:transport:abc", "nope:").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Command);
        assert_eq!(err.diagnostic(), Some("closed: unknown svc"));
        assert!(err.to_string().contains("nope:"));
        assert_eq!(probe.writes().len(), 2);
        assert_eq!(probe.shutdowns(), 1);
        assert_eq!(probe.writes_after_shutdown(), 0);
    }

    #[tokio::test]
    async fn ordering_with_tokio_test_mock() {
        let conn = tokio_test::io::Builder::new()
            .write(b"0012host:transport-any")
            .read(b"OKAY")
            .write(b"0006shell:")
            .read(b"OKAY")
            .build();

        bind(conn, "host:transport-any", "shell:").await.unwrap();
    }

    #[tokio::test]
    async fn refused_connection_is_a_connection_error() {
        // Bind then drop a listener so the port is very likely closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = connect(&ServerConfig::new("127.0.0.1", port)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
    }
}
