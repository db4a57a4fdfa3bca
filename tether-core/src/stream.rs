//! Raw duplex stream handed to the caller after a successful handshake.
//!
//! Once both handshake steps succeed the socket is in pass-through
//! mode: bytes are neither framed nor inspected. [`HostStream`] only
//! adds a read deadline on top of the wrapped transport.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::TcpStream;
use tokio::time::Sleep;

use crate::error::Result;

/// A raw bidirectional byte channel bound to one server connection.
///
/// Owned exclusively by whoever holds it. Dropping it, or calling
/// [`close`](Self::close), closes the underlying socket.
pub struct HostStream<S = TcpStream> {
    inner: S,
    read_timeout: Option<Duration>,
    /// Armed while a read is pending; cleared on every completed read.
    deadline: Option<Pin<Box<Sleep>>>,
}

impl<S> HostStream<S> {
    /// Wrap `inner`, failing any read that stays pending longer than
    /// `read_timeout`.
    pub fn new(inner: S, read_timeout: Option<Duration>) -> Self {
        Self {
            inner,
            read_timeout,
            deadline: None,
        }
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }
}

impl<S: AsyncWrite + Unpin> HostStream<S> {
    /// Shut the connection down and release it.
    pub async fn close(mut self) -> Result<()> {
        self.inner.shutdown().await?;
        Ok(())
    }
}

impl<S> std::fmt::Debug for HostStream<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostStream")
            .field("read_timeout", &self.read_timeout)
            .field("read_pending", &self.deadline.is_some())
            .finish()
    }
}

// ── AsyncRead / AsyncWrite ───────────────────────────────────────

impl<S: AsyncRead + Unpin> AsyncRead for HostStream<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(result) => {
                this.deadline = None;
                Poll::Ready(result)
            }
            Poll::Pending => {
                let Some(timeout) = this.read_timeout else {
                    return Poll::Pending;
                };
                let deadline = this
                    .deadline
                    .get_or_insert_with(|| Box::pin(tokio::time::sleep(timeout)));
                match deadline.as_mut().poll(cx) {
                    Poll::Ready(()) => {
                        this.deadline = None;
                        Poll::Ready(Err(io::Error::new(
                            io::ErrorKind::TimedOut,
                            format!("no data received within {timeout:?}"),
                        )))
                    }
                    Poll::Pending => Poll::Pending,
                }
            }
        }
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for HostStream<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().inner).poll_write(cx, buf)
    }

    fn poll_write_vectored(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().inner).poll_write_vectored(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}

// ── Tests ────────────────────────────────────────────────────────
