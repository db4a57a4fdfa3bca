//! In-memory connection double for exercising the protocol without a
//! server.

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

#[derive(Debug, Default)]
struct Script {
    inbound: VecDeque<u8>,
    writes: Vec<Vec<u8>>,
    shutdowns: usize,
    writes_after_shutdown: usize,
}

/// A connection that replays canned server bytes and records every
/// write and shutdown. Clones share state so a test can keep a handle
/// after the connection has been moved into the code under test.
///
/// Reads past the end of the script observe EOF.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedConnection {
    script: Arc<Mutex<Script>>,
}

impl ScriptedConnection {
    pub(crate) fn replying(bytes: &[u8]) -> Self {
        let conn = Self::default();
        conn.script.lock().unwrap().inbound.extend(bytes);
        conn
    }

    /// Each `poll_write` call, in order.
    pub(crate) fn writes(&self) -> Vec<Vec<u8>> {
        self.script.lock().unwrap().writes.clone()
    }

    /// All written bytes concatenated.
    pub(crate) fn written(&self) -> Vec<u8> {
        self.writes().concat()
    }

    pub(crate) fn unread(&self) -> Vec<u8> {
        self.script.lock().unwrap().inbound.iter().copied().collect()
    }

    pub(crate) fn shutdowns(&self) -> usize {
        self.script.lock().unwrap().shutdowns
    }

    pub(crate) fn writes_after_shutdown(&self) -> usize {
        self.script.lock().unwrap().writes_after_shutdown
    }
}

impl AsyncRead for ScriptedConnection {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let mut script = self.script.lock().unwrap();
        let n = buf.remaining().min(script.inbound.len());
        let chunk: Vec<u8> = script.inbound.drain(..n).collect();
        buf.put_slice(&chunk);
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for ScriptedConnection {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let mut script = self.script.lock().unwrap();
        if script.shutdowns > 0 {
            script.writes_after_shutdown += 1;
            return Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()));
        }
        script.writes.push(buf.to_vec());
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.script.lock().unwrap().shutdowns += 1;
        Poll::Ready(Ok(()))
    }
}
