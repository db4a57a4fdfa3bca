//! Shuttles bytes between local stdio and an opened device stream.

use std::io;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

/// Copy `input` to the stream and the stream to `output`.
///
/// When `input` runs dry the stream's write side is shut down and the
/// remote output is still drained. Returns once the remote side hangs
/// up, with the number of bytes written to `output`.
pub async fn pipe<S, I, O>(stream: S, mut input: I, mut output: O) -> io::Result<u64>
where
    S: AsyncRead + AsyncWrite,
    I: AsyncRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let (mut rd, mut wr) = tokio::io::split(stream);

    let upload = async {
        tokio::io::copy(&mut input, &mut wr).await?;
        wr.shutdown().await
    };
    let download = async {
        let n = tokio::io::copy(&mut rd, &mut output).await?;
        output.flush().await?;
        Ok::<_, io::Error>(n)
    };
    tokio::pin!(upload);
    tokio::pin!(download);

    let mut uploaded = false;
    loop {
        tokio::select! {
            res = &mut upload, if !uploaded => {
                res?;
                uploaded = true;
            }
            res = &mut download => return res,
        }
    }
}
