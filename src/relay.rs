// src/relay.rs

//! Stream relay: copy one child stream to the local terminal while keeping
//! a copy of everything seen.
//!
//! Two relays run at once (stdout and stderr), each as its own task. They
//! share nothing; each hands its result back through its `JoinHandle`.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;

use crate::error::{RelayError, StreamKind};

/// Bytes read per chunk.
pub const CHUNK_SIZE: usize = 1024;

pub type RelayResult = Result<Vec<u8>, RelayError>;

/// Relay child stdout to the local stdout.
pub fn spawn_stdout<R>(rd: R) -> JoinHandle<RelayResult>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    spawn_relay(rd, tokio::io::stdout(), StreamKind::Stdout)
}

/// Relay child stderr to the local stderr.
pub fn spawn_stderr<R>(rd: R) -> JoinHandle<RelayResult>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    spawn_relay(rd, tokio::io::stderr(), StreamKind::Stderr)
}

pub fn spawn_relay<R, W>(rd: R, wr: W, stream: StreamKind) -> JoinHandle<RelayResult>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(copy_and_capture(rd, wr, stream))
}

/// Copy `rd` into `wr` chunk by chunk, capturing every byte.
///
/// Each chunk is written and flushed before the next read, so output shows
/// up as soon as the child produces it. End of stream is success. Any other
/// failure returns immediately, with what was captured up to that point.
pub async fn copy_and_capture<R, W>(mut rd: R, mut wr: W, stream: StreamKind) -> RelayResult
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = [0u8; CHUNK_SIZE];
    let mut captured = Vec::new();

    loop {
        let n = match rd.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                tracing::debug!(%stream, error = %source, "relay read failed");
                return Err(RelayError::Read {
                    stream,
                    source,
                    captured,
                });
            }
        };

        let chunk = &buf[..n];
        captured.extend_from_slice(chunk);

        if let Err(source) = forward(&mut wr, chunk).await {
            return Err(RelayError::Write {
                stream,
                source,
                captured,
            });
        }
    }

    tracing::debug!(%stream, bytes = captured.len(), "relay reached end of stream");
    Ok(captured)
}

async fn forward<W>(wr: &mut W, chunk: &[u8]) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    wr.write_all(chunk).await?;
    wr.flush().await
}

/// Wait for a relay task. A task that panicked or was cancelled becomes a
/// relay failure; a stream that was never piped counts as empty.
pub async fn join(task: Option<JoinHandle<RelayResult>>, stream: StreamKind) -> RelayResult {
    let Some(task) = task else {
        return Ok(Vec::new());
    };

    match task.await {
        Ok(result) => result,
        Err(e) => Err(RelayError::Aborted {
            stream,
            reason: e.to_string(),
        }),
    }
}
