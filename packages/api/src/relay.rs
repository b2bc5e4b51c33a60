//! Byte-for-byte passthrough of an upstream body

use futures::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use trifetch_client::{ResponseBody, Result, error};

/// Copy `body` into `writer` untouched and return the number of bytes
/// written.
///
/// Status and headers are already committed by the time this runs, so a
/// failure here is logged and surfaced as a stream copy error for the caller
/// to record; there is nothing left to answer the client with. The upstream
/// connection is closed on every path.
pub async fn relay<W>(mut body: ResponseBody, writer: &mut W) -> Result<u64>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut copied = 0u64;

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| copy_failed(copied, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| copy_failed(copied, e))?;
        copied += chunk.len() as u64;
    }

    writer.flush().await.map_err(|e| copy_failed(copied, e))?;
    body.close();

    tracing::debug!(target: "trifetch::relay", bytes = copied, "relay complete");
    Ok(copied)
}

fn copy_failed<E>(copied: u64, e: E) -> trifetch_client::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let err = error::stream_copy(e);
    tracing::warn!(target: "trifetch::relay", bytes = copied, error = %err, "relay stopped early");
    err
}
