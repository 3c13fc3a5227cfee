//! Length-prefixed message framing.
//!
//! Domain sockets and named pipes provide no message boundaries: the OS may
//! split or coalesce writes arbitrarily. Each logical message is therefore
//! preceded by its encoded byte length as a 4-byte big-endian u32, and the
//! reader accumulates partial reads until exactly that many bytes arrive.
//!
//! # Wire format
//!
//! ```text
//! [4 bytes, big-endian u32: N = byte length of payload]
//! [N bytes: payload]
//! ```

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{IpcError, IpcResult};

/// Maximum accepted payload length, to keep a corrupt or hostile length
/// prefix from allocating unbounded memory.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Write one length-prefixed frame.
///
/// The prefix is computed from the encoded byte length, not the character
/// count, so multi-byte text is measured correctly.
pub async fn write_frame<W>(writer: &mut W, payload: &str) -> IpcResult<()>
where
    W: AsyncWrite + Unpin,
{
    let bytes = payload.as_bytes();
    if bytes.len() > MAX_FRAME_LEN {
        return Err(IpcError::Protocol(format!(
            "frame of {} bytes exceeds maximum of {} bytes",
            bytes.len(),
            MAX_FRAME_LEN
        )));
    }

    let len = bytes.len() as u32;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(bytes).await?;
    writer.flush().await?;

    Ok(())
}

/// Read one length-prefixed frame.
///
/// Returns `Ok(None)` if the peer closes the stream before a full 4-byte
/// length prefix arrives (clean end of stream, no message). Once a length
/// has been declared, an early close is a truncated message and fails with
/// [`IpcError::TruncatedFrame`].
pub async fn read_frame<R>(reader: &mut R) -> IpcResult<Option<String>>
where
    R: AsyncRead + Unpin,
{
    // Length prefix. EOF anywhere inside it means the peer is done sending.
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            return Ok(None);
        }
        filled += n;
    }

    let expected = u32::from_be_bytes(header) as usize;
    if expected > MAX_FRAME_LEN {
        return Err(IpcError::Protocol(format!(
            "declared frame length {} exceeds maximum of {} bytes",
            expected, MAX_FRAME_LEN
        )));
    }

    // Body. The declared count must be satisfied across partial reads.
    let mut body = vec![0u8; expected];
    let mut received = 0;
    while received < expected {
        let n = reader.read(&mut body[received..]).await?;
        if n == 0 {
            return Err(IpcError::TruncatedFrame { expected, received });
        }
        received += n;
    }

    let text = String::from_utf8(body)
        .map_err(|e| IpcError::Protocol(format!("frame is not valid UTF-8: {e}")))?;

    Ok(Some(text))
}
