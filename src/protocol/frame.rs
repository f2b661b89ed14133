//! Length-prefixed framing: int32 (BE) length + payload.

use crate::error::{Result, StreamletError};
use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Default upper bound on a declared frame length.
pub const DEFAULT_MAX_FRAME_LEN: usize = 1024 * 1024;

/// Read one frame. Returns `Ok(None)` when the peer closes cleanly between frames.
///
/// A zero-length frame yields an empty payload. A declared length above
/// `max_frame_len` fails before anything is allocated.
pub async fn read_frame<R>(reader: &mut R, max_frame_len: usize) -> Result<Option<Bytes>>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    let mut filled = 0;
    while filled < len_buf.len() {
        let n = reader.read(&mut len_buf[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed inside length prefix",
            )
            .into());
        }
        filled += n;
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > max_frame_len {
        return Err(StreamletError::FrameTooLarge {
            len,
            max: max_frame_len,
        });
    }
    if len == 0 {
        return Ok(Some(Bytes::new()));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(Some(Bytes::from(payload)))
}

/// Prepend the 4-byte length to `payload`.
pub fn frame_response(payload: &[u8]) -> BytesMut {
    let mut out = BytesMut::with_capacity(4 + payload.len());
    out.put_u32(payload.len() as u32);
    out.extend_from_slice(payload);
    out
}

/// Write `payload` as a single frame with one `write_all`, then flush.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let framed = frame_response(payload);
    writer.write_all(&framed).await?;
    writer.flush().await?;
    Ok(())
}
