use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::ServerError;

/// Reads one size-prefixed request frame.
///
/// The returned buffer still starts with the 4-byte size, since the header
/// parser decodes it as `message_size`.
pub async fn read_frame<R>(stream: &mut R, max_message_size: usize) -> Result<Vec<u8>, ServerError>
where
    R: AsyncRead + Unpin,
{
    let size = stream.read_i32().await?;
    if size <= 0 || size as usize > max_message_size {
        return Err(ServerError::InvalidMessageSize {
            size,
            max: max_message_size,
        });
    }

    let mut frame = vec![0; 4 + size as usize];
    frame[..4].copy_from_slice(&size.to_be_bytes());
    stream.read_exact(&mut frame[4..]).await?;
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_frame_with_size_prefix() {
        let mut input: &[u8] = &[0x00, 0x00, 0x00, 0x02, 0xab, 0xcd, 0xef];
        let frame = read_frame(&mut input, 1024).await.unwrap();
        assert_eq!(frame, vec![0x00, 0x00, 0x00, 0x02, 0xab, 0xcd]);
        assert_eq!(input, &[0xef]);
    }

    #[tokio::test]
    async fn rejects_non_positive_and_oversized_frames() {
        let mut zero: &[u8] = &[0x00, 0x00, 0x00, 0x00];
        assert!(matches!(
            read_frame(&mut zero, 1024).await,
            Err(ServerError::InvalidMessageSize { size: 0, .. })
        ));

        let mut big: &[u8] = &[0x00, 0x00, 0x08, 0x00];
        assert!(matches!(
            read_frame(&mut big, 1024).await,
            Err(ServerError::InvalidMessageSize { size: 2048, max: 1024 })
        ));
    }

    #[tokio::test]
    async fn eof_mid_frame_is_io_error() {
        let mut input: &[u8] = &[0x00, 0x00, 0x00, 0x08, 0x01];
        match read_frame(&mut input, 1024).await {
            Err(ServerError::IoError(e)) => {
                assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof)
            }
            other => panic!("expected EOF, got {other:?}"),
        }
    }
}
