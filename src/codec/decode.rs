use bytes::Buf;
use uuid::Uuid;

use crate::constants::{MAX_VARINT_LEN64, UUID_LEN};
use crate::error::CodecError;

/// Borrows `width` bytes at `offset`, returning them with the offset just past them.
fn take(buffer: &[u8], offset: usize, width: usize) -> Result<(&[u8], usize), CodecError> {
    if offset > buffer.len() {
        return Err(CodecError::InvalidOffset {
            offset,
            len: buffer.len(),
        });
    }

    let available = buffer.len() - offset;
    if width > available {
        return Err(CodecError::BufferTooSmall {
            needed: width,
            available,
        });
    }

    Ok((&buffer[offset..offset + width], offset + width))
}

fn utf8(bytes: &[u8]) -> Result<String, CodecError> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| CodecError::InvalidEncoding(format!("string is not valid UTF-8: {e}")))
}

pub fn decode_int8(buffer: &[u8], offset: usize) -> Result<(i8, usize), CodecError> {
    let (mut bytes, offset) = take(buffer, offset, 1)?;
    Ok((bytes.get_i8(), offset))
}

pub fn decode_int16(buffer: &[u8], offset: usize) -> Result<(i16, usize), CodecError> {
    let (mut bytes, offset) = take(buffer, offset, 2)?;
    Ok((bytes.get_i16(), offset))
}

pub fn decode_int32(buffer: &[u8], offset: usize) -> Result<(i32, usize), CodecError> {
    let (mut bytes, offset) = take(buffer, offset, 4)?;
    Ok((bytes.get_i32(), offset))
}

/// Any non-zero byte is `true`.
pub fn decode_bool(buffer: &[u8], offset: usize) -> Result<(bool, usize), CodecError> {
    let (bytes, offset) = take(buffer, offset, 1)?;
    Ok((bytes[0] != 0, offset))
}

/// Reads 16 raw bytes and renders them as a lowercase hyphenated UUID.
pub fn decode_uuid(buffer: &[u8], offset: usize) -> Result<(String, usize), CodecError> {
    let (bytes, offset) = take(buffer, offset, UUID_LEN)?;
    let uuid = Uuid::from_slice(bytes)
        .map_err(|e| CodecError::InvalidEncoding(format!("invalid UUID bytes: {e}")))?;
    Ok((uuid.hyphenated().to_string(), offset))
}

/// `int16` length followed by that many bytes; `-1` is null and consumes
/// nothing past the length.
pub fn decode_nullable_string(
    buffer: &[u8],
    offset: usize,
) -> Result<(Option<String>, usize), CodecError> {
    let (length, offset) = decode_int16(buffer, offset)?;
    match length {
        -1 => Ok((None, offset)),
        len if len < -1 => Err(CodecError::InvalidEncoding(format!(
            "negative nullable string length {len}"
        ))),
        len => {
            let (bytes, offset) = take(buffer, offset, len as usize)?;
            Ok((Some(utf8(bytes)?), offset))
        }
    }
}

/// LEB128 unsigned varint: 7 data bits per byte, high bit set on every byte
/// but the last.
pub fn decode_unsigned_varint(buffer: &[u8], offset: usize) -> Result<(u64, usize), CodecError> {
    if offset > buffer.len() {
        return Err(CodecError::InvalidOffset {
            offset,
            len: buffer.len(),
        });
    }

    let mut value = 0u64;
    for (i, &byte) in buffer[offset..].iter().take(MAX_VARINT_LEN64).enumerate() {
        if byte < 0x80 {
            // the tenth byte may only carry the top bit of a u64
            if i == MAX_VARINT_LEN64 - 1 && byte > 1 {
                return Err(CodecError::InvalidEncoding("varint overflows u64".into()));
            }
            return Ok((value | (byte as u64) << (7 * i), offset + i + 1));
        }
        value |= ((byte & 0x7f) as u64) << (7 * i);
    }

    let available = buffer.len() - offset;
    if available >= MAX_VARINT_LEN64 {
        return Err(CodecError::InvalidEncoding(
            "varint longer than 10 bytes".into(),
        ));
    }
    Err(CodecError::BufferTooSmall {
        needed: available + 1,
        available,
    })
}

/// Reads the compact length prefix, returning `None` for the null marker `0`.
fn decode_compact_len(buffer: &[u8], offset: usize) -> Result<(Option<usize>, usize), CodecError> {
    let (n, offset) = decode_unsigned_varint(buffer, offset)?;
    if n == 0 {
        return Ok((None, offset));
    }
    let len = usize::try_from(n - 1).map_err(|_| {
        CodecError::InvalidEncoding(format!("compact length {n} does not fit in memory"))
    })?;
    Ok((Some(len), offset))
}

/// Varint `len + 1` followed by `len` bytes. A zero prefix is invalid here;
/// use [`decode_compact_nullable_string`] where null is allowed.
pub fn decode_compact_string(buffer: &[u8], offset: usize) -> Result<(String, usize), CodecError> {
    match decode_compact_len(buffer, offset)? {
        (None, _) => Err(CodecError::InvalidEncoding(
            "compact string length must not be 0".into(),
        )),
        (Some(len), offset) => {
            let (bytes, offset) = take(buffer, offset, len)?;
            Ok((utf8(bytes)?, offset))
        }
    }
}

pub fn decode_compact_nullable_string(
    buffer: &[u8],
    offset: usize,
) -> Result<(Option<String>, usize), CodecError> {
    match decode_compact_len(buffer, offset)? {
        (None, offset) => Ok((None, offset)),
        (Some(len), offset) => {
            let (bytes, offset) = take(buffer, offset, len)?;
            Ok((Some(utf8(bytes)?), offset))
        }
    }
}
