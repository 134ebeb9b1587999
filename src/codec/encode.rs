use uuid::Uuid;

use crate::constants::UUID_LEN;
use crate::error::CodecError;

/// Checks that `width` bytes fit at `offset` and returns the offset past them.
fn reserve(buffer: &[u8], offset: usize, width: usize) -> Result<usize, CodecError> {
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

    Ok(offset + width)
}

fn put(buffer: &mut [u8], offset: usize, bytes: &[u8]) -> Result<usize, CodecError> {
    let end = reserve(buffer, offset, bytes.len())?;
    buffer[offset..end].copy_from_slice(bytes);
    Ok(end)
}

pub fn unsigned_varint_len(mut value: u64) -> usize {
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}

pub fn nullable_string_len(value: Option<&str>) -> usize {
    2 + value.map_or(0, str::len)
}

pub fn compact_string_len(value: &str) -> usize {
    unsigned_varint_len(value.len() as u64 + 1) + value.len()
}

pub fn compact_nullable_string_len(value: Option<&str>) -> usize {
    value.map_or(1, compact_string_len)
}

pub fn encode_int8(buffer: &mut [u8], offset: usize, value: i8) -> Result<usize, CodecError> {
    put(buffer, offset, &value.to_be_bytes())
}

pub fn encode_int16(buffer: &mut [u8], offset: usize, value: i16) -> Result<usize, CodecError> {
    put(buffer, offset, &value.to_be_bytes())
}

pub fn encode_int32(buffer: &mut [u8], offset: usize, value: i32) -> Result<usize, CodecError> {
    put(buffer, offset, &value.to_be_bytes())
}

pub fn encode_bool(buffer: &mut [u8], offset: usize, value: bool) -> Result<usize, CodecError> {
    put(buffer, offset, &[value as u8])
}

pub fn encode_unsigned_varint(
    buffer: &mut [u8],
    mut offset: usize,
    mut value: u64,
) -> Result<usize, CodecError> {
    reserve(buffer, offset, unsigned_varint_len(value))?;
    while value >= 0x80 {
        buffer[offset] = ((value & 0x7f) as u8) | 0x80;
        value >>= 7;
        offset += 1;
    }
    buffer[offset] = value as u8;
    Ok(offset + 1)
}

pub fn encode_nullable_string(
    buffer: &mut [u8],
    offset: usize,
    value: Option<&str>,
) -> Result<usize, CodecError> {
    reserve(buffer, offset, nullable_string_len(value))?;
    match value {
        None => encode_int16(buffer, offset, -1),
        Some(s) => {
            let len = i16::try_from(s.len()).map_err(|_| {
                CodecError::InvalidEncoding(format!(
                    "string of {} bytes exceeds int16 length",
                    s.len()
                ))
            })?;
            let offset = encode_int16(buffer, offset, len)?;
            put(buffer, offset, s.as_bytes())
        }
    }
}

/// Writes varint `len + 1` then the bytes; `""` encodes as the single byte `0x01`.
pub fn encode_compact_string(
    buffer: &mut [u8],
    offset: usize,
    value: &str,
) -> Result<usize, CodecError> {
    reserve(buffer, offset, compact_string_len(value))?;
    let offset = encode_unsigned_varint(buffer, offset, value.len() as u64 + 1)?;
    put(buffer, offset, value.as_bytes())
}

pub fn encode_compact_nullable_string(
    buffer: &mut [u8],
    offset: usize,
    value: Option<&str>,
) -> Result<usize, CodecError> {
    match value {
        None => encode_unsigned_varint(buffer, offset, 0),
        Some(s) => encode_compact_string(buffer, offset, s),
    }
}

/// Writes a UUID given as hex, with or without dashes, as 16 raw bytes.
pub fn encode_uuid(buffer: &mut [u8], offset: usize, value: &str) -> Result<usize, CodecError> {
    let hex: String = value.chars().filter(|c| *c != '-').collect();
    if let Some(bad) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(CodecError::InvalidEncoding(format!(
            "UUID {value:?} contains non-hex character {bad:?}"
        )));
    }
    if hex.len() != UUID_LEN * 2 {
        return Err(CodecError::InvalidEncoding(format!(
            "UUID {value:?} decodes to {} bytes, expected {UUID_LEN}",
            hex.len() / 2
        )));
    }

    let uuid = Uuid::try_parse(&hex)
        .map_err(|e| CodecError::InvalidEncoding(format!("invalid UUID {value:?}: {e}")))?;
    put(buffer, offset, uuid.as_bytes())
}
