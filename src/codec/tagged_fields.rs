use super::{
    compact_string_len, decode_compact_string, decode_unsigned_varint, encode_compact_string,
    encode_unsigned_varint, unsigned_varint_len, TaggedFields,
};
use crate::error::CodecError;

/// Decodes `count` then `count × (tag id, compact string)`.
pub fn decode_tagged_fields(
    buffer: &[u8],
    offset: usize,
) -> Result<(TaggedFields, usize), CodecError> {
    let (count, mut offset) = decode_unsigned_varint(buffer, offset)?;

    let mut fields = TaggedFields::new();
    for _ in 0..count {
        let (tag, next) = decode_unsigned_varint(buffer, offset)?;
        let (value, next) = decode_compact_string(buffer, next)?;
        if fields.insert(tag, value).is_some() {
            return Err(CodecError::InvalidEncoding(format!(
                "duplicate tag id {tag} in tagged fields"
            )));
        }
        offset = next;
    }

    Ok((fields, offset))
}

/// Encoded size of `fields`, including the count prefix.
pub fn tagged_fields_len(fields: &TaggedFields) -> usize {
    fields.iter().fold(
        unsigned_varint_len(fields.len() as u64),
        |len, (tag, value)| len + unsigned_varint_len(*tag) + compact_string_len(value),
    )
}

/// Writes the count then each entry. Tag ids must fit in 32 bits; every id
/// and the total size are checked before the first byte is written.
pub fn encode_tagged_fields(
    buffer: &mut [u8],
    offset: usize,
    fields: &TaggedFields,
) -> Result<usize, CodecError> {
    if let Some(tag) = fields.keys().find(|tag| u32::try_from(**tag).is_err()) {
        return Err(CodecError::InvalidTagId(*tag));
    }

    if offset > buffer.len() {
        return Err(CodecError::InvalidOffset {
            offset,
            len: buffer.len(),
        });
    }
    let needed = tagged_fields_len(fields);
    let available = buffer.len() - offset;
    if needed > available {
        return Err(CodecError::BufferTooSmall { needed, available });
    }

    let mut offset = encode_unsigned_varint(buffer, offset, fields.len() as u64)?;
    for (tag, value) in fields {
        offset = encode_unsigned_varint(buffer, offset, *tag)?;
        offset = encode_compact_string(buffer, offset, value)?;
    }
    Ok(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_block_is_single_zero_byte() {
        let mut buffer = [0xffu8; 1];
        let offset = encode_tagged_fields(&mut buffer, 0, &TaggedFields::new()).unwrap();
        assert_eq!(offset, 1);
        assert_eq!(buffer, [0x00]);
        assert_eq!(decode_tagged_fields(&buffer, 0).unwrap(), (TaggedFields::new(), 1));
    }

    #[test]
    fn decodes_single_field() {
        let buffer = [0x01, 0x00, 0x04, b'b', b'a', b'r'];
        let (fields, offset) = decode_tagged_fields(&buffer, 0).unwrap();
        assert_eq!(offset, 6);
        assert_eq!(fields.get(&0).map(String::as_str), Some("bar"));
    }

    #[test]
    fn encodes_fields_in_tag_order() {
        let fields = TaggedFields::from([(5, "x".to_string()), (1, String::new())]);
        let mut buffer = vec![0u8; tagged_fields_len(&fields)];
        let offset = encode_tagged_fields(&mut buffer, 0, &fields).unwrap();
        assert_eq!(offset, buffer.len());
        assert_eq!(buffer, [0x02, 0x01, 0x01, 0x05, 0x02, b'x']);
    }

    #[test]
    fn rejects_tag_ids_wider_than_32_bits() {
        let fields = TaggedFields::from([(1, "ok".to_string()), (1 << 32, "big".to_string())]);
        let mut buffer = [0xaau8; 32];
        assert_eq!(
            encode_tagged_fields(&mut buffer, 0, &fields),
            Err(CodecError::InvalidTagId(1 << 32))
        );
        assert!(buffer.iter().all(|b| *b == 0xaa));
    }

    #[test]
    fn rejects_short_buffer_without_writing() {
        let fields = TaggedFields::from([(0, "value".to_string())]);
        let mut buffer = [0xaau8; 4];
        assert!(matches!(
            encode_tagged_fields(&mut buffer, 0, &fields),
            Err(CodecError::BufferTooSmall { .. })
        ));
        assert_eq!(buffer, [0xaa; 4]);
    }

    #[test]
    fn truncated_block_fails() {
        let buffer = [0x02, 0x00, 0x02, b'a', 0x01];
        assert!(decode_tagged_fields(&buffer, 0).is_err());
        assert!(decode_tagged_fields(&[0x01, 0x00, 0x00], 0).is_err());
    }

    #[test]
    fn duplicate_tag_ids_are_rejected() {
        let buffer = [0x02, 0x00, 0x01, 0x00, 0x01];
        assert!(matches!(
            decode_tagged_fields(&buffer, 0),
            Err(CodecError::InvalidEncoding(_))
        ));
    }
}
