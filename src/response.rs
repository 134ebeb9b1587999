use bytes::{Bytes, BytesMut};

use crate::codec::{
    compact_nullable_string_len, compact_string_len, encode_bool, encode_compact_nullable_string,
    encode_compact_string, encode_int16, encode_int32, encode_int8, encode_tagged_fields,
    encode_unsigned_varint, encode_uuid, tagged_fields_len, unsigned_varint_len, TaggedFields,
};
use crate::constants::{RESPONSE_SIZE_LEN, UUID_LEN};
use crate::error::{CodecError, ProtocolError};

/// Builds a size-prefixed response.
///
/// The buffer starts with a 4-byte size placeholder and grows by exactly the
/// encoded width of each field; [`ResponseWriter::finish`] backpatches the
/// placeholder with the number of bytes that follow it.
#[derive(Debug)]
pub struct ResponseWriter {
    buf: BytesMut,
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseWriter {
    pub fn new() -> Self {
        let mut buf = BytesMut::with_capacity(64);
        buf.resize(RESPONSE_SIZE_LEN, 0);
        ResponseWriter { buf }
    }

    fn write<F>(&mut self, what: &str, len: usize, encode: F) -> Result<&mut Self, ProtocolError>
    where
        F: FnOnce(&mut [u8], usize) -> Result<usize, CodecError>,
    {
        let offset = self.buf.len();
        self.buf.resize(offset + len, 0);
        match encode(&mut self.buf[..], offset) {
            Ok(end) => {
                self.buf.truncate(end);
                Ok(self)
            }
            Err(e) => {
                self.buf.truncate(offset);
                Err(ProtocolError::serialization(what, e))
            }
        }
    }

    pub fn int8(&mut self, value: i8) -> Result<&mut Self, ProtocolError> {
        self.write("int8", 1, |b, o| encode_int8(b, o, value))
    }

    pub fn int16(&mut self, value: i16) -> Result<&mut Self, ProtocolError> {
        self.write("int16", 2, |b, o| encode_int16(b, o, value))
    }

    pub fn int32(&mut self, value: i32) -> Result<&mut Self, ProtocolError> {
        self.write("int32", 4, |b, o| encode_int32(b, o, value))
    }

    pub fn boolean(&mut self, value: bool) -> Result<&mut Self, ProtocolError> {
        self.write("boolean", 1, |b, o| encode_bool(b, o, value))
    }

    pub fn unsigned_varint(&mut self, value: u64) -> Result<&mut Self, ProtocolError> {
        self.write("unsigned varint", unsigned_varint_len(value), |b, o| {
            encode_unsigned_varint(b, o, value)
        })
    }

    /// Length prefix of a compact array: `len + 1`.
    pub fn compact_array_len(&mut self, len: usize) -> Result<&mut Self, ProtocolError> {
        self.unsigned_varint(len as u64 + 1)
    }

    pub fn compact_string(&mut self, value: &str) -> Result<&mut Self, ProtocolError> {
        self.write("compact string", compact_string_len(value), |b, o| {
            encode_compact_string(b, o, value)
        })
    }

    pub fn compact_nullable_string(
        &mut self,
        value: Option<&str>,
    ) -> Result<&mut Self, ProtocolError> {
        self.write(
            "compact nullable string",
            compact_nullable_string_len(value),
            |b, o| encode_compact_nullable_string(b, o, value),
        )
    }

    pub fn uuid(&mut self, value: &str) -> Result<&mut Self, ProtocolError> {
        self.write("uuid", UUID_LEN, |b, o| encode_uuid(b, o, value))
    }

    pub fn tagged_fields(&mut self, fields: &TaggedFields) -> Result<&mut Self, ProtocolError> {
        self.write("tagged fields", tagged_fields_len(fields), |b, o| {
            encode_tagged_fields(b, o, fields)
        })
    }

    /// Body bytes written so far. The size placeholder is not counted.
    pub fn len(&self) -> usize {
        self.buf.len() - RESPONSE_SIZE_LEN
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn finish(mut self) -> Result<Bytes, ProtocolError> {
        let size = i32::try_from(self.buf.len() - RESPONSE_SIZE_LEN).map_err(|_| {
            ProtocolError::Serialization(format!(
                "response of {} bytes exceeds the int32 size prefix",
                self.buf.len()
            ))
        })?;
        self.buf[..RESPONSE_SIZE_LEN].copy_from_slice(&size.to_be_bytes());
        Ok(self.buf.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_response_is_zero_size_prefix() {
        let writer = ResponseWriter::new();
        assert!(writer.is_empty());
        assert_eq!(writer.len(), 0);
        assert_eq!(&writer.finish().unwrap()[..], &[0, 0, 0, 0]);
    }

    #[test]
    fn size_prefix_excludes_itself() {
        let mut writer = ResponseWriter::new();
        writer.int32(7).unwrap().int16(0).unwrap().compact_array_len(0).unwrap();
        let bytes = writer.finish().unwrap();
        assert_eq!(
            &bytes[..],
            &[0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x01]
        );
    }

    #[test]
    fn failed_field_leaves_no_partial_bytes() {
        let mut writer = ResponseWriter::new();
        writer.int8(-1).unwrap();
        let err = writer.uuid("not-a-uuid").unwrap_err();
        assert!(matches!(err, ProtocolError::Serialization(_)));
        assert!(err.to_string().contains("uuid"));

        let bad_tags = TaggedFields::from([(u64::MAX, String::new())]);
        assert!(writer.tagged_fields(&bad_tags).is_err());

        assert_eq!(writer.len(), 1);
        assert!(!writer.is_empty());
    }

    #[test]
    fn grows_past_initial_capacity() {
        let mut writer = ResponseWriter::new();
        let long = "x".repeat(1000);
        writer.compact_string(&long).unwrap();
        assert_eq!(writer.len(), 2 + 1000);
        let bytes = writer.finish().unwrap();
        assert_eq!(bytes.len(), 4 + 2 + 1000);
        assert_eq!(&bytes[..4], &1002i32.to_be_bytes());
    }
}
