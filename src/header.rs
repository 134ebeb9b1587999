use crate::api_registry::is_flexible;
use crate::codec::{
    decode_int16, decode_int32, decode_nullable_string, decode_tagged_fields, TaggedFields,
};
use crate::error::ProtocolError;

/// The common request header. `tagged_fields` is only populated for flexible
/// `(api_key, api_version)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHeader {
    pub message_size: i32,
    pub api_key: i16,
    pub api_version: i16,
    pub correlation_id: i32,
    pub client_id: Option<String>,
    pub tagged_fields: TaggedFields,
}

impl RequestHeader {
    pub fn is_flexible(&self) -> bool {
        is_flexible(self.api_key, self.api_version)
    }
}

/// Decodes the header starting at `offset`, returning it with the offset of
/// the first body byte.
pub fn parse_header(buffer: &[u8], offset: usize) -> Result<(RequestHeader, usize), ProtocolError> {
    let (message_size, offset) = decode_int32(buffer, offset)
        .map_err(|e| ProtocolError::invalid_field("message size from request header", e))?;
    let (api_key, offset) = decode_int16(buffer, offset)
        .map_err(|e| ProtocolError::invalid_field("API key from request header", e))?;
    let (api_version, offset) = decode_int16(buffer, offset)
        .map_err(|e| ProtocolError::invalid_field("API version from request header", e))?;
    let (correlation_id, offset) = decode_int32(buffer, offset)
        .map_err(|e| ProtocolError::invalid_field("correlation ID from request header", e))?;
    let (client_id, offset) = decode_nullable_string(buffer, offset)
        .map_err(|e| ProtocolError::invalid_field("client ID from request header", e))?;

    let (tagged_fields, offset) = if is_flexible(api_key, api_version) {
        decode_tagged_fields(buffer, offset)
            .map_err(|e| ProtocolError::invalid_field("tagged fields from request header", e))?
    } else {
        (TaggedFields::new(), offset)
    };

    Ok((
        RequestHeader {
            message_size,
            api_key,
            api_version,
            correlation_id,
            client_id,
            tagged_fields,
        },
        offset,
    ))
}
