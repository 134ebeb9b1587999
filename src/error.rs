use thiserror::Error;

use crate::codec::TagId;

// https://kafka.apache.org/protocol.html#protocol_error_codes
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(i16)]
pub enum KafkaErrorCode {
    UnknownServerError = -1,
    None = 0,
    UnknownTopicOrPartition = 3,
    UnsupportedVersion = 35,
    InvalidRequest = 42,
}

impl KafkaErrorCode {
    pub fn name(self) -> &'static str {
        match self {
            KafkaErrorCode::UnknownServerError => "UNKNOWN_SERVER_ERROR",
            KafkaErrorCode::None => "NONE",
            KafkaErrorCode::UnknownTopicOrPartition => "UNKNOWN_TOPIC_OR_PARTITION",
            KafkaErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            KafkaErrorCode::InvalidRequest => "INVALID_REQUEST",
        }
    }
}

impl From<KafkaErrorCode> for i16 {
    fn from(error: KafkaErrorCode) -> i16 {
        error as i16
    }
}

/// Failures of the primitive decoders and encoders.
///
/// These never leave the crate's parsing layers as-is: header and body
/// parsers wrap them into a [`ProtocolError`] naming the field that failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("buffer too small: need {needed} bytes, {available} available")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("offset {offset} is outside of a {len} byte buffer")]
    InvalidOffset { offset: usize, len: usize },

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("tag id {0} does not fit in 32 bits")]
    InvalidTagId(TagId),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("UNSUPPORTED_VERSION: {0}")]
    UnsupportedVersion(String),

    #[error("INVALID_REQUEST: {0}")]
    InvalidRequest(String),

    #[error("INVALID_REQUEST: unsupported API key: {0}")]
    UnknownApiKey(i16),

    #[error("UNKNOWN_SERVER_ERROR: {0}")]
    Serialization(String),
}

impl ProtocolError {
    /// Wraps a primitive failure while parsing `field`.
    pub fn invalid_field(field: &str, source: CodecError) -> Self {
        ProtocolError::InvalidRequest(format!("failed to parse {field}: {source}"))
    }

    /// Wraps a primitive failure while writing `field` into a response.
    pub fn serialization(field: &str, source: CodecError) -> Self {
        ProtocolError::Serialization(format!("failed to serialize {field}: {source}"))
    }

    pub fn error_code(&self) -> KafkaErrorCode {
        match self {
            ProtocolError::UnsupportedVersion(_) => KafkaErrorCode::UnsupportedVersion,
            ProtocolError::InvalidRequest(_) | ProtocolError::UnknownApiKey(_) => {
                KafkaErrorCode::InvalidRequest
            }
            ProtocolError::Serialization(_) => KafkaErrorCode::UnknownServerError,
        }
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid message size: {size} (max: {max})")]
    InvalidMessageSize { size: i32, max: usize },
}
