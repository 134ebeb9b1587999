use bytes::Bytes;
use tracing::{debug, warn};

use crate::api_registry::{is_flexible, ApiVersionEntry};
use crate::codec::{decode_compact_string, decode_tagged_fields, TaggedFields};
use crate::constants::{
    API_KEY_API_VERSIONS, API_VERSIONS_MAX_VERSION, API_VERSIONS_MIN_VERSION,
    API_VERSIONS_THROTTLE_VERSION,
};
use crate::error::{KafkaErrorCode, ProtocolError};
use crate::header::RequestHeader;
use crate::protocol::{KafkaRequest, KafkaResponse, RequestHandler};
use crate::response::ResponseWriter;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiVersionsRequest {
    pub header: RequestHeader,
    pub client_software_name: String,
    pub client_software_version: String,
    pub tagged_fields: TaggedFields,
}

impl KafkaRequest for ApiVersionsRequest {
    fn header(&self) -> &RequestHeader {
        &self.header
    }

    /// The body must match the negotiated framing: flexible versions name the
    /// client software, older versions carry no body at all.
    fn validate(&self) -> Result<(), ProtocolError> {
        let version = self.header.api_version;
        if !(API_VERSIONS_MIN_VERSION..=API_VERSIONS_MAX_VERSION).contains(&version) {
            return Err(ProtocolError::UnsupportedVersion(format!(
                "ApiVersions version {version} is not supported"
            )));
        }

        if self.header.is_flexible() {
            if self.client_software_name.is_empty() {
                return Err(ProtocolError::InvalidRequest(
                    "client software name is required".into(),
                ));
            }
            if self.client_software_version.is_empty() {
                return Err(ProtocolError::InvalidRequest(
                    "client software version is required".into(),
                ));
            }
        } else {
            if !self.client_software_name.is_empty() {
                return Err(ProtocolError::InvalidRequest(
                    "client software name must not be set".into(),
                ));
            }
            if !self.client_software_version.is_empty() {
                return Err(ProtocolError::InvalidRequest(
                    "client software version must not be set".into(),
                ));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersionsResponse {
    pub correlation_id: i32,
    pub error_code: KafkaErrorCode,
    pub api_keys: Vec<ApiVersionEntry>,
    pub throttle_time_ms: i32,
    pub tagged_fields: TaggedFields,
}

impl KafkaResponse for ApiVersionsResponse {
    fn correlation_id(&self) -> i32 {
        self.correlation_id
    }

    // The response header stays v0 (no tagged fields) at every version so
    // that clients can read it before negotiating.
    fn serialize(&self, api_version: i16) -> Result<Bytes, ProtocolError> {
        let flexible = is_flexible(API_KEY_API_VERSIONS, api_version);
        let mut w = ResponseWriter::new();

        w.int32(self.correlation_id)?;
        w.int16(self.error_code.into())?;

        if flexible {
            w.compact_array_len(self.api_keys.len())?;
        } else {
            let count = i32::try_from(self.api_keys.len()).map_err(|_| {
                ProtocolError::Serialization("too many API keys for an int32 count".into())
            })?;
            w.int32(count)?;
        }

        for entry in &self.api_keys {
            w.int16(entry.api_key)?;
            w.int16(entry.min_version)?;
            w.int16(entry.max_version)?;
            if flexible {
                w.tagged_fields(&entry.tagged_fields)?;
            }
        }

        if api_version >= API_VERSIONS_THROTTLE_VERSION {
            w.int32(self.throttle_time_ms)?;
        }

        if flexible {
            w.tagged_fields(&self.tagged_fields)?;
        }

        w.finish()
    }
}

/// Answers ApiVersions with the broker's advertised API list.
#[derive(Debug, Clone)]
pub struct ApiVersionsHandler {
    supported_apis: Vec<ApiVersionEntry>,
}

impl ApiVersionsHandler {
    pub fn new(supported_apis: Vec<ApiVersionEntry>) -> Self {
        ApiVersionsHandler { supported_apis }
    }

    pub fn supported_apis(&self) -> &[ApiVersionEntry] {
        &self.supported_apis
    }
}

impl RequestHandler for ApiVersionsHandler {
    type Request = ApiVersionsRequest;
    type Response = ApiVersionsResponse;

    fn parse_body(
        &self,
        header: RequestHeader,
        buffer: &[u8],
        offset: usize,
    ) -> Result<ApiVersionsRequest, ProtocolError> {
        if !header.is_flexible() {
            return Ok(ApiVersionsRequest {
                header,
                ..Default::default()
            });
        }

        let (client_software_name, offset) = decode_compact_string(buffer, offset)
            .map_err(|e| ProtocolError::invalid_field("client software name", e))?;
        let (client_software_version, offset) = decode_compact_string(buffer, offset)
            .map_err(|e| ProtocolError::invalid_field("client software version", e))?;
        let (tagged_fields, _) = decode_tagged_fields(buffer, offset)
            .map_err(|e| ProtocolError::invalid_field("ApiVersions tagged fields", e))?;

        Ok(ApiVersionsRequest {
            header,
            client_software_name,
            client_software_version,
            tagged_fields,
        })
    }

    /// Validation failures are reported in the response's error code rather
    /// than as an error, so the client still learns the supported versions.
    fn handle(&self, request: ApiVersionsRequest) -> Result<ApiVersionsResponse, ProtocolError> {
        let error_code = match request.validate() {
            Ok(()) => KafkaErrorCode::None,
            Err(e) => {
                warn!(
                    correlation_id = request.header.correlation_id,
                    api_version = request.header.api_version,
                    error = %e,
                    "rejecting ApiVersions request"
                );
                e.error_code()
            }
        };

        debug!(
            correlation_id = request.header.correlation_id,
            client_software_name = %request.client_software_name,
            client_software_version = %request.client_software_version,
            api_count = self.supported_apis.len(),
            "answering ApiVersions"
        );

        Ok(ApiVersionsResponse {
            correlation_id: request.header.correlation_id,
            error_code,
            api_keys: self.supported_apis.clone(),
            throttle_time_ms: 0,
            tagged_fields: TaggedFields::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_registry::ApiKey;

    fn handler() -> ApiVersionsHandler {
        ApiVersionsHandler::new(vec![ApiVersionEntry::new(ApiKey::ApiVersions, 0, 4)])
    }

    fn header(api_version: i16) -> RequestHeader {
        RequestHeader {
            api_key: API_KEY_API_VERSIONS,
            api_version,
            correlation_id: 7,
            ..Default::default()
        }
    }

    fn request(api_version: i16, name: &str, version: &str) -> ApiVersionsRequest {
        ApiVersionsRequest {
            header: header(api_version),
            client_software_name: name.into(),
            client_software_version: version.into(),
            tagged_fields: TaggedFields::new(),
        }
    }

    #[test]
    fn parses_flexible_body() {
        let body = [
            0x04, b'c', b'l', b'i', // client software name
            0x04, b'1', b'.', b'0', // client software version
            0x00, // tagged fields
        ];
        let req = handler().parse_body(header(4), &body, 0).unwrap();
        assert_eq!(req.client_software_name, "cli");
        assert_eq!(req.client_software_version, "1.0");
        assert!(req.tagged_fields.is_empty());
    }

    #[test]
    fn non_flexible_body_is_ignored() {
        let req = handler().parse_body(header(2), &[0x04, b'x'], 0).unwrap();
        assert!(req.client_software_name.is_empty());
        assert!(req.client_software_version.is_empty());
    }

    #[test]
    fn truncated_flexible_body_is_invalid_request() {
        let err = handler()
            .parse_body(header(3), &[0x04, b'c', b'l', b'i'], 0)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidRequest(_)));
        assert!(err.to_string().contains("client software version"));
    }

    #[test]
    fn validate_checks_version_range() {
        assert!(request(4, "cli", "1.0").validate().is_ok());
        assert!(request(0, "", "").validate().is_ok());
        assert!(matches!(
            request(5, "cli", "1.0").validate(),
            Err(ProtocolError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            request(-1, "", "").validate(),
            Err(ProtocolError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn validate_matches_body_to_framing() {
        assert!(matches!(
            request(3, "", "1.0").validate(),
            Err(ProtocolError::InvalidRequest(_))
        ));
        assert!(matches!(
            request(3, "cli", "").validate(),
            Err(ProtocolError::InvalidRequest(_))
        ));
        assert!(matches!(
            request(2, "cli", "1.0").validate(),
            Err(ProtocolError::InvalidRequest(_))
        ));
    }

    #[test]
    fn handle_reports_validation_error_code() {
        let ok = handler().handle(request(4, "cli", "1.0")).unwrap();
        assert_eq!(ok.error_code, KafkaErrorCode::None);
        assert_eq!(ok.api_keys.len(), 1);

        let unsupported = handler().handle(request(5, "cli", "1.0")).unwrap();
        assert_eq!(unsupported.error_code, KafkaErrorCode::UnsupportedVersion);
        assert_eq!(unsupported.api_keys, ok.api_keys);

        let invalid = handler().handle(request(2, "cli", "1.0")).unwrap();
        assert_eq!(i16::from(invalid.error_code), 42);
    }

    fn response(error_code: KafkaErrorCode) -> ApiVersionsResponse {
        ApiVersionsResponse {
            correlation_id: 7,
            error_code,
            api_keys: handler().supported_apis().to_vec(),
            throttle_time_ms: 0,
            tagged_fields: TaggedFields::new(),
        }
    }

    #[test]
    fn serializes_flexible_v4() {
        let bytes = response(KafkaErrorCode::None).serialize(4).unwrap();
        assert_eq!(
            &bytes[..],
            &[
                0x00, 0x00, 0x00, 0x13, // size
                0x00, 0x00, 0x00, 0x07, // correlation id
                0x00, 0x00, // error code
                0x02, // one api key
                0x00, 0x12, 0x00, 0x00, 0x00, 0x04, 0x00, // 18: 0..=4, no tags
                0x00, 0x00, 0x00, 0x00, // throttle time
                0x00, // tagged fields
            ]
        );
    }

    #[test]
    fn serializes_v0_without_throttle_or_tags() {
        let bytes = response(KafkaErrorCode::UnsupportedVersion)
            .serialize(0)
            .unwrap();
        assert_eq!(
            &bytes[..],
            &[
                0x00, 0x00, 0x00, 0x10, // size
                0x00, 0x00, 0x00, 0x07, // correlation id
                0x00, 0x23, // UNSUPPORTED_VERSION
                0x00, 0x00, 0x00, 0x01, // int32 count
                0x00, 0x12, 0x00, 0x00, 0x00, 0x04,
            ]
        );
    }

    #[test]
    fn serializes_v1_with_throttle() {
        let bytes = response(KafkaErrorCode::None).serialize(1).unwrap();
        assert_eq!(bytes.len(), 4 + 16 + 4);
        assert_eq!(&bytes[bytes.len() - 4..], &[0, 0, 0, 0]);
    }
}
