use std::collections::HashMap;

use bytes::Bytes;
use tracing::debug;

use crate::api::{ApiVersionsHandler, DescribeTopicPartitionsHandler};
use crate::api_registry::{ApiKey, ApiVersionEntry};
use crate::config::BrokerConfig;
use crate::error::ProtocolError;
use crate::header::parse_header;
use crate::protocol::ErasedHandler;

/// Routes each request to the handler registered for its API key.
///
/// The handler table is built once and never mutated, so one broker can be
/// shared across connections without locking.
pub struct Broker {
    handlers: HashMap<i16, Box<dyn ErasedHandler>>,
}

impl Broker {
    pub fn new(supported_apis: Vec<ApiVersionEntry>) -> Self {
        let mut handlers: HashMap<i16, Box<dyn ErasedHandler>> = HashMap::new();
        handlers.insert(
            ApiKey::ApiVersions as i16,
            Box::new(ApiVersionsHandler::new(supported_apis)),
        );
        handlers.insert(
            ApiKey::DescribeTopicPartitions as i16,
            Box::new(DescribeTopicPartitionsHandler),
        );
        Broker { handlers }
    }

    pub fn from_config(config: &BrokerConfig) -> Self {
        Self::new(config.supported_apis.clone())
    }

    pub fn supports(&self, api_key: i16) -> bool {
        self.handlers.contains_key(&api_key)
    }

    /// Turns one request frame (size prefix included) into one response
    /// frame. Any failure ends processing of this request; nothing is retried.
    pub fn process_request(&self, buffer: &[u8]) -> Result<Bytes, ProtocolError> {
        let (header, offset) = parse_header(buffer, 0)?;

        let handler = self
            .handlers
            .get(&header.api_key)
            .ok_or(ProtocolError::UnknownApiKey(header.api_key))?;

        debug!(
            api = ApiKey::try_from(header.api_key).map_or("unknown", ApiKey::name),
            api_key = header.api_key,
            api_version = header.api_version,
            correlation_id = header.correlation_id,
            client_id = header.client_id.as_deref().unwrap_or(""),
            "dispatching request"
        );

        let api_version = header.api_version;
        let response = handler.process(header, buffer, offset)?;
        response.serialize(api_version)
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::from_config(&BrokerConfig::default())
    }
}

impl std::fmt::Debug for Broker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.handlers.keys().copied().collect();
        keys.sort_unstable();
        f.debug_struct("Broker").field("handlers", &keys).finish()
    }
}
