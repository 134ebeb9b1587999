//! Wire codec and request dispatch for a Kafka-compatible broker.
//!
//! A transport hands [`Broker::process_request`] one size-prefixed request
//! frame and writes back the size-prefixed response it returns.

pub mod api;
pub mod api_registry;
pub mod broker;
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod header;
pub mod kafka_server;
pub mod message;
pub mod protocol;
pub mod response;
pub mod telemetry;

pub use api_registry::{is_flexible, ApiKey, ApiVersionEntry};
pub use broker::Broker;
pub use codec::{TagId, TaggedFields};
pub use config::BrokerConfig;
pub use error::{CodecError, KafkaErrorCode, ProtocolError, ServerError};
pub use header::{parse_header, RequestHeader};
pub use kafka_server::KafkaServer;
pub use protocol::{KafkaRequest, KafkaResponse, RequestHandler};
pub use response::ResponseWriter;
