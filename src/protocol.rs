use bytes::Bytes;

use crate::error::ProtocolError;
use crate::header::RequestHeader;

pub trait KafkaRequest {
    fn header(&self) -> &RequestHeader;

    fn validate(&self) -> Result<(), ProtocolError>;

    fn api_key(&self) -> i16 {
        self.header().api_key
    }

    fn api_version(&self) -> i16 {
        self.header().api_version
    }
}

pub trait KafkaResponse: Send {
    fn correlation_id(&self) -> i32;

    /// Encodes the size-prefixed response for `api_version`.
    fn serialize(&self, api_version: i16) -> Result<Bytes, ProtocolError>;
}

/// One API's request parsing and handling.
///
/// The associated types pair each request with its response so a handler
/// never has to inspect what kind of request it was given.
pub trait RequestHandler: Send + Sync {
    type Request: KafkaRequest;
    type Response: KafkaResponse + 'static;

    /// Decodes the request body that starts at `offset`.
    fn parse_body(
        &self,
        header: RequestHeader,
        buffer: &[u8],
        offset: usize,
    ) -> Result<Self::Request, ProtocolError>;

    fn handle(&self, request: Self::Request) -> Result<Self::Response, ProtocolError>;
}

/// Object-safe view of a [`RequestHandler`], so handlers for different APIs
/// can share one registry.
pub(crate) trait ErasedHandler: Send + Sync {
    fn process(
        &self,
        header: RequestHeader,
        buffer: &[u8],
        offset: usize,
    ) -> Result<Box<dyn KafkaResponse>, ProtocolError>;
}

impl<H: RequestHandler> ErasedHandler for H {
    fn process(
        &self,
        header: RequestHeader,
        buffer: &[u8],
        offset: usize,
    ) -> Result<Box<dyn KafkaResponse>, ProtocolError> {
        let request = self.parse_body(header, buffer, offset)?;
        let response = self.handle(request)?;
        Ok(Box::new(response))
    }
}
