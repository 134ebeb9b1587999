use bytes::Bytes;
use tracing::debug;

use crate::codec::{
    decode_compact_string, decode_int32, decode_int8, decode_tagged_fields,
    decode_unsigned_varint, TaggedFields,
};
use crate::constants::{
    CURSOR_ABSENT, CURSOR_PRESENT, DESCRIBE_TOPIC_PARTITIONS_MAX_VERSION,
    DESCRIBE_TOPIC_PARTITIONS_MIN_VERSION, NIL_UUID,
};
use crate::error::{KafkaErrorCode, ProtocolError};
use crate::header::RequestHeader;
use crate::protocol::{KafkaRequest, KafkaResponse, RequestHandler};
use crate::response::ResponseWriter;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topic {
    pub name: String,
    pub tagged_fields: TaggedFields,
}

/// Pagination token: where to resume listing topics and partitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    pub topic_name: String,
    pub partition_index: i32,
    pub tagged_fields: TaggedFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescribeTopicPartitionsRequest {
    pub header: RequestHeader,
    pub topics: Vec<Topic>,
    pub response_partition_limit: i32,
    pub cursor: Option<Cursor>,
    pub tagged_fields: TaggedFields,
}

impl KafkaRequest for DescribeTopicPartitionsRequest {
    fn header(&self) -> &RequestHeader {
        &self.header
    }

    fn validate(&self) -> Result<(), ProtocolError> {
        let version = self.header.api_version;
        if !(DESCRIBE_TOPIC_PARTITIONS_MIN_VERSION..=DESCRIBE_TOPIC_PARTITIONS_MAX_VERSION)
            .contains(&version)
        {
            return Err(ProtocolError::UnsupportedVersion(format!(
                "DescribeTopicPartitions version {version} is not supported"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub error_code: KafkaErrorCode,
    pub partition_index: i32,
    pub leader_id: i32,
    pub leader_epoch: i32,
    pub replica_nodes: i32,
    pub isr_nodes: i32,
    pub eligible_leader_replicas: i32,
    pub last_known_elr: i32,
    pub offline_replicas: i32,
    pub tagged_fields: TaggedFields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseTopic {
    pub error_code: KafkaErrorCode,
    pub name: Option<String>,
    /// Hex UUID, dashes optional.
    pub topic_id: String,
    pub is_internal: bool,
    pub partitions: Vec<Partition>,
    pub topic_authorized_operations: i32,
    pub tagged_fields: TaggedFields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeTopicPartitionsResponse {
    pub correlation_id: i32,
    pub header_tagged_fields: TaggedFields,
    pub throttle_time_ms: i32,
    pub topics: Vec<ResponseTopic>,
    pub next_cursor: Option<Cursor>,
    pub tagged_fields: TaggedFields,
}

fn write_cursor(w: &mut ResponseWriter, cursor: Option<&Cursor>) -> Result<(), ProtocolError> {
    match cursor {
        None => {
            w.int8(CURSOR_ABSENT)?;
        }
        Some(cursor) => {
            w.int8(CURSOR_PRESENT)?;
            w.compact_string(&cursor.topic_name)?;
            w.int32(cursor.partition_index)?;
            w.tagged_fields(&cursor.tagged_fields)?;
        }
    }
    Ok(())
}

fn write_partition(w: &mut ResponseWriter, partition: &Partition) -> Result<(), ProtocolError> {
    w.int16(partition.error_code.into())?;
    w.int32(partition.partition_index)?;
    w.int32(partition.leader_id)?;
    w.int32(partition.leader_epoch)?;
    w.int32(partition.replica_nodes)?;
    w.int32(partition.isr_nodes)?;
    w.int32(partition.eligible_leader_replicas)?;
    w.int32(partition.last_known_elr)?;
    w.int32(partition.offline_replicas)?;
    w.tagged_fields(&partition.tagged_fields)?;
    Ok(())
}

fn write_topic(w: &mut ResponseWriter, topic: &ResponseTopic) -> Result<(), ProtocolError> {
    w.int16(topic.error_code.into())?;
    w.compact_nullable_string(topic.name.as_deref())?;
    w.uuid(&topic.topic_id)?;
    w.boolean(topic.is_internal)?;
    w.compact_array_len(topic.partitions.len())?;
    for partition in &topic.partitions {
        write_partition(w, partition)?;
    }
    w.int32(topic.topic_authorized_operations)?;
    w.tagged_fields(&topic.tagged_fields)?;
    Ok(())
}

impl KafkaResponse for DescribeTopicPartitionsResponse {
    fn correlation_id(&self) -> i32 {
        self.correlation_id
    }

    fn serialize(&self, _api_version: i16) -> Result<Bytes, ProtocolError> {
        let mut w = ResponseWriter::new();

        w.int32(self.correlation_id)?;
        w.tagged_fields(&self.header_tagged_fields)?;
        w.int32(self.throttle_time_ms)?;

        w.compact_array_len(self.topics.len())?;
        for topic in &self.topics {
            write_topic(&mut w, topic)?;
        }

        write_cursor(&mut w, self.next_cursor.as_ref())?;
        w.tagged_fields(&self.tagged_fields)?;

        w.finish()
    }
}

fn parse_cursor(buffer: &[u8], offset: usize) -> Result<(Option<Cursor>, usize), ProtocolError> {
    let (presence, offset) = decode_int8(buffer, offset)
        .map_err(|e| ProtocolError::invalid_field("cursor presence", e))?;

    match presence {
        CURSOR_ABSENT => Ok((None, offset)),
        CURSOR_PRESENT => {
            let (topic_name, offset) = decode_compact_string(buffer, offset)
                .map_err(|e| ProtocolError::invalid_field("cursor topic name", e))?;
            let (partition_index, offset) = decode_int32(buffer, offset)
                .map_err(|e| ProtocolError::invalid_field("cursor partition index", e))?;
            let (tagged_fields, offset) = decode_tagged_fields(buffer, offset)
                .map_err(|e| ProtocolError::invalid_field("cursor tagged fields", e))?;
            Ok((
                Some(Cursor {
                    topic_name,
                    partition_index,
                    tagged_fields,
                }),
                offset,
            ))
        }
        other => Err(ProtocolError::InvalidRequest(format!(
            "invalid cursor presence value: expected 0xFF (null) or 0x01 (non-null), got 0x{:02X}",
            other as u8
        ))),
    }
}

/// Describes topics and their partitions.
///
/// There is no metadata store behind this handler yet: the first requested
/// topic is always reported as `UNKNOWN_TOPIC_OR_PARTITION` with the nil
/// topic id and no partitions.
#[derive(Debug, Clone, Default)]
pub struct DescribeTopicPartitionsHandler;

impl RequestHandler for DescribeTopicPartitionsHandler {
    type Request = DescribeTopicPartitionsRequest;
    type Response = DescribeTopicPartitionsResponse;

    fn parse_body(
        &self,
        header: RequestHeader,
        buffer: &[u8],
        offset: usize,
    ) -> Result<DescribeTopicPartitionsRequest, ProtocolError> {
        let (array_len, mut offset) = decode_unsigned_varint(buffer, offset)
            .map_err(|e| ProtocolError::invalid_field("topics length", e))?;
        let count = array_len
            .checked_sub(1)
            .ok_or_else(|| ProtocolError::InvalidRequest("topics array must not be null".into()))?;

        // grows as entries decode, the count itself is peer-controlled
        let mut topics = Vec::new();
        for i in 0..count {
            let (name, next) = decode_compact_string(buffer, offset)
                .map_err(|e| ProtocolError::invalid_field(&format!("topic name at index {i}"), e))?;
            let (tagged_fields, next) = decode_tagged_fields(buffer, next).map_err(|e| {
                ProtocolError::invalid_field(&format!("topic tagged fields at index {i}"), e)
            })?;
            topics.push(Topic {
                name,
                tagged_fields,
            });
            offset = next;
        }

        let (response_partition_limit, offset) = decode_int32(buffer, offset)
            .map_err(|e| ProtocolError::invalid_field("response partition limit", e))?;
        let (cursor, offset) = parse_cursor(buffer, offset)?;
        let (tagged_fields, _) = decode_tagged_fields(buffer, offset)
            .map_err(|e| ProtocolError::invalid_field("DescribeTopicPartitions tagged fields", e))?;

        Ok(DescribeTopicPartitionsRequest {
            header,
            topics,
            response_partition_limit,
            cursor,
            tagged_fields,
        })
    }

    fn handle(
        &self,
        request: DescribeTopicPartitionsRequest,
    ) -> Result<DescribeTopicPartitionsResponse, ProtocolError> {
        request.validate()?;

        let correlation_id = request.header.correlation_id;
        debug!(
            correlation_id,
            topic_count = request.topics.len(),
            response_partition_limit = request.response_partition_limit,
            has_cursor = request.cursor.is_some(),
            "answering DescribeTopicPartitions"
        );

        let topics = request
            .topics
            .into_iter()
            .take(1)
            .map(|topic| ResponseTopic {
                error_code: KafkaErrorCode::UnknownTopicOrPartition,
                name: Some(topic.name),
                topic_id: NIL_UUID.to_string(),
                is_internal: false,
                partitions: Vec::new(),
                topic_authorized_operations: 0,
                tagged_fields: topic.tagged_fields,
            })
            .collect();

        Ok(DescribeTopicPartitionsResponse {
            correlation_id,
            header_tagged_fields: TaggedFields::new(),
            throttle_time_ms: 0,
            topics,
            next_cursor: None,
            tagged_fields: TaggedFields::new(),
        })
    }
}
