// https://kafka.apache.org/protocol.html#protocol_api_keys
pub const API_KEY_API_VERSIONS: i16 = 18;
pub const API_KEY_DESCRIBE_TOPIC_PARTITIONS: i16 = 75;

pub const API_VERSIONS_MIN_VERSION: i16 = 0;
pub const API_VERSIONS_MAX_VERSION: i16 = 4;
/// throttle_time_ms first appears in the ApiVersions v1 response.
pub const API_VERSIONS_THROTTLE_VERSION: i16 = 1;

pub const DESCRIBE_TOPIC_PARTITIONS_MIN_VERSION: i16 = 0;
pub const DESCRIBE_TOPIC_PARTITIONS_MAX_VERSION: i16 = 0;

/// Size of the response length prefix. The prefix does not count itself.
pub const RESPONSE_SIZE_LEN: usize = 4;

/// Longest LEB128 encoding of a u64.
pub const MAX_VARINT_LEN64: usize = 10;

pub const UUID_LEN: usize = 16;
pub const NIL_UUID: &str = "00000000-0000-0000-0000-000000000000";

/// Single-byte markers used for the DescribeTopicPartitions cursor.
pub const CURSOR_ABSENT: i8 = -1;
pub const CURSOR_PRESENT: i8 = 1;

pub const DEFAULT_LISTEN_ADDRESS: &str = "127.0.0.1:9092";
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 1024 * 1024;
