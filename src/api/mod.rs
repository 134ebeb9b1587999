//! Request handlers, one module per API.
//!
//! | API | Key | Versions | Handler |
//! |-----|-----|----------|---------|
//! | ApiVersions | 18 | 0-4 | [`ApiVersionsHandler`] |
//! | DescribeTopicPartitions | 75 | 0 | [`DescribeTopicPartitionsHandler`] |

pub mod api_versions;
pub mod describe_topic_partitions;

pub use api_versions::{ApiVersionsHandler, ApiVersionsRequest, ApiVersionsResponse};
pub use describe_topic_partitions::{
    Cursor, DescribeTopicPartitionsHandler, DescribeTopicPartitionsRequest,
    DescribeTopicPartitionsResponse, Partition, ResponseTopic, Topic,
};
