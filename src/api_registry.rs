//! API keys, their names, and the version at which each switches to
//! flexible (compact + tagged field) framing.

use serde::{Deserialize, Serialize};

use crate::codec::TaggedFields;
use crate::error::ProtocolError;

macro_rules! api_keys {
    ($( $variant:ident = $key:literal, $name:literal, flexible_from: $flex:literal; )*) => {
        // https://kafka.apache.org/protocol.html#protocol_api_keys
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i16)]
        pub enum ApiKey {
            $( $variant = $key, )*
        }

        impl ApiKey {
            pub const ALL: &'static [ApiKey] = &[ $( ApiKey::$variant, )* ];

            pub fn name(self) -> &'static str {
                match self {
                    $( ApiKey::$variant => $name, )*
                }
            }

            /// First version of this API that uses flexible framing.
            pub fn flexible_from(self) -> i16 {
                match self {
                    $( ApiKey::$variant => $flex, )*
                }
            }
        }

        impl TryFrom<i16> for ApiKey {
            type Error = ProtocolError;

            fn try_from(value: i16) -> Result<Self, Self::Error> {
                match value {
                    $( $key => Ok(ApiKey::$variant), )*
                    other => Err(ProtocolError::UnknownApiKey(other)),
                }
            }
        }
    };
}

api_keys! {
    Produce = 0, "Produce", flexible_from: 9;
    Fetch = 1, "Fetch", flexible_from: 12;
    ListOffsets = 2, "ListOffsets", flexible_from: 6;
    Metadata = 3, "Metadata", flexible_from: 9;
    LeaderAndIsr = 4, "LeaderAndIsr", flexible_from: 4;
    StopReplica = 5, "StopReplica", flexible_from: 2;
    UpdateMetadata = 6, "UpdateMetadata", flexible_from: 6;
    ControlledShutdown = 7, "ControlledShutdown", flexible_from: 3;
    OffsetCommit = 8, "OffsetCommit", flexible_from: 8;
    OffsetFetch = 9, "OffsetFetch", flexible_from: 6;
    FindCoordinator = 10, "FindCoordinator", flexible_from: 3;
    JoinGroup = 11, "JoinGroup", flexible_from: 6;
    Heartbeat = 12, "Heartbeat", flexible_from: 4;
    LeaveGroup = 13, "LeaveGroup", flexible_from: 4;
    SyncGroup = 14, "SyncGroup", flexible_from: 4;
    DescribeGroups = 15, "DescribeGroups", flexible_from: 5;
    ListGroups = 16, "ListGroups", flexible_from: 3;
    SaslHandshake = 17, "SaslHandshake", flexible_from: 2;
    ApiVersions = 18, "ApiVersions", flexible_from: 3;
    CreateTopics = 19, "CreateTopics", flexible_from: 5;
    DeleteTopics = 20, "DeleteTopics", flexible_from: 4;
    DeleteRecords = 21, "DeleteRecords", flexible_from: 2;
    InitProducerId = 22, "InitProducerId", flexible_from: 2;
    OffsetForLeaderEpoch = 23, "OffsetForLeaderEpoch", flexible_from: 4;
    AddPartitionsToTxn = 24, "AddPartitionsToTxn", flexible_from: 3;
    AddOffsetsToTxn = 25, "AddOffsetsToTxn", flexible_from: 3;
    EndTxn = 26, "EndTxn", flexible_from: 3;
    WriteTxnMarkers = 27, "WriteTxnMarkers", flexible_from: 1;
    TxnOffsetCommit = 28, "TxnOffsetCommit", flexible_from: 3;
    DescribeAcls = 29, "DescribeAcls", flexible_from: 2;
    CreateAcls = 30, "CreateAcls", flexible_from: 2;
    DeleteAcls = 31, "DeleteAcls", flexible_from: 2;
    DescribeConfigs = 32, "DescribeConfigs", flexible_from: 4;
    AlterConfigs = 33, "AlterConfigs", flexible_from: 2;
    AlterReplicaLogDirs = 34, "AlterReplicaLogDirs", flexible_from: 2;
    DescribeLogDirs = 35, "DescribeLogDirs", flexible_from: 2;
    SaslAuthenticate = 36, "SaslAuthenticate", flexible_from: 2;
    CreatePartitions = 37, "CreatePartitions", flexible_from: 2;
    CreateDelegationToken = 38, "CreateDelegationToken", flexible_from: 2;
    RenewDelegationToken = 39, "RenewDelegationToken", flexible_from: 2;
    ExpireDelegationToken = 40, "ExpireDelegationToken", flexible_from: 2;
    DescribeDelegationToken = 41, "DescribeDelegationToken", flexible_from: 2;
    DeleteGroups = 42, "DeleteGroups", flexible_from: 2;
    ElectLeaders = 43, "ElectLeaders", flexible_from: 2;
    IncrementalAlterConfigs = 44, "IncrementalAlterConfigs", flexible_from: 1;
    AlterPartitionReassignments = 45, "AlterPartitionReassignments", flexible_from: 0;
    ListPartitionReassignments = 46, "ListPartitionReassignments", flexible_from: 0;
    OffsetDelete = 47, "OffsetDelete", flexible_from: 0;
    DescribeClientQuotas = 48, "DescribeClientQuotas", flexible_from: 1;
    AlterClientQuotas = 49, "AlterClientQuotas", flexible_from: 1;
    DescribeUserScramCredentials = 50, "DescribeUserScramCredentials", flexible_from: 0;
    AlterUserScramCredentials = 51, "AlterUserScramCredentials", flexible_from: 0;
    Vote = 52, "Vote", flexible_from: 0;
    BeginQuorumEpoch = 53, "BeginQuorumEpoch", flexible_from: 0;
    EndQuorumEpoch = 54, "EndQuorumEpoch", flexible_from: 0;
    DescribeQuorum = 55, "DescribeQuorum", flexible_from: 0;
    AlterPartition = 56, "AlterPartition", flexible_from: 0;
    UpdateFeatures = 57, "UpdateFeatures", flexible_from: 0;
    Envelope = 58, "Envelope", flexible_from: 0;
    FetchSnapshot = 59, "FetchSnapshot", flexible_from: 0;
    DescribeCluster = 60, "DescribeCluster", flexible_from: 0;
    DescribeProducers = 61, "DescribeProducers", flexible_from: 0;
    BrokerRegistration = 62, "BrokerRegistration", flexible_from: 0;
    BrokerHeartbeat = 63, "BrokerHeartbeat", flexible_from: 0;
    UnregisterBroker = 64, "UnregisterBroker", flexible_from: 0;
    DescribeTransactions = 65, "DescribeTransactions", flexible_from: 0;
    ListTransactions = 66, "ListTransactions", flexible_from: 0;
    AllocateProducerIds = 67, "AllocateProducerIds", flexible_from: 0;
    ConsumerGroupHeartbeat = 68, "ConsumerGroupHeartbeat", flexible_from: 0;
    ConsumerGroupDescribe = 69, "ConsumerGroupDescribe", flexible_from: 0;
    ControllerRegistration = 70, "ControllerRegistration", flexible_from: 0;
    GetTelemetrySubscriptions = 71, "GetTelemetrySubscriptions", flexible_from: 0;
    PushTelemetry = 72, "PushTelemetry", flexible_from: 0;
    AssignReplicasToDirs = 73, "AssignReplicasToDirs", flexible_from: 0;
    ListClientMetricsResources = 74, "ListClientMetricsResources", flexible_from: 0;
    DescribeTopicPartitions = 75, "DescribeTopicPartitions", flexible_from: 0;
    ShareGroupHeartbeat = 76, "ShareGroupHeartbeat", flexible_from: 0;
    ShareGroupDescribe = 77, "ShareGroupDescribe", flexible_from: 0;
    ShareFetch = 78, "ShareFetch", flexible_from: 0;
    ShareAcknowledge = 79, "ShareAcknowledge", flexible_from: 0;
    AddRaftVoter = 80, "AddRaftVoter", flexible_from: 0;
    RemoveRaftVoter = 81, "RemoveRaftVoter", flexible_from: 0;
    UpdateRaftVoter = 82, "UpdateRaftVoter", flexible_from: 0;
}

/// Flexible threshold for a raw API key, `None` for keys outside the table.
pub fn flexible_from_version(api_key: i16) -> Option<i16> {
    ApiKey::try_from(api_key).ok().map(ApiKey::flexible_from)
}

/// Whether `(api_key, api_version)` uses compact framing and tagged fields.
/// Unknown keys are never flexible.
pub fn is_flexible(api_key: i16, api_version: i16) -> bool {
    flexible_from_version(api_key).is_some_and(|from| api_version >= from)
}

/// One row of the ApiVersions response: an API the broker advertises and
/// the range of versions it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiVersionEntry {
    pub api_key: i16,
    pub min_version: i16,
    pub max_version: i16,
    #[serde(default)]
    pub tagged_fields: TaggedFields,
}

impl ApiVersionEntry {
    pub fn new(api_key: ApiKey, min_version: i16, max_version: i16) -> Self {
        ApiVersionEntry {
            api_key: api_key as i16,
            min_version,
            max_version,
            tagged_fields: TaggedFields::new(),
        }
    }

    pub fn contains(&self, version: i16) -> bool {
        self.min_version <= version && version <= self.max_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_versions_is_flexible_from_v3() {
        assert!(!is_flexible(18, 2));
        assert!(is_flexible(18, 3));
        assert!(is_flexible(18, 4));
    }

    #[test]
    fn describe_topic_partitions_is_always_flexible() {
        assert!(is_flexible(75, 0));
    }

    #[test]
    fn unknown_keys_are_never_flexible() {
        assert_eq!(flexible_from_version(1000), None);
        assert!(!is_flexible(1000, i16::MAX));
        assert!(!is_flexible(-1, 0));
    }

    #[test]
    fn try_from_round_trips_every_key() {
        for key in ApiKey::ALL {
            assert_eq!(ApiKey::try_from(*key as i16), Ok(*key));
        }
        assert_eq!(
            ApiKey::try_from(83),
            Err(ProtocolError::UnknownApiKey(83))
        );
    }

    #[test]
    fn names() {
        assert_eq!(ApiKey::ApiVersions.name(), "ApiVersions");
        assert_eq!(ApiKey::DescribeTopicPartitions.name(), "DescribeTopicPartitions");
    }

    #[test]
    fn entry_contains_inclusive_range() {
        let entry = ApiVersionEntry::new(ApiKey::ApiVersions, 0, 4);
        assert!(entry.contains(0));
        assert!(entry.contains(4));
        assert!(!entry.contains(5));
        assert!(!entry.contains(-1));
    }
}
