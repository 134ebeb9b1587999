use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::api_registry::{ApiKey, ApiVersionEntry};
use crate::constants::{
    API_VERSIONS_MAX_VERSION, API_VERSIONS_MIN_VERSION, DEFAULT_LISTEN_ADDRESS,
    DEFAULT_MAX_MESSAGE_SIZE, DESCRIBE_TOPIC_PARTITIONS_MAX_VERSION,
    DESCRIBE_TOPIC_PARTITIONS_MIN_VERSION,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub listen_address: String,
    /// Largest request frame accepted, excluding the 4-byte size prefix.
    pub max_message_size: usize,
    /// Rows advertised in ApiVersions responses.
    pub supported_apis: Vec<ApiVersionEntry>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        BrokerConfig {
            listen_address: DEFAULT_LISTEN_ADDRESS.to_string(),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            supported_apis: vec![
                ApiVersionEntry::new(
                    ApiKey::ApiVersions,
                    API_VERSIONS_MIN_VERSION,
                    API_VERSIONS_MAX_VERSION,
                ),
                ApiVersionEntry::new(
                    ApiKey::DescribeTopicPartitions,
                    DESCRIBE_TOPIC_PARTITIONS_MIN_VERSION,
                    DESCRIBE_TOPIC_PARTITIONS_MAX_VERSION,
                ),
            ],
        }
    }
}

impl BrokerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: BrokerConfig =
            serde_json::from_str(json).context("failed to parse broker config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_message_size == 0 {
            bail!("max_message_size must be greater than zero");
        }
        if self.supported_apis.is_empty() {
            bail!("supported_apis must advertise at least one API");
        }
        let mut seen = HashSet::new();
        for entry in &self.supported_apis {
            if entry.min_version > entry.max_version {
                bail!(
                    "API key {}: min_version {} is greater than max_version {}",
                    entry.api_key,
                    entry.min_version,
                    entry.max_version
                );
            }
            if !seen.insert(entry.api_key) {
                bail!("API key {} is listed more than once", entry.api_key);
            }
            let Some(served) = served_versions(entry.api_key) else {
                bail!("API key {} has no handler in this broker", entry.api_key);
            };
            if !served.contains(entry.min_version) || !served.contains(entry.max_version) {
                bail!(
                    "API key {}: versions {}..={} fall outside the handled range {}..={}",
                    entry.api_key,
                    entry.min_version,
                    entry.max_version,
                    served.min_version,
                    served.max_version
                );
            }
        }
        if !seen.contains(&(ApiKey::ApiVersions as i16)) {
            bail!("supported_apis must advertise ApiVersions (key 18)");
        }
        Ok(())
    }
}

/// Version range the broker's handler accepts for `api_key`, if it has one.
fn served_versions(api_key: i16) -> Option<ApiVersionEntry> {
    match ApiKey::try_from(api_key).ok()? {
        ApiKey::ApiVersions => Some(ApiVersionEntry::new(
            ApiKey::ApiVersions,
            API_VERSIONS_MIN_VERSION,
            API_VERSIONS_MAX_VERSION,
        )),
        ApiKey::DescribeTopicPartitions => Some(ApiVersionEntry::new(
            ApiKey::DescribeTopicPartitions,
            DESCRIBE_TOPIC_PARTITIONS_MIN_VERSION,
            DESCRIBE_TOPIC_PARTITIONS_MAX_VERSION,
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_advertise_both_apis() {
        let config = BrokerConfig::default();
        assert_eq!(config.listen_address, "127.0.0.1:9092");
        assert!(config.validate().is_ok());
        let keys: Vec<i16> = config.supported_apis.iter().map(|e| e.api_key).collect();
        assert_eq!(keys, vec![18, 75]);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = BrokerConfig::from_json(r#"{"listen_address": "0.0.0.0:19092"}"#).unwrap();
        assert_eq!(config.listen_address, "0.0.0.0:19092");
        assert_eq!(config.max_message_size, DEFAULT_MAX_MESSAGE_SIZE);
        assert_eq!(config.supported_apis.len(), 2);
    }

    #[test]
    fn api_rows_accept_tagged_fields() {
        let config = BrokerConfig::from_json(
            r#"{"supported_apis": [
                {"api_key": 18, "min_version": 0, "max_version": 4, "tagged_fields": {"0": "x"}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(config.supported_apis[0].tagged_fields.get(&0).unwrap(), "x");
    }

    #[test]
    fn rejects_inverted_version_range() {
        let err = BrokerConfig::from_json(
            r#"{"supported_apis": [{"api_key": 18, "min_version": 4, "max_version": 0}]}"#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("min_version 4"));
    }

    #[test]
    fn rejects_empty_api_list_and_zero_size() {
        assert!(BrokerConfig::from_json(r#"{"supported_apis": []}"#).is_err());
        assert!(BrokerConfig::from_json(r#"{"max_message_size": 0}"#).is_err());
    }

    #[test]
    fn rejects_apis_without_a_handler() {
        let err = BrokerConfig::from_json(
            r#"{"supported_apis": [
                {"api_key": 18, "min_version": 0, "max_version": 4},
                {"api_key": 0, "min_version": 0, "max_version": 9}
            ]}"#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("API key 0 has no handler"));
    }

    #[test]
    fn rejects_versions_beyond_the_handler() {
        let err = BrokerConfig::from_json(
            r#"{"supported_apis": [
                {"api_key": 18, "min_version": 0, "max_version": 4},
                {"api_key": 75, "min_version": 0, "max_version": 5}
            ]}"#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("outside the handled range 0..=0"));

        let err = BrokerConfig::from_json(
            r#"{"supported_apis": [{"api_key": 18, "min_version": 0, "max_version": 5}]}"#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("API key 18"));
    }

    #[test]
    fn requires_api_versions_and_unique_keys() {
        let err = BrokerConfig::from_json(
            r#"{"supported_apis": [{"api_key": 75, "min_version": 0, "max_version": 0}]}"#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("must advertise ApiVersions"));

        let err = BrokerConfig::from_json(
            r#"{"supported_apis": [
                {"api_key": 18, "min_version": 0, "max_version": 4},
                {"api_key": 18, "min_version": 3, "max_version": 4}
            ]}"#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("more than once"));
    }

    #[test]
    fn narrower_advertised_range_is_accepted() {
        let config = BrokerConfig::from_json(
            r#"{"supported_apis": [{"api_key": 18, "min_version": 3, "max_version": 4}]}"#,
        )
        .unwrap();
        assert_eq!(config.supported_apis.len(), 1);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_message_size": 2048}}"#).unwrap();
        let config = BrokerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_message_size, 2048);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = BrokerConfig::from_file("/nonexistent/rafka.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/rafka.json"));
    }
}
