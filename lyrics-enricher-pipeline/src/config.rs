//! Kafka connection configuration.
//!
//! Connection parameters come from two sources: explicit settings
//! (brokers, group id) and an optional client-properties file in the
//! `key=value` format that managed Kafka providers hand out. Entries from
//! the file are applied on top of the explicit settings, so credentials
//! like `sasl.username` can live in the file while the consumption
//! invariants stay fixed in code.

use std::fs;
use std::path::{Path, PathBuf};

use rdkafka::config::ClientConfig;
use tracing::debug;

use crate::errors::PipelineError;

/// Kafka connection settings shared by the consumer and the sink.
#[derive(Debug, Clone)]
pub struct KafkaSettings {
    /// Broker addresses, comma-separated.
    pub brokers: String,
    /// Consumer group id.
    pub group_id: String,
    /// Optional client-properties file with additional parameters.
    pub properties_file: Option<PathBuf>,
}

impl KafkaSettings {
    pub fn new(brokers: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            group_id: group_id.into(),
            properties_file: None,
        }
    }

    /// Merge parameters from a client-properties file.
    pub fn with_properties_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.properties_file = Some(path.into());
        self
    }

    /// Build the consumer configuration.
    ///
    /// Offsets are committed manually after dispatch, so auto-commit is
    /// always off regardless of what the properties file says.
    pub fn consumer_config(&self) -> Result<ClientConfig, PipelineError> {
        let mut config = self.base_config()?;
        config
            .set("group.id", &self.group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "6000");
        Ok(config)
    }

    /// Build the producer configuration.
    pub fn producer_config(&self) -> Result<ClientConfig, PipelineError> {
        let mut config = self.base_config()?;
        config
            .set("compression.type", "zstd")
            .set("message.timeout.ms", "5000");
        Ok(config)
    }

    fn base_config(&self) -> Result<ClientConfig, PipelineError> {
        let mut config = ClientConfig::new();
        config.set("bootstrap.servers", &self.brokers);

        if let Some(path) = &self.properties_file {
            for (key, value) in read_client_properties(path)? {
                config.set(key, value);
            }
        }

        Ok(config)
    }
}

/// Read a Kafka client-properties file.
///
/// Lines are `key=value`; blank lines and `#` comments are ignored.
/// Values may contain `=`, so only the first one splits.
pub fn read_client_properties(path: &Path) -> Result<Vec<(String, String)>, PipelineError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        PipelineError::config(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let mut properties = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (key, value) = line.split_once('=').ok_or_else(|| {
            PipelineError::config(format!("Malformed property line: {}", line))
        })?;

        properties.push((key.trim().to_string(), value.trim().to_string()));
    }

    debug!(
        path = %path.display(),
        count = properties.len(),
        "Loaded client properties"
    );

    Ok(properties)
}
