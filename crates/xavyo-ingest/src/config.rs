//! Ingestion framework configuration types
//!
//! Base trait for source configs and connection settings shared by networked
//! sources.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::IngestResult;

/// Trait for source-specific configuration.
///
/// Configs deserialize from the `config` block of a YAML recipe and are
/// validated once, before the source is constructed.
pub trait SourceConfig: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Validate the configuration.
    fn validate(&self) -> IngestResult<()>;

    /// Create a redacted version of this config (for logging/display).
    fn redacted(&self) -> Self;

    /// Parse and validate a config from YAML.
    fn from_yaml(yaml: &str) -> IngestResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }
}

/// Timeouts for networked sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Connection timeout in seconds.
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,

    /// Per-operation timeout in seconds.
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_secs: u64,
}

fn default_connection_timeout() -> u64 {
    30
}

fn default_operation_timeout() -> u64 {
    60
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            connection_timeout_secs: default_connection_timeout(),
            operation_timeout_secs: default_operation_timeout(),
        }
    }
}

impl ConnectionSettings {
    /// Get connection timeout as Duration.
    pub fn connection_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.connection_timeout_secs)
    }

    /// Get operation timeout as Duration.
    pub fn operation_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.operation_timeout_secs)
    }
}

/// TLS configuration.
///
/// Certificate verification is relaxed by default: directory servers behind
/// internal CAs are the common case for ingestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TlsConfig {
    /// Whether to verify the server certificate.
    #[serde(default)]
    pub verify_certificate: bool,
}

impl TlsConfig {
    /// Log a warning when certificate verification is disabled.
    pub fn validate_security(&self) {
        if !self.verify_certificate {
            tracing::warn!(
                target: "security",
                "TLS certificate verification is disabled for this source"
            );
        }
    }

    /// Require certificate verification.
    #[must_use]
    pub fn verified() -> Self {
        Self {
            verify_certificate: true,
        }
    }
}
