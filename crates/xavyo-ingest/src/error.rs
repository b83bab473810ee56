//! Ingestion framework error types
//!
//! Errors are split into fatal (configuration) and per-entry/per-loop failures.
//! Dropped entities and skipped writes are not errors and never surface here.

use thiserror::Error;

/// Error that can occur while running an ingestion source.
#[derive(Debug, Error)]
pub enum IngestError {
    // Configuration errors (fatal at construction)
    /// Source configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Failed to establish a session with the upstream system.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Bind credentials were rejected.
    #[error("authentication failed: invalid credentials")]
    AuthenticationFailed,

    // Protocol errors (terminate the affected loop)
    /// Search or paging failure reported by the directory.
    #[error("protocol failure: {message}")]
    Protocol {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Data errors
    /// An optional attribute was present but could not be parsed.
    #[error("failed to parse attribute '{attribute}' value '{value}': {message}")]
    FieldParse {
        attribute: String,
        value: String,
        message: String,
    },

    /// Entity reference is not a well-formed URN.
    #[error("invalid urn: {urn}")]
    InvalidUrn { urn: String },

    // Collaborator errors
    /// Catalog read-back failed.
    #[error("catalog error: {message}")]
    Catalog {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O error reading the input.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed delimited input.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization error.
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

impl IngestError {
    /// Whether this error must abort the whole run.
    ///
    /// Configuration and session-establishment failures are fatal; everything
    /// else is scoped to an entry or to the loop that produced it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            IngestError::InvalidConfiguration { .. }
                | IngestError::ConnectionFailed { .. }
                | IngestError::AuthenticationFailed
        )
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            IngestError::InvalidConfiguration { .. } => "INVALID_CONFIG",
            IngestError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            IngestError::AuthenticationFailed => "AUTH_FAILED",
            IngestError::Protocol { .. } => "PROTOCOL_FAILURE",
            IngestError::FieldParse { .. } => "FIELD_PARSE_FAILED",
            IngestError::InvalidUrn { .. } => "INVALID_URN",
            IngestError::Catalog { .. } => "CATALOG_ERROR",
            IngestError::Io(_) => "IO_ERROR",
            IngestError::Csv(_) => "CSV_ERROR",
            IngestError::Serialization { .. } => "SERIALIZATION_ERROR",
        }
    }

    // Convenience constructors

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        IngestError::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create a connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        IngestError::ConnectionFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection failed error with source.
    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        IngestError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a protocol failure.
    pub fn protocol(message: impl Into<String>) -> Self {
        IngestError::Protocol {
            message: message.into(),
            source: None,
        }
    }

    /// Create a protocol failure with source.
    pub fn protocol_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        IngestError::Protocol {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a catalog error.
    pub fn catalog(message: impl Into<String>) -> Self {
        IngestError::Catalog {
            message: message.into(),
            source: None,
        }
    }

    /// Create a catalog error with source.
    pub fn catalog_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        IngestError::Catalog {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a field parse error.
    pub fn field_parse(
        attribute: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        IngestError::FieldParse {
            attribute: attribute.into(),
            value: value.into(),
            message: message.into(),
        }
    }
}

impl From<serde_yaml::Error> for IngestError {
    fn from(err: serde_yaml::Error) -> Self {
        IngestError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        IngestError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;
