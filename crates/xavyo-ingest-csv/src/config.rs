//! Tabular enrichment configuration

use serde::{Deserialize, Serialize};
use xavyo_ingest::config::SourceConfig;
use xavyo_ingest::error::{IngestError, IngestResult};

/// Configuration for the tabular enrichment source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvEnricherConfig {
    /// Path to the annotation file.
    pub filename: String,

    /// Replace existing aspect state instead of appending to it.
    #[serde(default)]
    pub should_overwrite: bool,

    /// Field delimiter of the file.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Delimiter between values inside array cells (tags, terms, owners).
    #[serde(default = "default_array_delimiter")]
    pub array_delimiter: String,
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_array_delimiter() -> String {
    ",".to_string()
}

impl CsvEnricherConfig {
    /// Create a config for `filename` with default delimiters, in append mode.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            should_overwrite: false,
            delimiter: default_delimiter(),
            array_delimiter: default_array_delimiter(),
        }
    }

    /// Replace existing aspect state instead of appending.
    #[must_use]
    pub fn with_overwrite(mut self, should_overwrite: bool) -> Self {
        self.should_overwrite = should_overwrite;
        self
    }

    /// Set the field delimiter.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Set the array delimiter.
    pub fn with_array_delimiter(mut self, array_delimiter: impl Into<String>) -> Self {
        self.array_delimiter = array_delimiter.into();
        self
    }

    /// Field delimiter as the byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> IngestResult<u8> {
        match self.delimiter.as_bytes() {
            [b] => Ok(*b),
            _ => Err(IngestError::invalid_config(format!(
                "delimiter must be a single byte, got '{}'",
                self.delimiter
            ))),
        }
    }
}

impl SourceConfig for CsvEnricherConfig {
    fn validate(&self) -> IngestResult<()> {
        if self.filename.is_empty() {
            return Err(IngestError::invalid_config("filename is required"));
        }

        self.delimiter_byte()?;

        if self.array_delimiter.is_empty() {
            return Err(IngestError::invalid_config("array_delimiter must not be empty"));
        }

        Ok(())
    }

    fn redacted(&self) -> Self {
        self.clone()
    }
}
