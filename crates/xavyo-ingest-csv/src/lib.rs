//! # CSV Enrichment Source
//!
//! Applies glossary terms, tags and owners from a delimited annotation file
//! to catalog entities.
//!
//! Entity-level rows are reconciled immediately against the catalog's current
//! state. Field-level rows are buffered and written once per dataset after the
//! whole file has been read.
//!
//! ## Example
//!
//! ```ignore
//! use xavyo_ingest::prelude::*;
//! use xavyo_ingest_csv::{CsvEnricherConfig, CsvEnricherSource};
//!
//! let config = CsvEnricherConfig::new("annotations.csv")
//!     .with_array_delimiter("|")
//!     .with_overwrite(false);
//!
//! let ctx = PipelineContext::new("run-1").with_graph(graph);
//! let mut source = CsvEnricherSource::new(config, &ctx)?;
//! let workunits = source.get_workunits().await?;
//! ```

pub mod accumulator;
pub mod config;
pub mod extract;
pub mod parser;
pub mod reconcile;
pub mod source;

// Re-exports
pub use accumulator::{SubResourceAccumulator, SubResourceRow};
pub use config::CsvEnricherConfig;
pub use extract::{AnnotationRecord, AssociationExtractor};
pub use reconcile::{AssociationAspect, Reconciler};
pub use source::{CsvEnricherReport, CsvEnricherSource};
