//! Ingestion framework traits
//!
//! Collaborator seams: the catalog graph a source reads prior state from, and
//! the source contract the pipeline pulls work units through.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::aspects::{EditableSchemaMetadata, GlobalTags, GlossaryTerms, Ownership};
use crate::error::IngestResult;
use crate::report::SourceReport;
use crate::workunit::MetadataWorkUnit;

/// Read access to the catalog's current aspect state.
///
/// Every method returns `Ok(None)` when the entity or the aspect is unknown.
#[async_trait]
pub trait CatalogGraph: Send + Sync {
    /// Current glossary terms of an entity.
    async fn get_glossary_terms(&self, entity_urn: &str) -> IngestResult<Option<GlossaryTerms>>;

    /// Current tags of an entity.
    async fn get_tags(&self, entity_urn: &str) -> IngestResult<Option<GlobalTags>>;

    /// Current ownership of an entity.
    async fn get_ownership(&self, entity_urn: &str) -> IngestResult<Option<Ownership>>;

    /// Current editable schema metadata of a dataset.
    async fn get_editable_schema_metadata(
        &self,
        entity_urn: &str,
    ) -> IngestResult<Option<EditableSchemaMetadata>>;
}

/// Shared run context handed to every source.
#[derive(Clone, Default)]
pub struct PipelineContext {
    /// Identifier of this ingestion run.
    pub run_id: String,
    /// Live catalog connection, when one is available.
    pub graph: Option<Arc<dyn CatalogGraph>>,
}

impl PipelineContext {
    /// Context without a catalog connection.
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            graph: None,
        }
    }

    /// Attach a catalog connection.
    #[must_use]
    pub fn with_graph(mut self, graph: Arc<dyn CatalogGraph>) -> Self {
        self.graph = Some(graph);
        self
    }
}

impl std::fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext")
            .field("run_id", &self.run_id)
            .field("graph", &self.graph.as_ref().map(|_| "<connected>"))
            .finish()
    }
}

/// Maturity of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupportStatus {
    Certified,
    Incubating,
    Testing,
}

/// Static description of a source, attached at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceDescriptor {
    /// Platform display name.
    pub platform: &'static str,
    /// Maturity.
    pub support_status: SupportStatus,
}

/// A producer of work units.
///
/// The pipeline drives the source; no source starts concurrent work of its own.
#[async_trait]
pub trait Source: Send {
    /// Registration metadata.
    fn descriptor(&self) -> SourceDescriptor;

    /// Run the source to completion and return every work unit it produced,
    /// in emission order.
    async fn get_workunits(&mut self) -> IngestResult<Vec<MetadataWorkUnit>>;

    /// Shared report state.
    fn report(&self) -> &SourceReport;

    /// Release upstream resources.
    async fn close(&mut self) -> IngestResult<()> {
        Ok(())
    }
}
