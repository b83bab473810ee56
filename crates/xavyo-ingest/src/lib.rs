//! # Ingestion Framework
//!
//! Core abstractions for metadata ingestion sources feeding the catalog.
//!
//! Sources read an upstream system (a delimited annotation file, a directory
//! server), reconcile what they find with the catalog's current state, and
//! emit change proposals as work units.
//!
//! ## Crate Organization
//!
//! - [`aspects`] - Catalog metadata model (aspects and associations)
//! - [`urn`] - Entity reference helpers
//! - [`workunit`] - Change proposals and work units
//! - [`report`] - Run report
//! - [`traits`] - Catalog collaborator and source traits
//! - [`config`] - Configuration trait and shared settings
//! - [`error`] - Error types

pub mod aspects;
pub mod config;
pub mod error;
pub mod report;
pub mod traits;
pub mod urn;
pub mod workunit;

/// Prelude module for convenient imports.
///
/// ```
/// use xavyo_ingest::prelude::*;
/// ```
pub mod prelude {
    pub use crate::aspects::{
        append_unseen, dedup_by_id, Aspect, Association, AuditStamp, CorpGroupInfo,
        CorpUserInfo, EditableSchemaFieldInfo, EditableSchemaMetadata, GlobalTags,
        GlossaryTermAssociation, GlossaryTerms, Owner, Ownership, OwnershipType, TagAssociation,
    };
    pub use crate::config::{ConnectionSettings, SourceConfig, TlsConfig};
    pub use crate::error::{IngestError, IngestResult};
    pub use crate::report::SourceReport;
    pub use crate::traits::{
        CatalogGraph, PipelineContext, Source, SourceDescriptor, SupportStatus,
    };
    pub use crate::workunit::{ChangeType, MetadataChangeProposal, MetadataWorkUnit};
}

// Re-export async_trait for source and collaborator implementors
pub use async_trait::async_trait;
