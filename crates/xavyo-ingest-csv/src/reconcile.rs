//! Entity-level reconciliation.
//!
//! One read-modify-write step per aspect kind. The same algorithm serves
//! glossary terms, tags and ownership; [`AssociationAspect`] is the seam that
//! lets it stay generic.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use xavyo_ingest::aspects::{
    append_unseen, dedup_by_id, Aspect, Association, GlobalTags, GlossaryTermAssociation,
    GlossaryTerms, Owner, Ownership, TagAssociation,
};
use xavyo_ingest::error::IngestResult;
use xavyo_ingest::traits::CatalogGraph;
use xavyo_ingest::workunit::{MetadataChangeProposal, MetadataWorkUnit};

/// An aspect whose payload is an ordered list of associations.
#[async_trait]
pub trait AssociationAspect: Sized + Send {
    /// Association type held by the aspect.
    type Item: Association + Send + Sync;

    /// Fresh aspect state, stamped with the ingestion actor and current time.
    fn from_associations(items: Vec<Self::Item>) -> Self;

    /// Mutable access to the association list.
    fn associations_mut(&mut self) -> &mut Vec<Self::Item>;

    /// Wrap into the aspect payload.
    fn into_aspect(self) -> Aspect;

    /// Current state of this aspect for `entity_urn`.
    async fn fetch(graph: &dyn CatalogGraph, entity_urn: &str) -> IngestResult<Option<Self>>;
}

#[async_trait]
impl AssociationAspect for GlossaryTerms {
    type Item = GlossaryTermAssociation;

    fn from_associations(items: Vec<Self::Item>) -> Self {
        GlossaryTerms::new(items)
    }

    fn associations_mut(&mut self) -> &mut Vec<Self::Item> {
        &mut self.terms
    }

    fn into_aspect(self) -> Aspect {
        Aspect::GlossaryTerms(self)
    }

    async fn fetch(graph: &dyn CatalogGraph, entity_urn: &str) -> IngestResult<Option<Self>> {
        graph.get_glossary_terms(entity_urn).await
    }
}

#[async_trait]
impl AssociationAspect for GlobalTags {
    type Item = TagAssociation;

    fn from_associations(items: Vec<Self::Item>) -> Self {
        GlobalTags::new(items)
    }

    fn associations_mut(&mut self) -> &mut Vec<Self::Item> {
        &mut self.tags
    }

    fn into_aspect(self) -> Aspect {
        Aspect::GlobalTags(self)
    }

    async fn fetch(graph: &dyn CatalogGraph, entity_urn: &str) -> IngestResult<Option<Self>> {
        graph.get_tags(entity_urn).await
    }
}

#[async_trait]
impl AssociationAspect for Ownership {
    type Item = Owner;

    fn from_associations(items: Vec<Self::Item>) -> Self {
        Ownership::new(items)
    }

    fn associations_mut(&mut self) -> &mut Vec<Self::Item> {
        &mut self.owners
    }

    fn into_aspect(self) -> Aspect {
        Aspect::Ownership(self)
    }

    async fn fetch(graph: &dyn CatalogGraph, entity_urn: &str) -> IngestResult<Option<Self>> {
        graph.get_ownership(entity_urn).await
    }
}

/// Merges new associations with the catalog's current state under the
/// configured overwrite policy.
#[derive(Clone)]
pub struct Reconciler {
    should_overwrite: bool,
    graph: Option<Arc<dyn CatalogGraph>>,
}

impl Reconciler {
    pub fn new(should_overwrite: bool, graph: Option<Arc<dyn CatalogGraph>>) -> Self {
        Self {
            should_overwrite,
            graph,
        }
    }

    /// Whether prior state is replaced rather than merged.
    pub fn should_overwrite(&self) -> bool {
        self.should_overwrite
    }

    /// The catalog connection, if any.
    pub fn graph(&self) -> Option<&dyn CatalogGraph> {
        self.graph.as_deref()
    }

    /// Reconcile `new` associations into aspect `T` of `entity_urn`.
    ///
    /// Returns `None` when there is nothing to write: the new list is empty,
    /// append mode has no catalog connection, or every new identifier is
    /// already present.
    pub async fn reconcile<T: AssociationAspect>(
        &self,
        entity_urn: &str,
        entity_type: &str,
        new: Vec<T::Item>,
    ) -> IngestResult<Option<MetadataWorkUnit>> {
        if new.is_empty() {
            return Ok(None);
        }

        let current = if self.should_overwrite {
            None
        } else {
            let Some(graph) = self.graph() else {
                debug!(entity_urn = %entity_urn, "No catalog connection, skipping append");
                return Ok(None);
            };
            T::fetch(graph, entity_urn).await?
        };

        let state = match current {
            None => T::from_associations(dedup_by_id(new)),
            Some(mut state) => {
                let added = append_unseen(state.associations_mut(), &new);
                if added == 0 {
                    debug!(entity_urn = %entity_urn, "No new associations, skipping write");
                    return Ok(None);
                }
                state
            }
        };

        let mcp = MetadataChangeProposal::upsert(entity_type, entity_urn, state.into_aspect());
        Ok(Some(MetadataWorkUnit::from_mcp(mcp)))
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("should_overwrite", &self.should_overwrite)
            .field("graph", &self.graph.as_ref().map(|_| "<connected>"))
            .finish()
    }
}
