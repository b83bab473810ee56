//! Subresource accumulation and flush.
//!
//! Field-level rows are buffered per entity during the main pass and folded
//! into one editable schema metadata write per entity at end of input.

use std::collections::HashMap;

use tracing::debug;
use xavyo_ingest::aspects::{
    append_unseen, dedup_by_id, Aspect, EditableSchemaFieldInfo, EditableSchemaMetadata,
    GlobalTags, GlossaryTermAssociation, GlossaryTerms, TagAssociation,
};
use xavyo_ingest::error::IngestResult;
use xavyo_ingest::traits::CatalogGraph;
use xavyo_ingest::urn::{simple_field_path, DATASET_ENTITY_TYPE};
use xavyo_ingest::workunit::{MetadataChangeProposal, MetadataWorkUnit};

/// A field-level annotation row, immutable once buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubResourceRow {
    pub entity_urn: String,
    pub field_path: String,
    pub term_associations: Vec<GlossaryTermAssociation>,
    pub tag_associations: Vec<TagAssociation>,
}

impl SubResourceRow {
    fn is_empty(&self) -> bool {
        self.term_associations.is_empty() && self.tag_associations.is_empty()
    }
}

/// Rows grouped by entity, in first-seen entity order and input row order.
#[derive(Debug, Default)]
pub struct SubResourceAccumulator {
    entities: Vec<(String, Vec<SubResourceRow>)>,
    index: HashMap<String, usize>,
}

impl SubResourceAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer a row under its entity. Rows are never deduplicated here.
    pub fn push(&mut self, row: SubResourceRow) {
        match self.index.get(&row.entity_urn) {
            Some(&i) => self.entities[i].1.push(row),
            None => {
                self.index.insert(row.entity_urn.clone(), self.entities.len());
                self.entities.push((row.entity_urn.clone(), vec![row]));
            }
        }
    }

    /// Number of entities with buffered rows.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Drain the buffer, emitting at most one schema write per entity.
    pub async fn flush(
        self,
        should_overwrite: bool,
        graph: Option<&dyn CatalogGraph>,
    ) -> IngestResult<Vec<MetadataWorkUnit>> {
        let mut workunits = Vec::new();

        for (entity_urn, rows) in self.entities {
            let current = match graph {
                Some(graph) if !should_overwrite => {
                    graph.get_editable_schema_metadata(&entity_urn).await?
                }
                _ => None,
            };

            let (mut state, mut dirty) = match current {
                Some(state) => (state, false),
                None => (EditableSchemaMetadata::empty(), true),
            };

            for row in &rows {
                dirty |= merge_row(&mut state, row, should_overwrite);
            }

            if !dirty {
                debug!(entity_urn = %entity_urn, "Schema metadata unchanged, skipping write");
                continue;
            }

            let mcp = MetadataChangeProposal::upsert(
                DATASET_ENTITY_TYPE,
                entity_urn,
                Aspect::EditableSchemaMetadata(state),
            );
            workunits.push(MetadataWorkUnit::from_mcp(mcp));
        }

        Ok(workunits)
    }
}

/// Fold one row into the schema state. Returns whether anything changed.
///
/// Every entry whose simple path equals the row's path is merged into, not
/// just the first.
pub fn merge_row(
    state: &mut EditableSchemaMetadata,
    row: &SubResourceRow,
    should_overwrite: bool,
) -> bool {
    if row.is_empty() {
        return false;
    }

    let mut dirty = false;
    let mut matched = false;

    for info in state
        .editable_schema_field_info
        .iter_mut()
        .filter(|info| simple_field_path(&info.field_path) == row.field_path)
    {
        matched = true;

        if !row.term_associations.is_empty() {
            match info.glossary_terms.as_mut() {
                Some(terms) if !should_overwrite => {
                    dirty |= append_unseen(&mut terms.terms, &row.term_associations) > 0;
                }
                _ => {
                    let terms = dedup_by_id(row.term_associations.clone());
                    info.glossary_terms = Some(GlossaryTerms::new(terms));
                    dirty = true;
                }
            }
        }

        if !row.tag_associations.is_empty() {
            match info.global_tags.as_mut() {
                Some(tags) if !should_overwrite => {
                    dirty |= append_unseen(&mut tags.tags, &row.tag_associations) > 0;
                }
                _ => {
                    let tags = dedup_by_id(row.tag_associations.clone());
                    info.global_tags = Some(GlobalTags::new(tags));
                    dirty = true;
                }
            }
        }
    }

    if !matched {
        state.editable_schema_field_info.push(field_info_for(row));
        dirty = true;
    }

    dirty
}

fn field_info_for(row: &SubResourceRow) -> EditableSchemaFieldInfo {
    let mut info = EditableSchemaFieldInfo::new(row.field_path.clone());
    if !row.term_associations.is_empty() {
        let terms = dedup_by_id(row.term_associations.clone());
        info.glossary_terms = Some(GlossaryTerms::new(terms));
    }
    if !row.tag_associations.is_empty() {
        let tags = dedup_by_id(row.tag_associations.clone());
        info.global_tags = Some(GlobalTags::new(tags));
    }
    info
}
