//! Work units
//!
//! A work unit is one change proposal destined for the catalog, tagged with a
//! deterministic identifier so that re-runs address the same slot.

use serde::{Deserialize, Serialize};

use crate::aspects::Aspect;

/// Kind of change a proposal applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    /// Insert or replace the aspect.
    #[default]
    Upsert,
}

/// A single aspect write for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataChangeProposal {
    pub entity_type: String,
    pub entity_urn: String,
    pub change_type: ChangeType,
    pub aspect_name: String,
    pub aspect: Aspect,
}

impl MetadataChangeProposal {
    /// Upsert `aspect` onto `entity_urn`.
    pub fn upsert(
        entity_type: impl Into<String>,
        entity_urn: impl Into<String>,
        aspect: Aspect,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_urn: entity_urn.into(),
            change_type: ChangeType::Upsert,
            aspect_name: aspect.aspect_name().to_string(),
            aspect,
        }
    }
}

/// A change proposal plus its deterministic identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataWorkUnit {
    pub id: String,
    pub mcp: MetadataChangeProposal,
}

impl MetadataWorkUnit {
    /// Work unit keyed `{entityUrn}-{aspectName}`.
    pub fn from_mcp(mcp: MetadataChangeProposal) -> Self {
        Self {
            id: format!("{}-{}", mcp.entity_urn, mcp.aspect_name),
            mcp,
        }
    }

    /// Work unit keyed by the upstream record identity (e.g. a directory DN).
    pub fn for_snapshot(id: impl Into<String>, mcp: MetadataChangeProposal) -> Self {
        Self { id: id.into(), mcp }
    }

    /// The aspect payload.
    pub fn aspect(&self) -> &Aspect {
        &self.mcp.aspect
    }
}
