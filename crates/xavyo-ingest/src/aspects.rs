//! Catalog metadata model
//!
//! Aspects are the independently-versioned facets of an entity written by
//! ingestion sources. Field names serialize in camelCase to match the
//! catalog's wire representation.

use serde::{Deserialize, Serialize};

/// Actor stamped on every aspect created by ingestion.
pub const INGESTION_ACTOR: &str = "urn:li:corpuser:ingestion";

/// Who changed an aspect, and when (epoch millis).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    pub time: i64,
    pub actor: String,
}

impl AuditStamp {
    /// Stamp with the ingestion actor at the current time.
    #[must_use]
    pub fn now() -> Self {
        Self {
            time: chrono::Utc::now().timestamp_millis(),
            actor: INGESTION_ACTOR.to_string(),
        }
    }
}

/// A typed reference whose identity is a single string identifier.
///
/// Merge logic deduplicates associations by this identifier only.
pub trait Association: Clone {
    /// The identifier used for deduplication.
    fn id(&self) -> &str;
}

/// Reference to a glossary term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryTermAssociation {
    pub urn: String,
}

impl GlossaryTermAssociation {
    pub fn new(urn: impl Into<String>) -> Self {
        Self { urn: urn.into() }
    }
}

impl Association for GlossaryTermAssociation {
    fn id(&self) -> &str {
        &self.urn
    }
}

/// Reference to a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagAssociation {
    pub tag: String,
}

impl TagAssociation {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl Association for TagAssociation {
    fn id(&self) -> &str {
        &self.tag
    }
}

/// Kind of ownership an owner holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnershipType {
    /// No specific ownership kind.
    #[default]
    None,
    TechnicalOwner,
    BusinessOwner,
    DataSteward,
    Dataowner,
}

/// Reference to an owning user or group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub owner: String,
    #[serde(rename = "type")]
    pub owner_type: OwnershipType,
}

impl Owner {
    /// Owner with the default (`NONE`) ownership type.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            owner_type: OwnershipType::None,
        }
    }
}

impl Association for Owner {
    fn id(&self) -> &str {
        &self.owner
    }
}

/// Glossary terms attached to an entity or field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryTerms {
    pub terms: Vec<GlossaryTermAssociation>,
    pub audit_stamp: AuditStamp,
}

impl GlossaryTerms {
    pub fn new(terms: Vec<GlossaryTermAssociation>) -> Self {
        Self {
            terms,
            audit_stamp: AuditStamp::now(),
        }
    }
}

/// Tags attached to an entity or field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalTags {
    pub tags: Vec<TagAssociation>,
}

impl GlobalTags {
    pub fn new(tags: Vec<TagAssociation>) -> Self {
        Self { tags }
    }
}

/// Owners of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ownership {
    pub owners: Vec<Owner>,
    pub last_modified: AuditStamp,
}

impl Ownership {
    pub fn new(owners: Vec<Owner>) -> Self {
        Self {
            owners,
            last_modified: AuditStamp::now(),
        }
    }
}

/// User-editable annotations for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditableSchemaFieldInfo {
    pub field_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glossary_terms: Option<GlossaryTerms>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_tags: Option<GlobalTags>,
}

impl EditableSchemaFieldInfo {
    pub fn new(field_path: impl Into<String>) -> Self {
        Self {
            field_path: field_path.into(),
            description: None,
            glossary_terms: None,
            global_tags: None,
        }
    }
}

/// User-editable annotations for all columns of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditableSchemaMetadata {
    pub created: AuditStamp,
    pub editable_schema_field_info: Vec<EditableSchemaFieldInfo>,
}

impl EditableSchemaMetadata {
    /// Empty field-info list stamped with a fresh creation time.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            created: AuditStamp::now(),
            editable_schema_field_info: Vec::new(),
        }
    }
}

/// Directory-sourced user profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpUserInfo {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_urn: Option<String>,
}

/// Directory-sourced group profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpGroupInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub admins: Vec<String>,
    pub members: Vec<String>,
    pub groups: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Any aspect payload a work unit can carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Aspect {
    GlossaryTerms(GlossaryTerms),
    GlobalTags(GlobalTags),
    Ownership(Ownership),
    EditableSchemaMetadata(EditableSchemaMetadata),
    CorpUserInfo(CorpUserInfo),
    CorpGroupInfo(CorpGroupInfo),
}

impl Aspect {
    /// Catalog name of this aspect.
    pub fn aspect_name(&self) -> &'static str {
        match self {
            Aspect::GlossaryTerms(_) => GLOSSARY_TERMS_ASPECT_NAME,
            Aspect::GlobalTags(_) => TAGS_ASPECT_NAME,
            Aspect::Ownership(_) => OWNERSHIP_ASPECT_NAME,
            Aspect::EditableSchemaMetadata(_) => SCHEMA_ASPECT_NAME,
            Aspect::CorpUserInfo(_) => CORP_USER_INFO_ASPECT_NAME,
            Aspect::CorpGroupInfo(_) => CORP_GROUP_INFO_ASPECT_NAME,
        }
    }
}

pub const GLOSSARY_TERMS_ASPECT_NAME: &str = "glossaryTerms";
pub const TAGS_ASPECT_NAME: &str = "globalTags";
pub const OWNERSHIP_ASPECT_NAME: &str = "ownership";
pub const SCHEMA_ASPECT_NAME: &str = "editableSchemaMetadata";
pub const CORP_USER_INFO_ASPECT_NAME: &str = "corpUserInfo";
pub const CORP_GROUP_INFO_ASPECT_NAME: &str = "corpGroupInfo";

/// Drop associations whose identifier already appeared earlier in the list.
pub fn dedup_by_id<A: Association>(items: Vec<A>) -> Vec<A> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|a| seen.insert(a.id().to_string()))
        .collect()
}

/// Append `incoming` associations whose identifiers are not already in
/// `existing`, preserving existing order. Returns the number appended.
///
/// Identifiers repeated within `incoming` are appended once.
pub fn append_unseen<A: Association>(existing: &mut Vec<A>, incoming: &[A]) -> usize {
    let mut present: std::collections::HashSet<String> =
        existing.iter().map(|a| a.id().to_string()).collect();
    let before = existing.len();
    for item in incoming {
        if present.insert(item.id().to_string()) {
            existing.push(item.clone());
        }
    }
    existing.len() - before
}
