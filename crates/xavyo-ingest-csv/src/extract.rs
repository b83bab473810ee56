//! Association extraction.
//!
//! Turns the array-valued cells of a row into typed associations. Identifiers
//! are not validated; malformed URNs flow downstream unchanged.

use xavyo_ingest::aspects::{GlossaryTermAssociation, Owner, TagAssociation};

use crate::parser::{
    CsvRow, GLOSSARY_TERMS_COLUMN, OWNERS_COLUMN, RESOURCE_COLUMN, SUBRESOURCE_COLUMN,
    TAGS_COLUMN,
};

/// Everything one input row says about one entity (or one of its fields).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    /// Entity reference.
    pub resource: String,
    /// Field path; `None` for resource rows.
    pub subresource: Option<String>,
    pub term_associations: Vec<GlossaryTermAssociation>,
    pub tag_associations: Vec<TagAssociation>,
    /// Always empty for subresource rows.
    pub owners: Vec<Owner>,
}

impl AnnotationRecord {
    /// Whether this record targets the whole entity.
    pub fn is_resource_row(&self) -> bool {
        self.subresource.is_none()
    }
}

/// Splits array cells on a configured delimiter.
#[derive(Debug, Clone)]
pub struct AssociationExtractor {
    array_delimiter: String,
}

impl AssociationExtractor {
    pub fn new(array_delimiter: impl Into<String>) -> Self {
        Self {
            array_delimiter: array_delimiter.into(),
        }
    }

    /// Build a record from a parsed row, or `None` when the row has no resource.
    pub fn record(&self, row: &CsvRow) -> Option<AnnotationRecord> {
        let resource = row.get(RESOURCE_COLUMN);
        if resource.is_empty() {
            return None;
        }

        let subresource = Some(row.get(SUBRESOURCE_COLUMN))
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let is_resource_row = subresource.is_none();

        Some(AnnotationRecord {
            resource: resource.to_string(),
            subresource,
            term_associations: self.glossary_terms(row),
            tag_associations: self.tags(row),
            owners: self.owners(row, is_resource_row),
        })
    }

    /// Term associations from the `glossary_terms` cell.
    pub fn glossary_terms(&self, row: &CsvRow) -> Vec<GlossaryTermAssociation> {
        self.split(row.get(GLOSSARY_TERMS_COLUMN))
            .map(GlossaryTermAssociation::new)
            .collect()
    }

    /// Tag associations from the `tags` cell.
    pub fn tags(&self, row: &CsvRow) -> Vec<TagAssociation> {
        self.split(row.get(TAGS_COLUMN))
            .map(TagAssociation::new)
            .collect()
    }

    /// Owners from the `owners` cell; subresource rows never contribute owners.
    pub fn owners(&self, row: &CsvRow, is_resource_row: bool) -> Vec<Owner> {
        if !is_resource_row {
            return Vec::new();
        }
        self.split(row.get(OWNERS_COLUMN)).map(Owner::new).collect()
    }

    fn split<'a>(&'a self, raw: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let raw = if raw.is_empty() {
            raw
        } else {
            sanitize_array_string(raw)
        };
        raw.split(self.array_delimiter.as_str())
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

/// Strip one optional leading `[` and one optional trailing `]`.
pub fn sanitize_array_string(raw: &str) -> &str {
    let raw = raw.strip_prefix('[').unwrap_or(raw);
    raw.strip_suffix(']').unwrap_or(raw)
}
