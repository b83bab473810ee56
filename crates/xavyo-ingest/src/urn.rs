//! URN helpers
//!
//! Entity references look like `urn:li:<entityType>:<key>`. Only the entity
//! type is ever extracted here; keys are opaque.

use crate::error::{IngestError, IngestResult};

const URN_PREFIX: &str = "urn:li:";

/// Prefix of a versioned (v2) schema field path.
const V2_FIELD_PATH_PREFIX: &str = "[version=2.0]";

/// Entity type used for datasets, the only entity with editable schema metadata.
pub const DATASET_ENTITY_TYPE: &str = "dataset";

/// Extract the entity type from an entity reference.
///
/// `urn:li:dataset:(urn:li:dataPlatform:hive,Foo,PROD)` -> `dataset`.
pub fn entity_type_of(urn: &str) -> IngestResult<&str> {
    let rest = urn
        .strip_prefix(URN_PREFIX)
        .ok_or_else(|| IngestError::InvalidUrn {
            urn: urn.to_string(),
        })?;

    match rest.split_once(':') {
        Some((entity_type, key)) if !entity_type.is_empty() && !key.is_empty() => {
            Ok(entity_type)
        }
        _ => Err(IngestError::InvalidUrn {
            urn: urn.to_string(),
        }),
    }
}

/// Reduce a field path to its simple (column name) form.
///
/// Versioned paths wrap every component in type annotations, e.g.
/// `[version=2.0].[type=struct].address.[type=string].zip`; the simple form
/// drops the bracketed tokens and yields `address.zip`. A type name containing
/// dots splits across tokens; any token opening or closing a bracket is
/// dropped. Simple paths are returned unchanged.
pub fn simple_field_path(field_path: &str) -> String {
    if !field_path.starts_with(V2_FIELD_PATH_PREFIX) {
        return field_path.to_string();
    }

    field_path
        .split('.')
        .filter(|token| !(token.starts_with('[') || token.ends_with(']')))
        .collect::<Vec<_>>()
        .join(".")
}

/// Corp user reference for a directory identifier.
pub fn corp_user_urn(id: &str) -> String {
    format!("urn:li:corpuser:{id}")
}

/// Corp group reference for a directory group name.
pub fn corp_group_urn(name: &str) -> String {
    format!("urn:li:corpGroup:{name}")
}
