//! User and group entity construction from directory entries.

use tracing::debug;
use xavyo_ingest::aspects::{Aspect, CorpGroupInfo, CorpUserInfo};
use xavyo_ingest::error::{IngestError, IngestResult};
use xavyo_ingest::report::SourceReport;
use xavyo_ingest::urn::{corp_group_urn, corp_user_urn};
use xavyo_ingest::workunit::{MetadataChangeProposal, MetadataWorkUnit};

use crate::client::DirectoryEntry;
use crate::config::{GroupAttrsMap, UserAttrsMap};

/// Report context for warnings not tied to one entry.
pub const GENERAL_CONTEXT: &str = "<general>";

/// Entity type of user snapshots.
pub const CORP_USER_ENTITY_TYPE: &str = "corpuser";

/// Entity type of group snapshots.
pub const CORP_GROUP_ENTITY_TYPE: &str = "corpGroup";

/// Identifier attributes tried, in order, when the mapped one is absent.
const FALLBACK_IDENTIFIER_ATTRIBUTES: [&str; 2] = ["sAMAccountName", "uid"];

/// Resolve a person's identifier: the mapped attribute, then the fallbacks.
///
/// Each fallback hit is recorded as a warning naming the attribute used.
pub fn resolve_identifier(
    entry: &DirectoryEntry,
    attrs: &UserAttrsMap,
    report: &mut SourceReport,
) -> Option<String> {
    if let Some(id) = entry.first(&attrs.urn) {
        return Some(id);
    }

    FALLBACK_IDENTIFIER_ATTRIBUTES.iter().find_map(|fallback| {
        let id = entry.first(fallback)?;
        report.report_warning(
            GENERAL_CONTEXT,
            format!(
                "Defaulting to {fallback} as it was found in attrs and not set in user_attrs_map"
            ),
        );
        Some(id)
    })
}

/// Reduce a DN value to the bare name of its first component.
///
/// `uid=alice,ou=People,dc=example,dc=com` -> `alice`.
pub fn reduce_dn(value: &[u8]) -> String {
    let dn = String::from_utf8_lossy(value);
    let first = dn.split(',').next().unwrap_or_default();
    first.strip_prefix("uid=").unwrap_or(first).to_string()
}

/// Builds catalog snapshots from classified entries.
#[derive(Debug, Clone)]
pub struct EntityBuilder {
    user_attrs: UserAttrsMap,
    group_attrs: GroupAttrsMap,
    drop_missing_first_last_name: bool,
}

impl EntityBuilder {
    pub fn new(
        user_attrs: UserAttrsMap,
        group_attrs: GroupAttrsMap,
        drop_missing_first_last_name: bool,
    ) -> Self {
        Self {
            user_attrs,
            group_attrs,
            drop_missing_first_last_name,
        }
    }

    pub fn user_attrs(&self) -> &UserAttrsMap {
        &self.user_attrs
    }

    /// Build a user snapshot keyed by the entry's DN.
    ///
    /// `Ok(None)` means the entry is dropped. A present but non-numeric
    /// department id is an error.
    pub fn build_user(
        &self,
        entry: &DirectoryEntry,
        manager: Option<&str>,
        report: &mut SourceReport,
    ) -> IngestResult<Option<MetadataWorkUnit>> {
        let attrs = &self.user_attrs;

        if self.drop_missing_first_last_name
            && (!entry.has(&attrs.first_name) || !entry.has(&attrs.last_name))
        {
            debug!(dn = %entry.dn, "Dropping user without first or last name");
            return Ok(None);
        }

        let Some(id) = resolve_identifier(entry, attrs, report) else {
            debug!(dn = %entry.dn, "Dropping user without identifier");
            return Ok(None);
        };

        let first_name = entry.first(&attrs.first_name);
        let last_name = entry.first(&attrs.last_name);
        let full_name = entry.first(&attrs.full_name).or_else(|| {
            match (first_name.as_deref(), last_name.as_deref()) {
                (Some(first), Some(last)) => Some(format!("{first} {last}")),
                _ => None,
            }
        });

        let department_id = entry
            .first(&attrs.department_id)
            .map(|raw| {
                raw.trim().parse::<i64>().map_err(|e| {
                    IngestError::field_parse(&attrs.department_id, raw.as_str(), e.to_string())
                })
            })
            .transpose()?;

        let info = CorpUserInfo {
            active: true,
            email: entry.first(&attrs.email).or_else(|| Some(id.clone())),
            display_name: entry.first(&attrs.display_name).or_else(|| full_name.clone()),
            full_name,
            first_name,
            last_name,
            department_id,
            department_name: entry.first(&attrs.department_name),
            country_code: entry.first(&attrs.country_code),
            title: entry.first(&attrs.title),
            manager_urn: manager.map(corp_user_urn),
        };

        let mcp = MetadataChangeProposal::upsert(
            CORP_USER_ENTITY_TYPE,
            corp_user_urn(&id),
            Aspect::CorpUserInfo(info),
        );
        Ok(Some(MetadataWorkUnit::for_snapshot(entry.dn.clone(), mcp)))
    }

    /// Build a group snapshot keyed by the entry's DN, or `None` when the
    /// group identifier attribute is missing.
    pub fn build_group(&self, entry: &DirectoryEntry) -> Option<MetadataWorkUnit> {
        let attrs = &self.group_attrs;
        let name = entry.first(&attrs.urn)?;

        let info = CorpGroupInfo {
            email: entry.first(&attrs.email).or_else(|| Some(name.clone())),
            admins: user_refs(entry, &attrs.admins),
            members: user_refs(entry, &attrs.members),
            groups: Vec::new(),
            description: entry.first(&attrs.description),
            display_name: entry.first(&attrs.display_name),
        };

        let mcp = MetadataChangeProposal::upsert(
            CORP_GROUP_ENTITY_TYPE,
            corp_group_urn(&name),
            Aspect::CorpGroupInfo(info),
        );
        Some(MetadataWorkUnit::for_snapshot(entry.dn.clone(), mcp))
    }
}

/// User references for every DN value of `attribute`.
fn user_refs(entry: &DirectoryEntry, attribute: &str) -> Vec<String> {
    entry
        .values(attribute)
        .iter()
        .map(|dn| corp_user_urn(&reduce_dn(dn)))
        .collect()
}
