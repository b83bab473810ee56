//! LDAP source configuration
//!
//! Connection, extraction and attribute-mapping settings for directory crawls.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use xavyo_ingest::config::{ConnectionSettings, SourceConfig, TlsConfig};
use xavyo_ingest::error::{IngestError, IngestResult};

/// Configuration for the LDAP source.
#[derive(Clone, Serialize, Deserialize)]
pub struct LdapSourceConfig {
    /// Server URL, e.g. `ldaps://ldap.example.com:636`.
    pub ldap_server: String,

    /// Bind DN.
    pub ldap_user: String,

    /// Bind password.
    pub ldap_password: String,

    /// Search base (e.g., "dc=example,dc=com").
    pub base_dn: String,

    /// Search filter applied to the crawl and to manager lookups.
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Drop users lacking a first or last name.
    #[serde(default = "default_true")]
    pub drop_missing_first_last_name: bool,

    /// Entries per page requested from the server.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Per-key overrides of the user attribute mapping.
    #[serde(default)]
    pub user_attrs_map: BTreeMap<String, String>,

    /// Per-key overrides of the group attribute mapping.
    #[serde(default)]
    pub group_attrs_map: BTreeMap<String, String>,

    /// Connection settings (timeouts).
    #[serde(default)]
    pub connection: ConnectionSettings,

    /// TLS configuration.
    #[serde(default)]
    pub tls: TlsConfig,
}

impl std::fmt::Debug for LdapSourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapSourceConfig")
            .field("ldap_server", &self.ldap_server)
            .field("ldap_user", &self.ldap_user)
            .field("ldap_password", &"***REDACTED***")
            .field("base_dn", &self.base_dn)
            .field("filter", &self.filter)
            .field(
                "drop_missing_first_last_name",
                &self.drop_missing_first_last_name,
            )
            .field("page_size", &self.page_size)
            .field("user_attrs_map", &self.user_attrs_map)
            .field("group_attrs_map", &self.group_attrs_map)
            .field("connection", &self.connection)
            .field("tls", &self.tls)
            .finish()
    }
}

fn default_filter() -> String {
    "(objectClass=*)".to_string()
}

fn default_true() -> bool {
    true
}

fn default_page_size() -> u32 {
    20
}

impl LdapSourceConfig {
    /// Create a config with required fields and defaults for the rest.
    pub fn new(
        ldap_server: impl Into<String>,
        base_dn: impl Into<String>,
        ldap_user: impl Into<String>,
        ldap_password: impl Into<String>,
    ) -> Self {
        Self {
            ldap_server: ldap_server.into(),
            ldap_user: ldap_user.into(),
            ldap_password: ldap_password.into(),
            base_dn: base_dn.into(),
            filter: default_filter(),
            drop_missing_first_last_name: true,
            page_size: default_page_size(),
            user_attrs_map: BTreeMap::new(),
            group_attrs_map: BTreeMap::new(),
            connection: ConnectionSettings::default(),
            tls: TlsConfig::default(),
        }
    }

    /// Set the search filter.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Set the page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Keep users lacking a first or last name.
    #[must_use]
    pub fn with_drop_missing_first_last_name(mut self, drop: bool) -> Self {
        self.drop_missing_first_last_name = drop;
        self
    }

    /// Override one user attribute mapping.
    pub fn with_user_attr(mut self, key: impl Into<String>, attr: impl Into<String>) -> Self {
        self.user_attrs_map.insert(key.into(), attr.into());
        self
    }

    /// Override one group attribute mapping.
    pub fn with_group_attr(mut self, key: impl Into<String>, attr: impl Into<String>) -> Self {
        self.group_attrs_map.insert(key.into(), attr.into());
        self
    }

    /// Page size as sent in the paged-results control.
    pub fn page_size_i32(&self) -> i32 {
        i32::try_from(self.page_size).unwrap_or(i32::MAX)
    }

    /// Built-in user mapping with this config's overrides applied.
    pub fn resolved_user_attrs(&self) -> IngestResult<UserAttrsMap> {
        UserAttrsMap::default().resolve(&self.user_attrs_map)
    }

    /// Built-in group mapping with this config's overrides applied.
    pub fn resolved_group_attrs(&self) -> IngestResult<GroupAttrsMap> {
        GroupAttrsMap::default().resolve(&self.group_attrs_map)
    }
}

impl SourceConfig for LdapSourceConfig {
    fn validate(&self) -> IngestResult<()> {
        if self.ldap_server.is_empty() {
            return Err(IngestError::invalid_config("ldap_server is required"));
        }

        if !self.ldap_server.starts_with("ldap://") && !self.ldap_server.starts_with("ldaps://") {
            return Err(IngestError::invalid_config(format!(
                "ldap_server must be an ldap:// or ldaps:// URL, got '{}'",
                self.ldap_server
            )));
        }

        if self.base_dn.is_empty() {
            return Err(IngestError::invalid_config("base_dn is required"));
        }

        if self.page_size == 0 || i32::try_from(self.page_size).is_err() {
            return Err(IngestError::invalid_config(format!(
                "page_size must be between 1 and {}",
                i32::MAX
            )));
        }

        self.resolved_user_attrs()?;
        self.resolved_group_attrs()?;

        Ok(())
    }

    fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.ldap_password = "***REDACTED***".to_string();
        config
    }
}

/// Directory attribute names backing each user profile field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAttrsMap {
    pub urn: String,
    pub full_name: String,
    pub last_name: String,
    pub first_name: String,
    pub display_name: String,
    pub manager_urn: String,
    pub email: String,
    pub department_id: String,
    pub title: String,
    pub department_name: String,
    pub country_code: String,
}

impl Default for UserAttrsMap {
    fn default() -> Self {
        Self {
            urn: "sAMAccountName".to_string(),
            full_name: "cn".to_string(),
            last_name: "sn".to_string(),
            first_name: "givenName".to_string(),
            display_name: "displayName".to_string(),
            manager_urn: "manager".to_string(),
            email: "mail".to_string(),
            department_id: "departmentNumber".to_string(),
            title: "title".to_string(),
            department_name: "departmentNumber".to_string(),
            country_code: "countryCode".to_string(),
        }
    }
}

impl UserAttrsMap {
    /// Layer `overrides` (keyed by recipe name, e.g. `firstName`) on top of `self`.
    pub fn resolve(mut self, overrides: &BTreeMap<String, String>) -> IngestResult<Self> {
        for (key, attr) in overrides {
            let slot = match key.as_str() {
                "urn" => &mut self.urn,
                "fullName" => &mut self.full_name,
                "lastName" => &mut self.last_name,
                "firstName" => &mut self.first_name,
                "displayName" => &mut self.display_name,
                "managerUrn" => &mut self.manager_urn,
                "email" => &mut self.email,
                "departmentId" => &mut self.department_id,
                "title" => &mut self.title,
                "departmentName" => &mut self.department_name,
                "countryCode" => &mut self.country_code,
                other => {
                    return Err(IngestError::invalid_config(format!(
                        "unknown user_attrs_map key '{other}'"
                    )))
                }
            };
            *slot = attr.clone();
        }
        Ok(self)
    }
}

/// Directory attribute names backing each group profile field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAttrsMap {
    pub urn: String,
    pub email: String,
    pub admins: String,
    pub members: String,
    pub display_name: String,
    pub description: String,
}

impl Default for GroupAttrsMap {
    fn default() -> Self {
        Self {
            urn: "cn".to_string(),
            email: "mail".to_string(),
            admins: "owner".to_string(),
            members: "uniqueMember".to_string(),
            display_name: "name".to_string(),
            description: "info".to_string(),
        }
    }
}

impl GroupAttrsMap {
    /// Layer `overrides` (keyed by recipe name, e.g. `displayName`) on top of `self`.
    pub fn resolve(mut self, overrides: &BTreeMap<String, String>) -> IngestResult<Self> {
        for (key, attr) in overrides {
            let slot = match key.as_str() {
                "urn" => &mut self.urn,
                "email" => &mut self.email,
                "admins" => &mut self.admins,
                "members" => &mut self.members,
                "displayName" => &mut self.display_name,
                "description" => &mut self.description,
                other => {
                    return Err(IngestError::invalid_config(format!(
                        "unknown group_attrs_map key '{other}'"
                    )))
                }
            };
            *slot = attr.clone();
        }
        Ok(self)
    }
}
