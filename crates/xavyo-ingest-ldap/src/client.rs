//! Directory client
//!
//! The [`DirectoryClient`] trait is the seam between the crawl and the wire.
//! [`Ldap3Client`] implements it over an async `ldap3` session.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use ldap3::controls::{Control, ControlType, MakeCritical, PagedResults, RawControl};
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Scope, SearchEntry, SearchResult};
use tracing::{debug, info, instrument, warn};
use xavyo_ingest::error::{IngestError, IngestResult};

use crate::config::LdapSourceConfig;
use crate::paging::{PageCursor, PagedControl};

/// Result code for invalid credentials.
const LDAP_INVALID_CREDENTIALS: u32 = 49;

/// One directory entry: DN plus raw attribute values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub dn: String,
    pub attrs: HashMap<String, Vec<Vec<u8>>>,
}

impl DirectoryEntry {
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attrs: HashMap::new(),
        }
    }

    /// Add a text attribute value.
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs
            .entry(name.to_string())
            .or_default()
            .push(value.as_bytes().to_vec());
        self
    }

    pub fn has(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// All raw values of `name`.
    pub fn values(&self, name: &str) -> &[Vec<u8>] {
        self.attrs.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First value of `name`, decoded as UTF-8.
    pub fn first(&self, name: &str) -> Option<String> {
        self.values(name)
            .first()
            .map(|v| String::from_utf8_lossy(v).into_owned())
    }
}

impl From<SearchEntry> for DirectoryEntry {
    fn from(entry: SearchEntry) -> Self {
        let mut attrs: HashMap<String, Vec<Vec<u8>>> = entry
            .attrs
            .into_iter()
            .map(|(name, values)| (name, values.into_iter().map(String::into_bytes).collect()))
            .collect();
        for (name, values) in entry.bin_attrs {
            attrs.entry(name).or_default().extend(values);
        }
        Self {
            dn: entry.dn,
            attrs,
        }
    }
}

/// One page of a paged search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    /// Entries returned, including those that preceded an error.
    pub entries: Vec<DirectoryEntry>,
    /// Cursor from the server's paged-results control; `None` when absent.
    pub cursor: Option<PageCursor>,
    /// Error the server reported for this search, if any.
    pub error: Option<String>,
}

/// Directory operations used by the crawl.
#[async_trait]
pub trait DirectoryClient: Send {
    /// Authenticate the session.
    async fn bind(&mut self, bind_dn: &str, password: &str) -> IngestResult<()>;

    /// Subtree search under `base_dn` with the paged-results control attached.
    ///
    /// Transport failures return `Err`; a non-success result code is carried
    /// in [`SearchPage::error`] alongside whatever entries arrived.
    async fn search_page(
        &mut self,
        base_dn: &str,
        filter: &str,
        control: &PagedControl,
    ) -> IngestResult<SearchPage>;

    /// Base-scoped lookup of exactly `dn`.
    async fn lookup(
        &mut self,
        dn: &str,
        filter: &str,
        control: &PagedControl,
    ) -> IngestResult<Vec<DirectoryEntry>>;

    /// End the session.
    async fn unbind(&mut self) -> IngestResult<()>;
}

/// [`DirectoryClient`] over an `ldap3` async session.
pub struct Ldap3Client {
    ldap: Ldap,
    server: String,
    operation_timeout: Duration,
}

impl Ldap3Client {
    /// Open a session to the configured server. Does not bind.
    pub async fn connect(config: &LdapSourceConfig) -> IngestResult<Self> {
        config.tls.validate_security();

        debug!(url = %config.ldap_server, "Connecting to LDAP server");

        let settings = LdapConnSettings::new()
            .set_conn_timeout(config.connection.connection_timeout())
            .set_no_tls_verify(!config.tls.verify_certificate);

        let (conn, ldap) = LdapConnAsync::with_settings(settings, &config.ldap_server)
            .await
            .map_err(|e| {
                IngestError::connection_failed_with_source("LDAP connection failed", e)
            })?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "LDAP connection driver error");
            }
        });

        Ok(Self {
            ldap,
            server: config.ldap_server.clone(),
            operation_timeout: config.connection.operation_timeout(),
        })
    }

    fn paged(control: &PagedControl) -> RawControl {
        PagedResults {
            size: control.size,
            cookie: control.cursor.as_bytes().to_vec(),
        }
        .critical()
        .into()
    }

    /// Cursor from the response's paged-results control, if any.
    fn returned_cursor(ctrls: &[Control]) -> Option<PageCursor> {
        ctrls.iter().find_map(|ctrl| match ctrl {
            Control(Some(ControlType::PagedResults), raw) => {
                let paged: PagedResults = raw.parse();
                Some(PageCursor::new(paged.cookie))
            }
            _ => None,
        })
    }
}

#[async_trait]
impl DirectoryClient for Ldap3Client {
    #[instrument(skip(self, password))]
    async fn bind(&mut self, bind_dn: &str, password: &str) -> IngestResult<()> {
        let result = self
            .ldap
            .simple_bind(bind_dn, password)
            .await
            .map_err(|e| {
                IngestError::connection_failed_with_source("LDAP connection failed", e)
            })?;

        if result.rc != 0 {
            if result.rc == LDAP_INVALID_CREDENTIALS {
                return Err(IngestError::AuthenticationFailed);
            }
            return Err(IngestError::connection_failed(format!(
                "LDAP connection failed: bind returned code {}: {}",
                result.rc, result.text
            )));
        }

        info!(server = %self.server, "LDAP bind succeeded");
        Ok(())
    }

    async fn search_page(
        &mut self,
        base_dn: &str,
        filter: &str,
        control: &PagedControl,
    ) -> IngestResult<SearchPage> {
        let SearchResult(entries, result) = self
            .ldap
            .with_timeout(self.operation_timeout)
            .with_controls(Self::paged(control))
            .search(base_dn, Scope::Subtree, filter, vec!["*"])
            .await
            .map_err(|e| IngestError::protocol_with_source("LDAP search failed", e))?;

        let error = (result.rc != 0).then(|| format!("code {}: {}", result.rc, result.text));

        Ok(SearchPage {
            entries: entries
                .into_iter()
                .map(SearchEntry::construct)
                .map(DirectoryEntry::from)
                .collect(),
            cursor: Self::returned_cursor(&result.ctrls),
            error,
        })
    }

    async fn lookup(
        &mut self,
        dn: &str,
        filter: &str,
        control: &PagedControl,
    ) -> IngestResult<Vec<DirectoryEntry>> {
        let result = self
            .ldap
            .with_timeout(self.operation_timeout)
            .with_controls(Self::paged(control))
            .search(dn, Scope::Base, filter, vec!["*"])
            .await
            .map_err(|e| IngestError::protocol_with_source("LDAP lookup failed", e))?;

        let (entries, _) = result
            .success()
            .map_err(|e| IngestError::protocol_with_source("LDAP lookup failed", e))?;

        Ok(entries
            .into_iter()
            .map(SearchEntry::construct)
            .map(DirectoryEntry::from)
            .collect())
    }

    async fn unbind(&mut self) -> IngestResult<()> {
        self.ldap
            .unbind()
            .await
            .map_err(|e| IngestError::protocol_with_source("LDAP unbind failed", e))
    }
}

impl std::fmt::Debug for Ldap3Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ldap3Client")
            .field("server", &self.server)
            .field("operation_timeout", &self.operation_timeout)
            .finish()
    }
}
