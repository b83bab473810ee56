//! Directory crawl source
//!
//! Pages through the directory under `base_dn`, turning person entries into
//! user snapshots and group entries into group snapshots.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use xavyo_ingest::config::SourceConfig;
use xavyo_ingest::error::IngestResult;
use xavyo_ingest::report::SourceReport;
use xavyo_ingest::traits::{PipelineContext, Source, SourceDescriptor, SupportStatus};
use xavyo_ingest::workunit::MetadataWorkUnit;

use crate::builder::{
    resolve_identifier, EntityBuilder, CORP_GROUP_ENTITY_TYPE, CORP_USER_ENTITY_TYPE,
    GENERAL_CONTEXT,
};
use crate::classify::{classify, EntryKind};
use crate::client::{DirectoryClient, DirectoryEntry, Ldap3Client};
use crate::config::LdapSourceConfig;
use crate::paging::{PagedControl, PagingFailure, PagingState};

/// Report context for search and paging failures.
pub const LDAP_CONTROL_CONTEXT: &str = "ldap-control";

/// Run report with per-entity counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LdapSourceReport {
    #[serde(flatten)]
    pub base: SourceReport,
    pub num_user_workunits_produced: u64,
    pub num_group_workunits_produced: u64,
}

impl LdapSourceReport {
    /// DNs of entries that produced nothing.
    pub fn dropped_dns(&self) -> &[String] {
        &self.base.dropped
    }

    fn record(&mut self, wu: &MetadataWorkUnit) {
        match wu.mcp.entity_type.as_str() {
            CORP_USER_ENTITY_TYPE => self.num_user_workunits_produced += 1,
            CORP_GROUP_ENTITY_TYPE => self.num_group_workunits_produced += 1,
            _ => {}
        }
        self.base.report_workunit(wu);
    }
}

/// Crawls a directory server page by page.
#[derive(Debug)]
pub struct LdapSource<C: DirectoryClient = Ldap3Client> {
    config: LdapSourceConfig,
    client: C,
    builder: EntityBuilder,
    report: LdapSourceReport,
}

impl LdapSource<Ldap3Client> {
    /// Open an `ldap3` session for `config` and create a bound source.
    pub async fn connect(config: LdapSourceConfig, ctx: &PipelineContext) -> IngestResult<Self> {
        config.validate()?;
        let client = Ldap3Client::connect(&config).await?;
        Self::new(config, ctx, client).await
    }
}

impl<C: DirectoryClient> LdapSource<C> {
    /// Platform name under which this source registers.
    pub const PLATFORM: &'static str = "LDAP";

    /// Create a source over `client`. The config is validated, attribute
    /// maps are resolved and the session is bound here; any failure is fatal.
    pub async fn new(
        config: LdapSourceConfig,
        ctx: &PipelineContext,
        mut client: C,
    ) -> IngestResult<Self> {
        config.validate()?;

        debug!(
            config = ?config.redacted(),
            run_id = %ctx.run_id,
            "Creating LDAP source"
        );

        let builder = EntityBuilder::new(
            config.resolved_user_attrs()?,
            config.resolved_group_attrs()?,
            config.drop_missing_first_last_name,
        );

        if let Err(e) = client.bind(&config.ldap_user, &config.ldap_password).await {
            warn!(
                server = %config.ldap_server,
                error = %e,
                "LDAP connection failed"
            );
            return Err(e);
        }

        Ok(Self {
            config,
            client,
            builder,
            report: LdapSourceReport::default(),
        })
    }

    /// Counters and diagnostics for this run.
    pub fn ldap_report(&self) -> &LdapSourceReport {
        &self.report
    }

    /// Run the paged crawl to completion.
    #[instrument(skip(self), fields(base_dn = %self.config.base_dn))]
    pub async fn crawl(&mut self) -> Vec<MetadataWorkUnit> {
        let mut workunits = Vec::new();
        let mut state = PagingState::start();
        let mut pages = 0usize;

        while let PagingState::Paging(cursor) = state {
            let control = PagedControl::new(self.config.page_size_i32(), cursor);
            pages += 1;

            let page = match self
                .client
                .search_page(&self.config.base_dn, &self.config.filter, &control)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    self.report
                        .base
                        .report_failure(LDAP_CONTROL_CONTEXT, format!("LDAP search failed: {e}"));
                    break;
                }
            };

            debug!(page = pages, entries = page.entries.len(), "Processing search page");

            for entry in page.entries {
                if let Some(wu) = self.process_entry(entry, &control).await {
                    self.report.record(&wu);
                    workunits.push(wu);
                }
            }

            if let Some(error) = page.error {
                self.report
                    .base
                    .report_failure(LDAP_CONTROL_CONTEXT, format!("LDAP search failed: {error}"));
                break;
            }

            state = match PagingState::advance(page.cursor) {
                Ok(next) => next,
                Err(PagingFailure::ControlMissing) => {
                    self.report
                        .base
                        .report_failure(LDAP_CONTROL_CONTEXT, "Server ignores RFC 2696 control.");
                    break;
                }
            };
        }

        info!(
            pages,
            workunits = workunits.len(),
            dropped = self.report.base.dropped.len(),
            failures = self.report.base.failure_count(),
            "LDAP crawl complete"
        );

        workunits
    }

    /// Classify one entry and build its snapshot, if any.
    async fn process_entry(
        &mut self,
        entry: DirectoryEntry,
        control: &PagedControl,
    ) -> Option<MetadataWorkUnit> {
        if entry.dn.is_empty() {
            return None;
        }

        if entry.attrs.is_empty() {
            self.report.base.report_warning(
                GENERAL_CONTEXT,
                format!(
                    "skipping {} because attrs is empty; check your permissions if this is unexpected",
                    entry.dn
                ),
            );
            self.report.base.report_dropped(entry.dn);
            return None;
        }

        let built = match classify(&entry) {
            EntryKind::User => self.build_user(&entry, control).await,
            EntryKind::Group => self.builder.build_group(&entry),
            EntryKind::Other => None,
        };

        if built.is_none() {
            self.report.base.report_dropped(entry.dn);
        }
        built
    }

    async fn build_user(
        &mut self,
        entry: &DirectoryEntry,
        control: &PagedControl,
    ) -> Option<MetadataWorkUnit> {
        let manager = match entry.values(&self.builder.user_attrs().manager_urn).first() {
            Some(raw) => {
                let manager_dn = String::from_utf8_lossy(raw).into_owned();
                self.resolve_manager(&entry.dn, &manager_dn, control).await
            }
            None => None,
        };

        match self
            .builder
            .build_user(entry, manager.as_deref(), &mut self.report.base)
        {
            Ok(built) => built,
            Err(e) => {
                self.report.base.report_failure(entry.dn.clone(), e.to_string());
                None
            }
        }
    }

    /// Identifier of the manager at `manager_dn`, via a base-scoped lookup.
    ///
    /// Lookup failures are warnings against the user's DN.
    #[instrument(skip(self, control))]
    async fn resolve_manager(
        &mut self,
        user_dn: &str,
        manager_dn: &str,
        control: &PagedControl,
    ) -> Option<String> {
        match self
            .client
            .lookup(manager_dn, &self.config.filter, control)
            .await
        {
            Ok(found) => {
                let manager = found.first()?;
                resolve_identifier(manager, self.builder.user_attrs(), &mut self.report.base)
            }
            Err(e) => {
                self.report
                    .base
                    .report_warning(user_dn, format!("manager LDAP search failed: {e}"));
                None
            }
        }
    }
}

#[async_trait]
impl<C: DirectoryClient> Source for LdapSource<C> {
    fn descriptor(&self) -> SourceDescriptor {
        SourceDescriptor {
            platform: Self::PLATFORM,
            support_status: SupportStatus::Certified,
        }
    }

    async fn get_workunits(&mut self) -> IngestResult<Vec<MetadataWorkUnit>> {
        Ok(self.crawl().await)
    }

    fn report(&self) -> &SourceReport {
        &self.report.base
    }

    async fn close(&mut self) -> IngestResult<()> {
        self.client.unbind().await?;
        info!(server = %self.config.ldap_server, "LDAP source closed");
        Ok(())
    }
}
