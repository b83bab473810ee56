//! Common test utilities for xavyo-ingest-ldap integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, Once};

use xavyo_ingest::async_trait;
use xavyo_ingest::prelude::*;
use xavyo_ingest_ldap::{
    DirectoryClient, DirectoryEntry, LdapSource, LdapSourceConfig, PageCursor, PagedControl,
    SearchPage,
};

pub const BASE_DN: &str = "dc=example,dc=com";
pub const BIND_DN: &str = "cn=admin,dc=example,dc=com";

static INIT: Once = Once::new();

/// Install a test log writer once per test binary.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("xavyo_ingest=debug,xavyo_ingest_ldap=debug")
            .with_test_writer()
            .try_init();
    });
}

/// One call made against the mock directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryCall {
    Bind(String),
    Search { cookie: Vec<u8>, size: i32 },
    Lookup(String),
    Unbind,
}

/// Scripted directory: pages are served in order, lookups by exact DN.
#[derive(Debug, Default)]
pub struct MockDirectory {
    pages: VecDeque<IngestResult<SearchPage>>,
    lookups: HashMap<String, DirectoryEntry>,
    failing_lookups: HashSet<String>,
    reject_bind: bool,
    calls: Arc<Mutex<Vec<DirectoryCall>>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve a page ending with `cookie`; `None` omits the paging control.
    pub fn with_page(mut self, entries: Vec<DirectoryEntry>, cookie: Option<&str>) -> Self {
        self.pages.push_back(Ok(SearchPage {
            entries,
            cursor: cookie.map(|c| PageCursor::new(c.as_bytes().to_vec())),
            error: None,
        }));
        self
    }

    /// Serve a page whose result code reports `error`.
    pub fn with_failed_page(mut self, entries: Vec<DirectoryEntry>, error: &str) -> Self {
        self.pages.push_back(Ok(SearchPage {
            entries,
            cursor: Some(PageCursor::new(b"more".to_vec())),
            error: Some(error.to_string()),
        }));
        self
    }

    /// Fail the next search outright.
    pub fn with_search_error(mut self, message: &str) -> Self {
        self.pages.push_back(Err(IngestError::protocol(message)));
        self
    }

    pub fn with_lookup(mut self, entry: DirectoryEntry) -> Self {
        self.lookups.insert(entry.dn.clone(), entry);
        self
    }

    pub fn with_failing_lookup(mut self, dn: &str) -> Self {
        self.failing_lookups.insert(dn.to_string());
        self
    }

    pub fn with_rejected_bind(mut self) -> Self {
        self.reject_bind = true;
        self
    }

    /// Shared call log, readable after the mock moved into a source.
    pub fn calls(&self) -> Arc<Mutex<Vec<DirectoryCall>>> {
        Arc::clone(&self.calls)
    }

    fn log(&self, call: DirectoryCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DirectoryClient for MockDirectory {
    async fn bind(&mut self, bind_dn: &str, _password: &str) -> IngestResult<()> {
        self.log(DirectoryCall::Bind(bind_dn.to_string()));
        if self.reject_bind {
            return Err(IngestError::AuthenticationFailed);
        }
        Ok(())
    }

    async fn search_page(
        &mut self,
        _base_dn: &str,
        _filter: &str,
        control: &PagedControl,
    ) -> IngestResult<SearchPage> {
        self.log(DirectoryCall::Search {
            cookie: control.cursor.as_bytes().to_vec(),
            size: control.size,
        });
        self.pages.pop_front().unwrap_or_else(|| {
            Ok(SearchPage {
                entries: Vec::new(),
                cursor: Some(PageCursor::default()),
                error: None,
            })
        })
    }

    async fn lookup(
        &mut self,
        dn: &str,
        _filter: &str,
        _control: &PagedControl,
    ) -> IngestResult<Vec<DirectoryEntry>> {
        self.log(DirectoryCall::Lookup(dn.to_string()));
        if self.failing_lookups.contains(dn) {
            return Err(IngestError::protocol("no such object"));
        }
        Ok(self.lookups.get(dn).cloned().into_iter().collect())
    }

    async fn unbind(&mut self) -> IngestResult<()> {
        self.log(DirectoryCall::Unbind);
        Ok(())
    }
}

pub fn config() -> LdapSourceConfig {
    LdapSourceConfig::new("ldap://ldap.example.com", BASE_DN, BIND_DN, "secret")
}

/// Bound source over `directory` with the default config.
pub async fn source(directory: MockDirectory) -> LdapSource<MockDirectory> {
    source_with(config(), directory).await
}

pub async fn source_with(
    config: LdapSourceConfig,
    directory: MockDirectory,
) -> LdapSource<MockDirectory> {
    init_test_logging();
    LdapSource::new(config, &PipelineContext::new("test"), directory)
        .await
        .unwrap()
}

/// Person entry with account name, given name and surname.
pub fn person(uid: &str, given: &str, sn: &str) -> DirectoryEntry {
    DirectoryEntry::new(format!("uid={uid},ou=People,{BASE_DN}"))
        .with_attr("objectClass", "top")
        .with_attr("objectClass", "inetOrgPerson")
        .with_attr("sAMAccountName", uid)
        .with_attr("givenName", given)
        .with_attr("sn", sn)
        .with_attr("cn", &format!("{given} {sn}"))
}

/// Group entry with the given member account names.
pub fn group(cn: &str, members: &[&str]) -> DirectoryEntry {
    members.iter().fold(
        DirectoryEntry::new(format!("cn={cn},ou=Groups,{BASE_DN}"))
            .with_attr("objectClass", "posixGroup")
            .with_attr("cn", cn),
        |entry, uid| entry.with_attr("uniqueMember", &format!("uid={uid},ou=People,{BASE_DN}")),
    )
}

pub fn searches(calls: &Arc<Mutex<Vec<DirectoryCall>>>) -> Vec<Vec<u8>> {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter_map(|call| match call {
            DirectoryCall::Search { cookie, .. } => Some(cookie.clone()),
            _ => None,
        })
        .collect()
}

pub fn urns(workunits: &[MetadataWorkUnit]) -> Vec<&str> {
    workunits.iter().map(|wu| wu.mcp.entity_urn.as_str()).collect()
}

pub fn user_info(wu: &MetadataWorkUnit) -> &CorpUserInfo {
    match wu.aspect() {
        Aspect::CorpUserInfo(info) => info,
        other => panic!("expected corpUserInfo, got {other:?}"),
    }
}
