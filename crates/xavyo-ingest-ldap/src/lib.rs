//! # LDAP Source
//!
//! Crawls a directory server with the paged-results control (RFC 2696) and
//! emits a user snapshot for every person entry and a group snapshot for
//! every group entry.
//!
//! ## Features
//!
//! - Paged subtree search driven by an explicit cursor state machine
//! - Object-class based classification of entries
//! - Configurable attribute mappings layered over built-in defaults
//! - Manager resolution through base-scoped lookups
//!
//! ## Example
//!
//! ```ignore
//! use xavyo_ingest::prelude::*;
//! use xavyo_ingest_ldap::{LdapSource, LdapSourceConfig};
//!
//! let config = LdapSourceConfig::new(
//!     "ldaps://ldap.example.com:636",
//!     "dc=example,dc=com",
//!     "cn=admin,dc=example,dc=com",
//!     "secret",
//! )
//! .with_page_size(100)
//! .with_user_attr("urn", "uid");
//!
//! let mut source = LdapSource::connect(config, &PipelineContext::new("run-1")).await?;
//! let workunits = source.get_workunits().await?;
//! source.close().await?;
//! ```

pub mod builder;
pub mod classify;
pub mod client;
pub mod config;
pub mod paging;
pub mod source;

// Re-exports
pub use builder::{reduce_dn, resolve_identifier, EntityBuilder};
pub use classify::{classify, EntryKind};
pub use client::{DirectoryClient, DirectoryEntry, Ldap3Client, SearchPage};
pub use config::{GroupAttrsMap, LdapSourceConfig, UserAttrsMap};
pub use paging::{PageCursor, PagedControl, PagingFailure, PagingState};
pub use source::{LdapSource, LdapSourceReport};
