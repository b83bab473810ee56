//! Paged crawl behavior against a scripted directory.

mod common;

use common::*;
use xavyo_ingest::prelude::*;
use xavyo_ingest_ldap::{DirectoryEntry, LdapSource};

#[tokio::test]
async fn test_three_pages_three_searches() {
    let directory = MockDirectory::new()
        .with_page(vec![person("alice", "Alice", "Liddell")], Some("c1"))
        .with_page(vec![person("bob", "Bob", "Builder")], Some("c2"))
        .with_page(vec![group("admins", &["alice"])], Some(""));
    let calls = directory.calls();

    let mut source = source(directory).await;
    let workunits = source.get_workunits().await.unwrap();

    assert_eq!(
        searches(&calls),
        vec![Vec::new(), b"c1".to_vec(), b"c2".to_vec()]
    );
    assert_eq!(
        urns(&workunits),
        vec![
            "urn:li:corpuser:alice",
            "urn:li:corpuser:bob",
            "urn:li:corpGroup:admins"
        ]
    );

    let report = source.ldap_report();
    assert_eq!(report.num_user_workunits_produced, 2);
    assert_eq!(report.num_group_workunits_produced, 1);
    assert_eq!(report.base.workunits_produced, 3);
    assert!(!report.base.has_failures());
}

#[tokio::test]
async fn test_page_size_sent_with_every_search() {
    let directory = MockDirectory::new()
        .with_page(Vec::new(), Some("c1"))
        .with_page(Vec::new(), Some(""));
    let calls = directory.calls();

    let mut source = source_with(config().with_page_size(7), directory).await;
    source.get_workunits().await.unwrap();

    let sizes: Vec<i32> = calls
        .lock()
        .unwrap()
        .iter()
        .filter_map(|call| match call {
            DirectoryCall::Search { size, .. } => Some(*size),
            _ => None,
        })
        .collect();
    assert_eq!(sizes, vec![7, 7]);
}

#[tokio::test]
async fn test_missing_paging_control_stops_crawl() {
    let directory = MockDirectory::new()
        .with_page(vec![person("alice", "Alice", "Liddell")], None)
        .with_page(vec![person("bob", "Bob", "Builder")], Some(""));
    let calls = directory.calls();

    let mut source = source(directory).await;
    let workunits = source.get_workunits().await.unwrap();

    assert_eq!(searches(&calls).len(), 1);
    assert_eq!(urns(&workunits), vec!["urn:li:corpuser:alice"]);

    let failures = &source.report().failures;
    assert_eq!(source.report().failure_count(), 1);
    assert_eq!(
        failures["ldap-control"],
        vec!["Server ignores RFC 2696 control.".to_string()]
    );
}

#[tokio::test]
async fn test_search_error_ends_crawl_without_aborting() {
    let directory = MockDirectory::new()
        .with_page(vec![person("alice", "Alice", "Liddell")], Some("c1"))
        .with_search_error("server unavailable");
    let calls = directory.calls();

    let mut source = source(directory).await;
    let workunits = source.get_workunits().await.unwrap();

    assert_eq!(searches(&calls).len(), 2);
    assert_eq!(workunits.len(), 1);
    let failure = &source.report().failures["ldap-control"][0];
    assert!(failure.starts_with("LDAP search failed:"), "{failure}");
    assert!(failure.contains("server unavailable"), "{failure}");
}

#[tokio::test]
async fn test_failed_page_entries_still_processed() {
    let directory = MockDirectory::new().with_failed_page(
        vec![person("alice", "Alice", "Liddell")],
        "code 11: size limit exceeded",
    );
    let calls = directory.calls();

    let mut source = source(directory).await;
    let workunits = source.get_workunits().await.unwrap();

    assert_eq!(searches(&calls).len(), 1);
    assert_eq!(urns(&workunits), vec!["urn:li:corpuser:alice"]);
    assert_eq!(source.report().failure_count(), 1);
}

#[tokio::test]
async fn test_classifier_routes_and_drops() {
    let device = DirectoryEntry::new("cn=printer,ou=Devices,dc=example,dc=com")
        .with_attr("objectClass", "device")
        .with_attr("cn", "printer");
    let account = DirectoryEntry::new("uid=svc,ou=People,dc=example,dc=com")
        .with_attr("objectClass", "posixAccount")
        .with_attr("uid", "svc")
        .with_attr("givenName", "Service")
        .with_attr("sn", "Account");
    let unit = DirectoryEntry::new("ou=Sales,dc=example,dc=com")
        .with_attr("objectClass", "organizationalUnit")
        .with_attr("cn", "Sales");

    let directory =
        MockDirectory::new().with_page(vec![device, account, unit], Some(""));
    let mut source = source(directory).await;
    let workunits = source.get_workunits().await.unwrap();

    assert_eq!(
        urns(&workunits),
        vec!["urn:li:corpuser:svc", "urn:li:corpGroup:Sales"]
    );
    assert_eq!(
        source.ldap_report().dropped_dns(),
        &["cn=printer,ou=Devices,dc=example,dc=com".to_string()]
    );
    // uid fallback used for the account
    assert_eq!(source.report().warnings["<general>"].len(), 1);
}

#[tokio::test]
async fn test_empty_attrs_and_empty_dn() {
    let directory = MockDirectory::new().with_page(
        vec![
            DirectoryEntry::new("cn=hidden,dc=example,dc=com"),
            DirectoryEntry::new("").with_attr("objectClass", "person"),
        ],
        Some(""),
    );
    let mut source = source(directory).await;
    let workunits = source.get_workunits().await.unwrap();

    assert!(workunits.is_empty());
    assert_eq!(
        source.ldap_report().dropped_dns(),
        &["cn=hidden,dc=example,dc=com".to_string()]
    );
    let warning = &source.report().warnings["<general>"][0];
    assert!(warning.starts_with("skipping cn=hidden,dc=example,dc=com because attrs is empty"));
}

#[tokio::test]
async fn test_bind_failure_is_fatal() {
    let directory = MockDirectory::new().with_rejected_bind();
    let calls = directory.calls();

    let err = LdapSource::new(config(), &PipelineContext::new("test"), directory)
        .await
        .unwrap_err();

    assert!(err.is_fatal());
    assert_eq!(err.error_code(), "AUTH_FAILED");
    assert_eq!(searches(&calls).len(), 0);
}

#[tokio::test]
async fn test_invalid_config_rejected_before_bind() {
    let directory = MockDirectory::new();
    let calls = directory.calls();

    let err = LdapSource::new(
        config().with_user_attr("nickname", "cn"),
        &PipelineContext::new("test"),
        directory,
    )
    .await
    .unwrap_err();

    assert_eq!(err.error_code(), "INVALID_CONFIG");
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_close_unbinds() {
    let directory = MockDirectory::new();
    let calls = directory.calls();

    let mut source = source(directory).await;
    source.close().await.unwrap();

    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            DirectoryCall::Bind(BIND_DN.to_string()),
            DirectoryCall::Unbind
        ]
    );
}

#[tokio::test]
async fn test_descriptor() {
    let source = source(MockDirectory::new()).await;
    let descriptor = source.descriptor();
    assert_eq!(descriptor.platform, "LDAP");
    assert_eq!(descriptor.support_status, SupportStatus::Certified);
}
