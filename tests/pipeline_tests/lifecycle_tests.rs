//! Tests for init/dispose and provisioning

use cqlpipe::session::SessionEvent;
use cqlpipe::{Column, CqlPipeError, DataType, EntityDefine, TableInfo, Value};

use crate::common::*;

// =============================================================================
// Provisioning
// =============================================================================

#[test]
fn test_init_provisions_in_order() {
    let (connector, pipeline) = setup_pipeline();
    pipeline.add_entity(page_define()).unwrap();

    pipeline.init().unwrap();

    assert_eq!(
        connector.session().events(),
        vec![
            SessionEvent::CreateKeyspace("crawl".into()),
            SessionEvent::ChangeKeyspace("crawl".into()),
            SessionEvent::Execute(
                "CREATE TABLE IF NOT EXISTS crawl.pages (Id uuid , Url text , Fetched boolean , PRIMARY KEY(Id))"
                    .into()
            ),
        ]
    );
}

#[test]
fn test_init_creates_indexes_after_table() {
    let (connector, pipeline) = setup_pipeline();
    pipeline.add_entity(link_define()).unwrap();

    pipeline.init().unwrap();

    assert_eq!(
        connector.session().executed(),
        vec![
            "CREATE TABLE IF NOT EXISTS graph.links (Id uuid , Target text , Depth int , PRIMARY KEY(Id))",
            "CREATE INDEX IF NOT EXISTS Target ON graph.links(Target);",
        ]
    );
}

#[test]
fn test_init_walks_entities_in_registration_order() {
    let (connector, pipeline) = setup_pipeline();
    pipeline.add_entity(link_define()).unwrap();
    pipeline.add_entity(page_define()).unwrap();

    pipeline.init().unwrap();

    let keyspaces: Vec<_> = connector
        .session()
        .events()
        .into_iter()
        .filter_map(|event| match event {
            SessionEvent::CreateKeyspace(keyspace) => Some(keyspace),
            _ => None,
        })
        .collect();
    assert_eq!(keyspaces, vec!["graph", "crawl"]);
    assert_eq!(connector.session().current_keyspace().as_deref(), Some("crawl"));
}

#[test]
fn test_unique_constraint_blocks_only_its_entity() {
    let (connector, pipeline) = setup_pipeline();
    let unique_define = EntityDefine::new("Account")
        .table(TableInfo::new("users", "accounts").unique(["Email"]))
        .column(Column::new("Id", DataType::TimeUuid, |_: &Page| Value::UnsetId))
        .column(Column::new("Email", DataType::String, |p: &Page| p.url.clone()));
    pipeline.add_entity(unique_define).unwrap();
    pipeline.add_entity(page_define()).unwrap();

    let err = pipeline.init().unwrap_err();

    match err {
        CqlPipeError::Provisioning(failures) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].entity, "Account");
            assert!(failures[0].error.is_unsupported());
        }
        other => panic!("Expected provisioning error, got {other}"),
    }

    let session = connector.session();
    assert!(!session.has_keyspace("users"));
    assert!(session.executed().iter().all(|cql| !cql.contains("accounts")));
    assert!(session
        .executed()
        .iter()
        .any(|cql| cql.starts_with("CREATE TABLE IF NOT EXISTS crawl.pages")));
}

#[test]
fn test_driver_failure_is_reported_per_entity() {
    let (connector, pipeline) = setup_pipeline();
    pipeline.add_entity(link_define()).unwrap();
    pipeline.add_entity(page_define()).unwrap();
    connector.session().fail_statements_containing("CREATE INDEX");

    let err = pipeline.init().unwrap_err();

    match err {
        CqlPipeError::Provisioning(failures) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].entity, "Link");
            assert!(matches!(failures[0].error, CqlPipeError::Driver(_)));
        }
        other => panic!("Expected provisioning error, got {other}"),
    }
    assert!(connector.session().has_keyspace("crawl"));
}

// =============================================================================
// Session Lifecycle
// =============================================================================

#[test]
fn test_init_reuses_session() {
    let (connector, pipeline) = setup_pipeline();
    pipeline.add_entity(page_define()).unwrap();

    pipeline.init().unwrap();
    pipeline.init().unwrap();

    assert_eq!(connector.connect_count(), 1);
    assert!(pipeline.is_initialized());
}

#[test]
fn test_init_without_entities_touches_nothing() {
    let (connector, pipeline) = setup_pipeline();

    pipeline.init().unwrap();

    assert_eq!(connector.connect_count(), 1);
    assert_eq!(connector.session().event_count(), 0);
}

#[test]
fn test_dispose_releases_session_and_registry() {
    let (connector, pipeline) = setup_page_pipeline();

    pipeline.dispose();

    assert!(!pipeline.is_initialized());
    assert!(pipeline.entity_names().is_empty());

    // The disposed pipeline no longer knows the entity: a write is a no-op
    let written = pipeline
        .process::<Page, _>("Page", Some(vec![Page::new("http://x")]))
        .unwrap();
    assert_eq!(written, 1);
    assert_eq!(connector.session().event_count(), 0);
}

#[test]
fn test_reinit_after_dispose_reconnects() {
    let (connector, pipeline) = setup_page_pipeline();

    pipeline.dispose();
    pipeline.add_entity(page_define()).unwrap();
    pipeline.init().unwrap();

    assert_eq!(connector.connect_count(), 2);
    assert!(pipeline.is_initialized());
}
