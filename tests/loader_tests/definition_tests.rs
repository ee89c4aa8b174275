//! Tests for JSON entity definitions

use std::fs;
use std::sync::Arc;

use cqlpipe::loader::{load_records, DefinitionFile, JsonRecord};
use cqlpipe::session::RecordingConnector;
use cqlpipe::{
    Config, CqlPipeError, DataType, EntityCapability, EntityPipeline, Registration,
    TableNamePostfix, Value,
};
use rust_decimal::Decimal;
use tempfile::TempDir;
use uuid::Uuid;

const DEFINITIONS: &str = r#"{
    "entities": [
        {
            "name": "Product",
            "table": {
                "database": "shop",
                "name": "products",
                "indexes": [["Sku"]]
            },
            "columns": [
                { "name": "Id", "type": "TimeUuid" },
                { "name": "Sku", "type": "String" },
                { "name": "Price", "type": "Decimal" },
                { "name": "Stock", "type": "Int32" },
                { "name": "Listed", "type": "DateTime" },
                { "name": "Tags", "type": "List" }
            ]
        },
        {
            "name": "Draft",
            "columns": [{ "name": "Id", "type": "TimeUuid" }]
        }
    ]
}"#;

const RECORDS: &str = r#"[
    { "Sku": "A-1", "Price": "19.99", "Stock": 4, "Listed": "2024-03-14T10:00:00Z", "Tags": ["new"] },
    { "Id": "0191e0b0-7c55-7a8e-8d4b-3f1a2b3c4d5e", "Sku": "B-2", "Price": 5 }
]"#;

// =============================================================================
// Helper Functions
// =============================================================================

fn write_fixture(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn setup() -> (TempDir, Arc<RecordingConnector>, EntityPipeline, DefinitionFile) {
    let temp_dir = TempDir::new().unwrap();
    let path = write_fixture(&temp_dir, "entities.json", DEFINITIONS);
    let definitions = DefinitionFile::load(&path).unwrap();

    let connector = Arc::new(RecordingConnector::new());
    let pipeline = EntityPipeline::new(Config::default(), connector.clone()).unwrap();
    (temp_dir, connector, pipeline, definitions)
}

// =============================================================================
// Definitions
// =============================================================================

#[test]
fn test_load_definitions() {
    let (_dir, _connector, _pipeline, definitions) = setup();

    assert_eq!(definitions.entities.len(), 2);

    let product = definitions.entity("Product").unwrap();
    assert_eq!(product.capability, EntityCapability::WideColumn);
    let table = product.table.as_ref().unwrap();
    assert_eq!(table.postfix, TableNamePostfix::None);
    assert_eq!(table.indexes, vec![vec!["Sku".to_string()]]);
    assert_eq!(product.columns[5].data_type, DataType::Other("List".into()));

    assert!(definitions.entity("Draft").unwrap().table.is_none());
    assert!(definitions.entity("Missing").is_none());
}

#[test]
fn test_malformed_definitions_rejected() {
    let result = DefinitionFile::from_json(r#"{ "entities": [{ "name": "X" }] }"#);

    assert!(matches!(result, Err(CqlPipeError::Json(_))));
}

#[test]
fn test_missing_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();

    let result = DefinitionFile::load(&temp_dir.path().join("absent.json"));

    assert!(matches!(result, Err(CqlPipeError::Io(_))));
}

#[test]
fn test_register_loaded_definitions() {
    let (_dir, connector, pipeline, definitions) = setup();

    let outcomes: Vec<_> = definitions
        .entities
        .iter()
        .map(|d| pipeline.add_entity(d.to_define()).unwrap())
        .collect();
    pipeline.init().unwrap();

    assert_eq!(outcomes, vec![Registration::Registered, Registration::Skipped]);
    assert_eq!(
        connector.session().executed(),
        vec![
            "CREATE TABLE IF NOT EXISTS shop.products (Id uuid , Sku text , Price decimal , \
             Stock int , Listed timestamp , Tags text , PRIMARY KEY(Id))",
            "CREATE INDEX IF NOT EXISTS Sku ON shop.products(Sku);",
        ]
    );
}

// =============================================================================
// Records
// =============================================================================

#[test]
fn test_load_and_write_records() {
    let (dir, connector, pipeline, definitions) = setup();
    let product = definitions.entity("Product").unwrap();
    pipeline.add_entity(product.to_define()).unwrap();
    pipeline.init().unwrap();

    let records = load_records(&write_fixture(&dir, "records.json", RECORDS)).unwrap();
    let written = pipeline
        .process::<JsonRecord, _>("Product", Some(&records))
        .unwrap();

    assert_eq!(written, 2);

    let batches = connector.session().batches();
    assert_eq!(batches.len(), 1);
    let first = batches[0].statements()[0].values();
    let second = batches[0].statements()[1].values();

    assert!(matches!(first[0], Value::Uuid(id) if !id.is_nil()));
    assert_eq!(first[1], Value::Text("A-1".into()));
    assert_eq!(first[2], Value::Decimal(Decimal::new(1999, 2)));
    assert_eq!(first[3], Value::Int(4));
    assert!(matches!(first[4], Value::Timestamp(_)));
    assert_eq!(first[5], Value::Text("[\"new\"]".into()));

    let supplied = Uuid::parse_str("0191e0b0-7c55-7a8e-8d4b-3f1a2b3c4d5e").unwrap();
    assert_eq!(second[0], Value::Uuid(supplied));
    assert_eq!(second[2], Value::Decimal(Decimal::from(5)));
    assert_eq!(second[3], Value::Null);
    assert_eq!(second[4], Value::Null);
}

#[test]
fn test_records_for_skipped_entity_are_counted() {
    let (dir, connector, pipeline, definitions) = setup();
    for definition in &definitions.entities {
        pipeline.add_entity(definition.to_define()).unwrap();
    }
    pipeline.init().unwrap();
    connector.session().clear_events();

    let records = load_records(&write_fixture(&dir, "drafts.json", r#"[{}, {}, {}]"#)).unwrap();
    let written = pipeline.process::<JsonRecord, _>("Draft", Some(records)).unwrap();

    assert_eq!(written, 3);
    assert_eq!(connector.session().event_count(), 0);
}

#[test]
fn test_bad_field_aborts_batch() {
    let (_dir, connector, pipeline, definitions) = setup();
    pipeline
        .add_entity(definitions.entity("Product").unwrap().to_define())
        .unwrap();
    pipeline.init().unwrap();

    let records = cqlpipe::loader::records_from_json(
        r#"[{ "Sku": "A-1" }, { "Sku": "B-2", "Listed": "yesterday" }]"#,
    )
    .unwrap();
    let err = pipeline
        .process::<JsonRecord, _>("Product", Some(&records))
        .unwrap_err();

    match err {
        CqlPipeError::Coercion { column, .. } => assert_eq!(column, "Listed"),
        other => panic!("Expected coercion error, got {other}"),
    }
    assert!(connector.session().batches().is_empty());
}
