//! CQL Module
//!
//! Synthesizes the statements an entity needs from its schema.
//!
//! ## Statement Forms
//! ```text
//! CREATE TABLE IF NOT EXISTS <keyspace>.<table> (<col> <type> , ... , PRIMARY KEY(Id))
//! CREATE INDEX IF NOT EXISTS <group> ON <keyspace>.<table>(<cols>);
//! INSERT INTO <table> (<cols>) VALUES (<placeholders>);
//! ```
//!
//! Inserts use the unqualified table name; the session's active keyspace is
//! switched to the entity's keyspace during provisioning.
//!
//! Update and select statements are never generated for this store.

use crate::config::PipelineMode;
use crate::error::{CqlPipeError, Result};
use crate::pipeline::EntitySchema;
use crate::schema::ID_COLUMN;

/// Cached statement templates of one entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statements {
    pub insert: String,
    /// Always `None`: selective update has no statement on this store
    pub update: Option<String>,
    /// Always `None`: read-back is not implemented
    pub select: Option<String>,
}

/// Build the cached templates for an entity
///
/// Fails for `InsertAndUpdate`, which needs a reconciliation path the store
/// does not offer.
pub fn generate_statements(schema: &EntitySchema) -> Result<Statements> {
    if schema.mode == PipelineMode::InsertAndUpdate {
        return Err(CqlPipeError::unsupported(format!(
            "InsertAndUpdate is not supported for entity {}",
            schema.name
        )));
    }

    let update = match schema.mode {
        PipelineMode::Update => generate_update(schema),
        _ => None,
    };

    Ok(Statements {
        insert: generate_insert(schema),
        update,
        select: generate_select(schema),
    })
}

/// `INSERT INTO <table> (<cols>) VALUES (?, ...);` in column order
pub fn generate_insert(schema: &EntitySchema) -> String {
    let columns = schema
        .columns
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; schema.columns.len()].join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({});",
        schema.table_name, columns, placeholders
    )
}

/// `CREATE TABLE IF NOT EXISTS` with `Id` as the only primary key column
pub fn generate_create_table(schema: &EntitySchema) -> String {
    let columns = schema
        .columns
        .iter()
        .map(|c| format!("{} {} ", c.name, c.data_type.cql_type()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "CREATE TABLE IF NOT EXISTS {}.{} ({}, PRIMARY KEY({}))",
        schema.table.database, schema.table_name, columns, ID_COLUMN
    )
}

/// One `CREATE INDEX IF NOT EXISTS` per declared index group
///
/// Uniqueness groups cannot be enforced by the store; declaring any is an
/// error rather than something to drop silently.
pub fn generate_create_indexes(schema: &EntitySchema) -> Result<Vec<String>> {
    if !schema.table.uniques.is_empty() {
        return Err(CqlPipeError::unsupported(format!(
            "unique constraints are not supported (entity {})",
            schema.name
        )));
    }

    let statements = schema
        .table
        .indexes
        .iter()
        .map(|group| {
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {}.{}({});",
                group.join("_"),
                schema.table.database,
                schema.table_name,
                group.join(", ")
            )
        })
        .collect();

    Ok(statements)
}

fn generate_update(_schema: &EntitySchema) -> Option<String> {
    None
}

fn generate_select(_schema: &EntitySchema) -> Option<String> {
    None
}
