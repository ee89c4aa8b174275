//! Entity adapters
//!
//! The per-entity bundle the pipeline works with after registration:
//! store-facing metadata (`EntitySchema`), cached statements, and the
//! accessors that pull values out of records of the registered type.

use std::any::Any;
use std::collections::HashSet;

use crate::config::PipelineMode;
use crate::cql::{self, Statements};
use crate::error::{CqlPipeError, Result};
use crate::schema::{Accessor, DataType, EntityDefine, TableInfo, ID_COLUMN};

/// Column metadata without the accessor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: DataType,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Store-facing description of a registered entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySchema {
    pub name: String,
    pub mode: PipelineMode,
    pub table: TableInfo,
    /// Physical table name, postfix applied at registration
    pub table_name: String,
    /// Fixed binding order
    pub columns: Vec<ColumnSchema>,
}

/// A registered entity with records of type `T`
pub struct EntityAdapter<T> {
    schema: EntitySchema,
    statements: Statements,
    accessors: Vec<Accessor<T>>,
}

impl<T> EntityAdapter<T> {
    /// Validate a definition and derive its adapter
    ///
    /// `default_mode` applies unless the table declares update columns, in
    /// which case the entity is an `Update` entity.
    pub fn from_define(
        define: EntityDefine<T>,
        table: TableInfo,
        default_mode: PipelineMode,
    ) -> Result<Self> {
        let mode = if table.update_columns.is_empty() {
            default_mode
        } else {
            PipelineMode::Update
        };

        let table_name = table.calculate_table_name();
        let (columns, accessors): (Vec<_>, Vec<_>) = define
            .columns
            .into_iter()
            .map(|c| {
                let accessor = c.accessor().clone();
                (ColumnSchema::new(c.name(), c.data_type().clone()), accessor)
            })
            .unzip();

        let schema = EntitySchema {
            name: define.name,
            mode,
            table,
            table_name,
            columns,
        };
        validate(&schema)?;

        let statements = cql::generate_statements(&schema)?;

        Ok(Self {
            schema,
            statements,
            accessors,
        })
    }

    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    pub fn statements(&self) -> &Statements {
        &self.statements
    }

    pub fn accessors(&self) -> &[Accessor<T>] {
        &self.accessors
    }

    #[cfg(test)]
    pub(crate) fn set_mode(&mut self, mode: PipelineMode) {
        self.schema.mode = mode;
    }
}

/// Type-erased view the registry stores
pub trait RegisteredEntity: Send + Sync {
    fn schema(&self) -> &EntitySchema;
    fn statements(&self) -> &Statements;
    fn as_any(&self) -> &dyn Any;
}

impl<T: 'static> RegisteredEntity for EntityAdapter<T> {
    fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    fn statements(&self) -> &Statements {
        &self.statements
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// Validation
// =============================================================================

fn validate(schema: &EntitySchema) -> Result<()> {
    let entity = &schema.name;

    if schema.columns.is_empty() {
        return Err(CqlPipeError::configuration(format!(
            "entity {entity} declares no columns"
        )));
    }

    check_identifier(entity, "keyspace", &schema.table.database)?;
    check_identifier(entity, "table", &schema.table_name)?;

    let mut seen = HashSet::new();
    // The store folds unquoted identifiers to lower case
    let mut folded = HashSet::new();
    for column in &schema.columns {
        check_identifier(entity, "column", &column.name)?;
        seen.insert(column.name.as_str());
        if !folded.insert(column.name.to_ascii_lowercase()) {
            return Err(CqlPipeError::configuration(format!(
                "entity {entity} declares column {} twice",
                column.name
            )));
        }
    }

    if !seen.contains(ID_COLUMN) {
        return Err(CqlPipeError::configuration(format!(
            "entity {entity} must declare an {ID_COLUMN} column"
        )));
    }

    let referenced = schema
        .table
        .indexes
        .iter()
        .flatten()
        .chain(&schema.table.update_columns);
    for name in referenced {
        if !seen.contains(name.as_str()) {
            return Err(CqlPipeError::configuration(format!(
                "entity {entity} references unknown column {name}"
            )));
        }
    }

    if schema.table.indexes.iter().any(Vec::is_empty) {
        return Err(CqlPipeError::configuration(format!(
            "entity {entity} declares an index without columns"
        )));
    }

    Ok(())
}

/// Identifiers are spliced into statements unquoted
fn check_identifier(entity: &str, kind: &str, name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid {
        return Err(CqlPipeError::configuration(format!(
            "entity {entity} has invalid {kind} name '{name}'"
        )));
    }
    Ok(())
}
