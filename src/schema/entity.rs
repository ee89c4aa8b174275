//! Entity definitions
//!
//! What the upstream extraction side hands to `add_entity`: a name, the
//! store capability the entity targets, an optional table descriptor and an
//! ordered list of columns with their accessors.

use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::{DataType, Value};

/// Which kind of store an entity definition was written for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityCapability {
    /// Cassandra-style column-family stores
    #[default]
    WideColumn,
    Relational,
    Document,
}

/// How the physical table name is derived from the declared one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableNamePostfix {
    /// Use the declared name as is
    #[default]
    None,
    /// `<name>_yyyy_MM_dd` for the current day
    Today,
    /// `<name>_yyyy_MM_dd` for the Monday of the current week
    Monday,
    /// `<name>_yyyy_MM` for the current month
    Month,
}

/// Table descriptor: keyspace, table and secondary structures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    /// Keyspace the table lives in
    pub database: String,

    /// Declared table name (before postfix)
    pub name: String,

    #[serde(default)]
    pub postfix: TableNamePostfix,

    /// Columns a selective update would touch; forces `PipelineMode::Update`
    #[serde(default)]
    pub update_columns: Vec<String>,

    /// Secondary index column groups
    #[serde(default)]
    pub indexes: Vec<Vec<String>>,

    /// Uniqueness groups (the store has no way to enforce them)
    #[serde(default)]
    pub uniques: Vec<Vec<String>>,
}

impl TableInfo {
    pub fn new(database: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            name: name.into(),
            postfix: TableNamePostfix::None,
            update_columns: Vec::new(),
            indexes: Vec::new(),
            uniques: Vec::new(),
        }
    }

    pub fn postfix(mut self, postfix: TableNamePostfix) -> Self {
        self.postfix = postfix;
        self
    }

    pub fn update_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.update_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Declare one secondary index over the given columns
    pub fn index<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.indexes.push(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Declare one uniqueness group over the given columns
    pub fn unique<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.uniques.push(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Physical table name for today (UTC)
    pub fn calculate_table_name(&self) -> String {
        self.calculate_table_name_at(Utc::now().date_naive())
    }

    /// Physical table name for the given day
    pub fn calculate_table_name_at(&self, today: NaiveDate) -> String {
        match self.postfix {
            TableNamePostfix::None => self.name.clone(),
            TableNamePostfix::Today => format!("{}_{}", self.name, today.format("%Y_%m_%d")),
            TableNamePostfix::Monday => {
                let monday =
                    today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
                format!("{}_{}", self.name, monday.format("%Y_%m_%d"))
            }
            TableNamePostfix::Month => format!("{}_{}", self.name, today.format("%Y_%m")),
        }
    }
}

// =============================================================================
// Columns
// =============================================================================

/// Extracts one column value from a record of type `T`
pub type Accessor<T> = Arc<dyn Fn(&T) -> Result<Value> + Send + Sync>;

/// A declared column: name, semantic kind and the accessor bound to it
pub struct Column<T> {
    name: String,
    data_type: DataType,
    accessor: Accessor<T>,
}

impl<T> Column<T> {
    /// Column whose accessor cannot fail (typed records)
    pub fn new<F, V>(name: impl Into<String>, data_type: DataType, accessor: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self {
            name: name.into(),
            data_type,
            accessor: Arc::new(move |record: &T| -> Result<Value> { Ok(accessor(record).into()) }),
        }
    }

    /// Column whose accessor may reject the record (dynamic records)
    pub fn try_new<F>(name: impl Into<String>, data_type: DataType, accessor: F) -> Self
    where
        F: Fn(&T) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            data_type,
            accessor: Arc::new(accessor),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn accessor(&self) -> &Accessor<T> {
        &self.accessor
    }

    /// Extract this column's value from a record
    pub fn extract(&self, record: &T) -> Result<Value> {
        (self.accessor)(record)
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            data_type: self.data_type.clone(),
            accessor: Arc::clone(&self.accessor),
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("data_type", &self.data_type)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Entity Definition
// =============================================================================

/// Schema definition of one extracted entity with records of type `T`
pub struct EntityDefine<T> {
    pub name: String,
    pub capability: EntityCapability,
    pub table: Option<TableInfo>,
    pub columns: Vec<Column<T>>,
}

impl<T> EntityDefine<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capability: EntityCapability::WideColumn,
            table: None,
            columns: Vec::new(),
        }
    }

    pub fn capability(mut self, capability: EntityCapability) -> Self {
        self.capability = capability;
        self
    }

    pub fn table(mut self, table: TableInfo) -> Self {
        self.table = Some(table);
        self
    }

    /// Append a column; declaration order is binding order
    pub fn column(mut self, column: Column<T>) -> Self {
        self.columns.push(column);
        self
    }
}

impl<T> Clone for EntityDefine<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            capability: self.capability,
            table: self.table.clone(),
            columns: self.columns.clone(),
        }
    }
}

impl<T> fmt::Debug for EntityDefine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDefine")
            .field("name", &self.name)
            .field("capability", &self.capability)
            .field("table", &self.table)
            .field("columns", &self.columns)
            .finish()
    }
}
