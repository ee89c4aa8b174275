//! Semantic column kinds and their CQL types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic kind of a column, independent of any store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataType {
    Boolean,
    DateTime,
    Decimal,
    Double,
    Float,
    Int32,
    Int64,
    String,
    /// Time-ordered unique identifier; generated on write when unset
    TimeUuid,
    /// Any kind the store has no dedicated type for
    Other(String),
}

impl DataType {
    /// Physical CQL type for this kind; unrecognized kinds map to `text`
    pub fn cql_type(&self) -> &'static str {
        match self {
            DataType::Boolean => "boolean",
            DataType::DateTime => "timestamp",
            DataType::Decimal => "decimal",
            DataType::Double => "double",
            DataType::Float => "float",
            DataType::Int32 => "int",
            DataType::Int64 => "bigint",
            DataType::String => "text",
            DataType::TimeUuid => "uuid",
            DataType::Other(_) => "text",
        }
    }

    /// Resolve a kind from its name (case-insensitive)
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "boolean" | "bool" => DataType::Boolean,
            "datetime" => DataType::DateTime,
            "decimal" => DataType::Decimal,
            "double" => DataType::Double,
            "float" | "single" => DataType::Float,
            "int32" | "int" => DataType::Int32,
            "int64" | "long" => DataType::Int64,
            "string" => DataType::String,
            "timeuuid" => DataType::TimeUuid,
            _ => DataType::Other(name.to_string()),
        }
    }

    /// Canonical name, the inverse of `from_name` for recognized kinds
    pub fn name(&self) -> &str {
        match self {
            DataType::Boolean => "Boolean",
            DataType::DateTime => "DateTime",
            DataType::Decimal => "Decimal",
            DataType::Double => "Double",
            DataType::Float => "Float",
            DataType::Int32 => "Int32",
            DataType::Int64 => "Int64",
            DataType::String => "String",
            DataType::TimeUuid => "TimeUuid",
            DataType::Other(name) => name,
        }
    }

    pub fn is_time_uuid(&self) -> bool {
        matches!(self, DataType::TimeUuid)
    }
}

impl From<String> for DataType {
    fn from(name: String) -> Self {
        DataType::from_name(&name)
    }
}

impl From<DataType> for String {
    fn from(data_type: DataType) -> Self {
        data_type.name().to_string()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
