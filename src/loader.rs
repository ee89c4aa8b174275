//! Definition loader
//!
//! Reads entity definitions and records from JSON, for callers that do not
//! have a Rust type per entity (the CLI, fixtures, ad-hoc imports).
//!
//! ## Definition Format
//! ```text
//! {
//!   "entities": [{
//!     "name": "Page",
//!     "capability": "WideColumn",              (optional)
//!     "table": {                               (optional; skipped if absent)
//!       "database": "crawl", "name": "pages",
//!       "postfix": "None", "indexes": [["Url"]],
//!       "uniques": [], "update_columns": []
//!     },
//!     "columns": [{ "name": "Id", "type": "TimeUuid" }, ...]
//!   }]
//! }
//! ```
//!
//! Records are JSON objects keyed by column name. Each column's accessor
//! coerces the field to the column's kind once per record.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use uuid::Uuid;

use crate::error::{CqlPipeError, Result};
use crate::schema::{Column, DataType, EntityCapability, EntityDefine, TableInfo, Value};

/// A record without a Rust type: a JSON object keyed by column name
pub type JsonRecord = Map<String, Json>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionFile {
    pub entities: Vec<EntityDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDefinition {
    pub name: String,

    #[serde(default)]
    pub capability: EntityCapability,

    #[serde(default)]
    pub table: Option<TableInfo>,

    pub columns: Vec<ColumnDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,

    #[serde(rename = "type")]
    pub data_type: DataType,
}

impl DefinitionFile {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn entity(&self, name: &str) -> Option<&EntityDefinition> {
        self.entities.iter().find(|e| e.name == name)
    }
}

impl EntityDefinition {
    /// Build a definition whose accessors read `JsonRecord` fields
    pub fn to_define(&self) -> EntityDefine<JsonRecord> {
        let mut define = EntityDefine::new(self.name.clone()).capability(self.capability);
        if let Some(table) = &self.table {
            define = define.table(table.clone());
        }

        for column in &self.columns {
            let name = column.name.clone();
            let data_type = column.data_type.clone();
            define = define.column(Column::try_new(
                column.name.clone(),
                column.data_type.clone(),
                move |record: &JsonRecord| coerce(&name, &data_type, record.get(&name)),
            ));
        }

        define
    }
}

/// Parse a JSON array of record objects
pub fn records_from_json(json: &str) -> Result<Vec<JsonRecord>> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_records(path: &Path) -> Result<Vec<JsonRecord>> {
    let json = fs::read_to_string(path)?;
    records_from_json(&json)
}

// =============================================================================
// Coercion
// =============================================================================

/// Convert one JSON field to the value a column of `data_type` binds
///
/// Missing fields and JSON `null` bind as null, except for time-ordered ids
/// where they mean "generate one".
pub fn coerce(column: &str, data_type: &DataType, field: Option<&Json>) -> Result<Value> {
    let field = match field {
        None | Some(Json::Null) if data_type.is_time_uuid() => return Ok(Value::UnsetId),
        None | Some(Json::Null) => return Ok(Value::Null),
        Some(field) => field,
    };
    let mismatch = || {
        CqlPipeError::coercion(column, format!("expected {data_type}, got {field}"))
    };

    let value = match data_type {
        DataType::Boolean => match field {
            Json::Bool(b) => Value::Boolean(*b),
            Json::String(s) => Value::Boolean(s.parse().map_err(|_| mismatch())?),
            _ => return Err(mismatch()),
        },
        DataType::DateTime => match field {
            Json::String(s) => Value::Timestamp(
                DateTime::parse_from_rfc3339(s)
                    .map_err(|e| CqlPipeError::coercion(column, e.to_string()))?
                    .with_timezone(&Utc),
            ),
            Json::Number(n) => {
                let millis = n.as_i64().ok_or_else(mismatch)?;
                Value::Timestamp(DateTime::from_timestamp_millis(millis).ok_or_else(mismatch)?)
            }
            _ => return Err(mismatch()),
        },
        DataType::Decimal => {
            let text = match field {
                Json::String(s) => s.clone(),
                Json::Number(n) => n.to_string(),
                _ => return Err(mismatch()),
            };
            Value::Decimal(
                Decimal::from_str(&text).map_err(|e| CqlPipeError::coercion(column, e.to_string()))?,
            )
        }
        DataType::Double => Value::Double(number(field).ok_or_else(mismatch)?),
        DataType::Float => Value::Float(number(field).ok_or_else(mismatch)? as f32),
        DataType::Int32 => {
            let n = integer(field).ok_or_else(mismatch)?;
            Value::Int(i32::try_from(n).map_err(|_| {
                CqlPipeError::coercion(column, format!("{n} does not fit in Int32"))
            })?)
        }
        DataType::Int64 => Value::BigInt(integer(field).ok_or_else(mismatch)?),
        DataType::TimeUuid => match field {
            Json::String(s) => Value::Uuid(
                Uuid::parse_str(s).map_err(|e| CqlPipeError::coercion(column, e.to_string()))?,
            ),
            _ => return Err(mismatch()),
        },
        DataType::String | DataType::Other(_) => match field {
            Json::String(s) => Value::Text(s.clone()),
            other => Value::Text(other.to_string()),
        },
    };

    Ok(value)
}

fn number(field: &Json) -> Option<f64> {
    match field {
        Json::Number(n) => n.as_f64(),
        Json::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn integer(field: &Json) -> Option<i64> {
    match field {
        Json::Number(n) => n.as_i64(),
        Json::String(s) => s.parse().ok(),
        _ => None,
    }
}
