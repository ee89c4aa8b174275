//! Bindable column values

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// A single value bound to an insert placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    Decimal(Decimal),
    Double(f64),
    Float(f32),
    Int(i32),
    BigInt(i64),
    Text(String),
    Uuid(Uuid),
    /// An id the record left for the pipeline to generate
    UnsetId,
}

impl Value {
    /// Value for a time-ordered id field, `None` meaning "generate one"
    pub fn time_uuid(id: Option<Uuid>) -> Self {
        match id {
            Some(id) => Value::Uuid(id),
            None => Value::UnsetId,
        }
    }

    /// True when a time-ordered id column still needs a generated id.
    ///
    /// The nil UUID counts as unset: records built with a zeroed id field
    /// cannot be told apart from records that never set one.
    pub fn is_unset_id(&self) -> bool {
        match self {
            Value::UnsetId => true,
            Value::Uuid(id) => id.is_nil(),
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Value::Uuid(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

/// Fresh time-ordered id (UUIDv7: millisecond timestamp prefix + random tail)
pub fn new_time_uuid() -> Uuid {
    Uuid::now_v7()
}

// =============================================================================
// Conversions
// =============================================================================

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::BigInt(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Uuid(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// CQL literal form, used when printing executed batches
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Timestamp(v) => write!(f, "'{}'", v.to_rfc3339()),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::BigInt(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Value::Uuid(v) => write!(f, "{v}"),
            Value::UnsetId => f.write_str("<unset>"),
        }
    }
}
