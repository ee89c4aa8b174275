//! Schema Module
//!
//! Everything that describes an entity before it reaches the store.
//!
//! ## Responsibilities
//! - Semantic column kinds and their CQL types (the type mapper)
//! - The bindable value model, including the explicit unset-id marker
//! - Entity definitions: columns with accessors, table descriptors
//!
//! ## Type Mapping
//! ```text
//! Boolean  → boolean      Int32    → int
//! DateTime → timestamp    Int64    → bigint
//! Decimal  → decimal      String   → text
//! Double   → double       TimeUuid → uuid
//! Float    → float        (other)  → text
//! ```

mod entity;
mod types;
mod value;

pub use entity::{Accessor, Column, EntityCapability, EntityDefine, TableInfo, TableNamePostfix};
pub use types::DataType;
pub use value::{new_time_uuid, Value};

/// Name of the mandatory primary key column
pub const ID_COLUMN: &str = "Id";
