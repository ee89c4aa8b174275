//! # cqlpipe
//!
//! Persists extracted entities into a wide-column (Cassandra-style) store:
//! - Schema provisioning (keyspace, table, secondary indexes)
//! - CQL statement synthesis from entity definitions
//! - Positional binding with time-ordered id generation
//! - One atomic batch per write call
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Upstream extraction                         │
//! │          (EntityDefine<T> + batches of records)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   EntityPipeline                             │
//! │     add_entity → init → process … → dispose                 │
//! └──────┬──────────────────────┬───────────────────────┬───────┘
//!        │                      │                       │
//!        ▼                      ▼                       ▼
//!  ┌───────────┐        ┌──────────────┐        ┌──────────────┐
//!  │ Registry  │        │Schema Manager│        │ Batch Writer │
//!  │ (adapters │        │ (DDL via     │        │ (bind, ids,  │
//!  │ +  CQL)   │        │  cql module) │        │  one batch)  │
//!  └───────────┘        └──────┬───────┘        └──────┬───────┘
//!                              │                       │
//!                              ▼                       ▼
//!                       ┌──────────────────────────────────┐
//!                       │       Session (driver seam)      │
//!                       └──────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod schema;
pub mod cql;
pub mod session;
pub mod pipeline;
pub mod loader;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CqlPipeError, Result};
pub use config::{Config, ConnectionSetting, PipelineMode};
pub use pipeline::{EntityPipeline, Registration};
pub use schema::{Column, DataType, EntityCapability, EntityDefine, TableInfo, TableNamePostfix, Value};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of cqlpipe
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
