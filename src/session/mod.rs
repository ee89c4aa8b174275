//! Session Module
//!
//! The seam between the pipeline and a column-store driver.
//!
//! ## Responsibilities
//! - `Connector`: turns a `ConnectionSetting` into a live session
//! - `Session`: keyspace management, plain statements, prepare, batches
//! - Statement values handed across the seam (prepared, bound, batch)
//!
//! ## Concurrency Contract
//! A session is shared as `Arc<dyn Session>` by every write call, so
//! implementations must be `Send + Sync` and safe to call concurrently.
//! Reconnection and retry live behind this trait, never in the pipeline.

mod recording;

pub use recording::{RecordingConnector, RecordingSession, SessionEvent};

use std::sync::Arc;

use crate::config::ConnectionSetting;
use crate::error::{CqlPipeError, Result};
use crate::schema::Value;

/// An open connection to a wide-column store
pub trait Session: Send + Sync {
    /// `CREATE KEYSPACE IF NOT EXISTS` with the driver's default replication
    fn create_keyspace_if_not_exists(&self, keyspace: &str) -> Result<()>;

    /// Make `keyspace` the default for unqualified table names
    fn change_keyspace(&self, keyspace: &str) -> Result<()>;

    /// Execute a statement without bound values
    fn execute(&self, cql: &str) -> Result<()>;

    /// Prepare a statement with positional `?` placeholders
    fn prepare(&self, cql: &str) -> Result<PreparedStatement>;

    /// Execute all entries as one atomic (logged) batch
    fn execute_batch(&self, batch: &BatchStatement) -> Result<()>;
}

/// Opens sessions; the pipeline calls it at most once per `init`
pub trait Connector: Send + Sync {
    fn connect(&self, setting: &ConnectionSetting) -> Result<Arc<dyn Session>>;
}

// =============================================================================
// Statements
// =============================================================================

/// A statement the store has prepared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedStatement {
    cql: Arc<str>,
    placeholders: usize,
}

impl PreparedStatement {
    pub fn new(cql: impl Into<Arc<str>>) -> Self {
        let cql = cql.into();
        let placeholders = cql.matches('?').count();
        Self { cql, placeholders }
    }

    pub fn cql(&self) -> &str {
        &self.cql
    }

    /// Number of positional placeholders
    pub fn placeholders(&self) -> usize {
        self.placeholders
    }

    /// Bind values positionally
    pub fn bind(&self, values: Vec<Value>) -> Result<BoundStatement> {
        if values.len() != self.placeholders {
            return Err(CqlPipeError::driver(format!(
                "statement expects {} values, got {}: {}",
                self.placeholders,
                values.len(),
                self.cql
            )));
        }

        Ok(BoundStatement {
            cql: Arc::clone(&self.cql),
            values,
        })
    }
}

/// A prepared statement with its values
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    cql: Arc<str>,
    values: Vec<Value>,
}

impl BoundStatement {
    pub fn cql(&self) -> &str {
        &self.cql
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// Bound statements submitted together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchStatement {
    statements: Vec<BoundStatement>,
}

impl BatchStatement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            statements: Vec::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, statement: BoundStatement) {
        self.statements.push(statement);
    }

    pub fn statements(&self) -> &[BoundStatement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
