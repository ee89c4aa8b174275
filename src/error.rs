//! Error types for cqlpipe
//!
//! Provides a unified error type for all pipeline operations.

use std::fmt;

use thiserror::Error;

/// Result type alias using CqlPipeError
pub type Result<T> = std::result::Result<T, CqlPipeError>;

/// Unified error type for cqlpipe operations
#[derive(Debug, Error)]
pub enum CqlPipeError {
    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Configuration(String),

    // -------------------------------------------------------------------------
    // Capability Errors
    // -------------------------------------------------------------------------
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    // -------------------------------------------------------------------------
    // Value Errors
    // -------------------------------------------------------------------------
    #[error("Cannot coerce column {column}: {message}")]
    Coercion { column: String, message: String },

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    /// Raised by `Session` implementations; never translated by the pipeline
    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Provisioning failed: {}", ProvisionFailures(.0))]
    Provisioning(Vec<ProvisionFailure>),

    #[error("Write channel error: {0}")]
    Channel(String),

    // -------------------------------------------------------------------------
    // Loader Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CqlPipeError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    pub fn coercion(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Coercion {
            column: column.into(),
            message: message.into(),
        }
    }

    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver(message.into())
    }

    /// True for errors that mean "this store cannot do that"
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}

/// One entity that could not be provisioned during `init`
#[derive(Debug)]
pub struct ProvisionFailure {
    /// Registered entity name
    pub entity: String,

    /// What went wrong for that entity
    pub error: CqlPipeError,
}

struct ProvisionFailures<'a>(&'a [ProvisionFailure]);

impl fmt::Display for ProvisionFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{} ({})", failure.entity, failure.error)?;
        }
        Ok(())
    }
}
