//! Schema manager
//!
//! Makes sure keyspace, table and indexes of each registered entity exist
//! before anything is written. Existing tables are left as they are: there
//! is no column reconciliation or migration.

use std::sync::Arc;

use crate::cql;
use crate::error::{CqlPipeError, ProvisionFailure, Result};
use crate::session::Session;

use super::RegisteredEntity;

/// Provision one entity
///
/// All statements are generated before the first store call, so an entity
/// whose indexes cannot be expressed never gets a half-built table.
pub fn provision(session: &dyn Session, adapter: &dyn RegisteredEntity) -> Result<()> {
    let schema = adapter.schema();
    let create_table = cql::generate_create_table(schema);
    let create_indexes = cql::generate_create_indexes(schema)?;

    session.create_keyspace_if_not_exists(&schema.table.database)?;
    session.change_keyspace(&schema.table.database)?;
    session.execute(&create_table)?;

    for create_index in &create_indexes {
        session.execute(create_index)?;
    }

    tracing::info!(
        "Provisioned {} as {}.{} ({} index(es))",
        schema.name,
        schema.table.database,
        schema.table_name,
        create_indexes.len()
    );

    Ok(())
}

/// Provision every adapter in order, independently of each other
///
/// Failures are collected and reported together once all adapters have
/// been attempted.
pub fn provision_all(
    session: &dyn Session,
    adapters: &[Arc<dyn RegisteredEntity>],
) -> Result<()> {
    let mut failures = Vec::new();

    for adapter in adapters {
        if let Err(error) = provision(session, adapter.as_ref()) {
            let entity = adapter.schema().name.clone();
            tracing::warn!("Failed to provision {}: {}", entity, error);
            failures.push(ProvisionFailure { entity, error });
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(CqlPipeError::Provisioning(failures))
    }
}
