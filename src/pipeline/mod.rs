//! Pipeline Module
//!
//! The entity pipeline: registration, provisioning, batched writes and
//! shutdown for one wide-column store.
//!
//! ## Lifecycle
//! ```text
//!  add_entity ──► init ──► process ──► ... ──► dispose
//!  (derive        (keyspace,   (bind +          (drop session,
//!   adapter +      table,       one batch        clear registry)
//!   statements)    indexes)     per call)
//! ```
//!
//! ## Concurrency Model
//! Every operation takes `&self`.
//! - `registry`: RwLock, read by every `process`, written by registration
//!   and `dispose`
//! - `session`: RwLock around an `Arc<dyn Session>`; writers clone the Arc
//!   and release the lock before touching the store
//! - each `process` call builds its own batch, nothing else is shared

mod adapter;
mod channel;
mod registry;
pub mod schema_manager;
pub mod writer;

pub use adapter::{ColumnSchema, EntityAdapter, EntitySchema, RegisteredEntity};
pub use channel::WriteChannel;
pub use registry::Registry;

use std::borrow::Borrow;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::{self, Config, PipelineMode};
use crate::cql::Statements;
use crate::error::{CqlPipeError, Result};
use crate::schema::{EntityCapability, EntityDefine};
use crate::session::{Connector, Session};

/// Outcome of `add_entity`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// New entity
    Registered,
    /// An adapter with the same name was overwritten
    Replaced,
    /// No table descriptor; the entity will never be persisted here
    Skipped,
}

/// Persists extracted entities into a wide-column store
pub struct EntityPipeline {
    /// Pipeline configuration (connection + write routing)
    config: Config,

    /// Mode for entities without update columns; never `Update`
    default_mode: RwLock<PipelineMode>,

    /// Opens the session on first `init`
    connector: Arc<dyn Connector>,

    /// Shared store session, `None` until `init` and after `dispose`
    session: RwLock<Option<Arc<dyn Session>>>,

    /// Entity name → adapter
    registry: RwLock<Registry>,

    /// Optional serialized execution channel for batches
    channel: Option<WriteChannel>,
}

impl EntityPipeline {
    /// Create a pipeline; nothing is connected until `init`
    pub fn new(config: Config, connector: Arc<dyn Connector>) -> Result<Self> {
        config.validate()?;

        let channel = match &config.write_channel {
            Some(name) => Some(WriteChannel::spawn(name.clone())?),
            None => None,
        };

        Ok(Self {
            default_mode: RwLock::new(config.default_mode),
            config,
            connector,
            session: RwLock::new(None),
            registry: RwLock::new(Registry::new()),
            channel,
        })
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    pub fn default_mode(&self) -> PipelineMode {
        *self.default_mode.read()
    }

    /// Change the default mode for entities registered from now on
    pub fn set_default_mode(&self, mode: PipelineMode) -> Result<()> {
        config::check_default_mode(mode)?;
        *self.default_mode.write() = mode;
        Ok(())
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register an entity definition
    ///
    /// Definitions without a table descriptor are skipped with a warning so
    /// that a set of pipelines for different stores can share definitions.
    pub fn add_entity<T: 'static>(&self, mut define: EntityDefine<T>) -> Result<Registration> {
        if define.capability != EntityCapability::WideColumn {
            return Err(CqlPipeError::configuration(format!(
                "entity {} targets {:?} stores, this pipeline only supports WideColumn entities",
                define.name, define.capability
            )));
        }

        let Some(table) = define.table.take() else {
            tracing::warn!("Schema is necessary, skipping entity {}", define.name);
            return Ok(Registration::Skipped);
        };

        let name = define.name.clone();
        let adapter = EntityAdapter::from_define(define, table, self.default_mode())?;

        tracing::info!(
            "Registered entity {} → {}.{} ({:?}, {} column(s))",
            name,
            adapter.schema().table.database,
            adapter.schema().table_name,
            adapter.schema().mode,
            adapter.schema().columns.len()
        );

        let previous = self.registry.write().insert(name.clone(), Arc::new(adapter));
        match previous {
            Some(_) => {
                tracing::debug!("Entity {} replaced an earlier registration", name);
                Ok(Registration::Replaced)
            }
            None => Ok(Registration::Registered),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Connect (once) and provision every registered entity
    ///
    /// Entities are provisioned in registration order and independently:
    /// one failing entity does not stop the others. All failures come back
    /// together as `CqlPipeError::Provisioning`.
    pub fn init(&self) -> Result<()> {
        let session = self.connect()?;
        let adapters = self.registry.read().adapters();

        tracing::info!("Provisioning {} entities", adapters.len());
        schema_manager::provision_all(session.as_ref(), &adapters)
    }

    /// Release the session and forget every registered entity
    pub fn dispose(&self) {
        let had_session = self.session.write().take().is_some();
        let mut registry = self.registry.write();
        let entities = registry.len();
        registry.clear();

        tracing::info!(
            "Pipeline disposed (session released: {}, {} entities cleared)",
            had_session,
            entities
        );
    }

    fn connect(&self) -> Result<Arc<dyn Session>> {
        let mut guard = self.session.write();
        if let Some(session) = guard.as_ref() {
            return Ok(Arc::clone(session));
        }

        let session = self.connector.connect(&self.config.connection)?;
        tracing::info!(
            "Connected to {:?}:{}",
            self.config.connection.contact_points,
            self.config.connection.port
        );
        *guard = Some(Arc::clone(&session));
        Ok(session)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Write a batch of records for entity `name`
    ///
    /// Returns the number of records submitted, not a store-confirmed row
    /// count. `None` yields 0; a name that was never registered (or was
    /// skipped) yields the record count without touching the store.
    pub fn process<T, I>(&self, name: &str, records: Option<I>) -> Result<usize>
    where
        T: 'static,
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let Some(records) = records else {
            return Ok(0);
        };

        let entry = self.registry.read().get(name);
        let Some(entry) = entry else {
            return Ok(records.into_iter().count());
        };

        let adapter = entry
            .as_any()
            .downcast_ref::<EntityAdapter<T>>()
            .ok_or_else(|| {
                CqlPipeError::configuration(format!(
                    "entity {name} was registered for a different record type than {}",
                    std::any::type_name::<T>()
                ))
            })?;

        match adapter.schema().mode {
            PipelineMode::InsertAndUpdate => Err(CqlPipeError::unsupported(format!(
                "InsertAndUpdate is not supported for entity {name}"
            ))),
            mode @ (PipelineMode::Insert | PipelineMode::Update) => {
                if mode == PipelineMode::Update {
                    tracing::debug!("No update path for {}, writing through insert", name);
                }
                let session = self.session()?;
                writer::write(&session, self.channel.as_ref(), adapter, records)
            }
        }
    }

    fn session(&self) -> Result<Arc<dyn Session>> {
        self.session.read().clone().ok_or_else(|| {
            CqlPipeError::configuration("pipeline has no session; call init before process")
        })
    }

    // =========================================================================
    // Accessors (for tooling and tests)
    // =========================================================================

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.session.read().is_some()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registry.read().contains(name)
    }

    /// Registered names in registration order
    pub fn entity_names(&self) -> Vec<String> {
        self.registry.read().names()
    }

    pub fn schema(&self, name: &str) -> Option<EntitySchema> {
        self.registry.read().get(name).map(|a| a.schema().clone())
    }

    pub fn statements(&self, name: &str) -> Option<Statements> {
        self.registry.read().get(name).map(|a| a.statements().clone())
    }
}
