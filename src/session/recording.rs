//! Recording session
//!
//! An in-process `Session` that keeps every call in an ordered log instead
//! of talking to a cluster. Used for dry runs (the CLI), tests and benches.
//! It enforces the handful of store rules the pipeline depends on: a
//! keyspace must exist before it can be selected, and unqualified writes
//! need a selected keyspace.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::ConnectionSetting;
use crate::error::{CqlPipeError, Result};

use super::{BatchStatement, Connector, PreparedStatement, Session};

/// One call made against a `RecordingSession`
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    CreateKeyspace(String),
    ChangeKeyspace(String),
    Execute(String),
    Prepare(String),
    Batch(BatchStatement),
}

#[derive(Default)]
struct State {
    events: Vec<SessionEvent>,
    keyspaces: HashSet<String>,
    current_keyspace: Option<String>,
    fail_patterns: Vec<String>,
    fail_batches: bool,
}

/// Session that records instead of executing
#[derive(Default)]
pub struct RecordingSession {
    state: Mutex<State>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, in order
    pub fn events(&self) -> Vec<SessionEvent> {
        self.state.lock().events.clone()
    }

    /// Statements passed to `execute`, in order
    pub fn executed(&self) -> Vec<String> {
        self.state
            .lock()
            .events
            .iter()
            .filter_map(|event| match event {
                SessionEvent::Execute(cql) => Some(cql.clone()),
                _ => None,
            })
            .collect()
    }

    /// Batches passed to `execute_batch`, in order
    pub fn batches(&self) -> Vec<BatchStatement> {
        self.state
            .lock()
            .events
            .iter()
            .filter_map(|event| match event {
                SessionEvent::Batch(batch) => Some(batch.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.state.lock().events.len()
    }

    pub fn current_keyspace(&self) -> Option<String> {
        self.state.lock().current_keyspace.clone()
    }

    pub fn has_keyspace(&self, keyspace: &str) -> bool {
        self.state.lock().keyspaces.contains(keyspace)
    }

    /// Forget the event log (keyspaces stay)
    pub fn clear_events(&self) {
        self.state.lock().events.clear();
    }

    /// Make `execute` fail for statements containing `pattern`
    pub fn fail_statements_containing(&self, pattern: impl Into<String>) {
        self.state.lock().fail_patterns.push(pattern.into());
    }

    /// Make every `execute_batch` fail
    pub fn fail_batches(&self) {
        self.state.lock().fail_batches = true;
    }
}

impl Session for RecordingSession {
    fn create_keyspace_if_not_exists(&self, keyspace: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.events.push(SessionEvent::CreateKeyspace(keyspace.to_string()));
        state.keyspaces.insert(keyspace.to_string());
        Ok(())
    }

    fn change_keyspace(&self, keyspace: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.events.push(SessionEvent::ChangeKeyspace(keyspace.to_string()));

        if !state.keyspaces.contains(keyspace) {
            return Err(CqlPipeError::driver(format!(
                "Keyspace '{keyspace}' does not exist"
            )));
        }
        state.current_keyspace = Some(keyspace.to_string());
        Ok(())
    }

    fn execute(&self, cql: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.events.push(SessionEvent::Execute(cql.to_string()));

        if let Some(pattern) = state.fail_patterns.iter().find(|p| cql.contains(p.as_str())) {
            return Err(CqlPipeError::driver(format!(
                "statement rejected (matched '{pattern}'): {cql}"
            )));
        }
        Ok(())
    }

    fn prepare(&self, cql: &str) -> Result<PreparedStatement> {
        let mut state = self.state.lock();
        state.events.push(SessionEvent::Prepare(cql.to_string()));
        Ok(PreparedStatement::new(cql))
    }

    fn execute_batch(&self, batch: &BatchStatement) -> Result<()> {
        let mut state = self.state.lock();
        state.events.push(SessionEvent::Batch(batch.clone()));

        if state.fail_batches {
            return Err(CqlPipeError::driver("batch rejected by store"));
        }
        if state.current_keyspace.is_none() {
            return Err(CqlPipeError::driver(
                "No keyspace has been specified for unqualified table names",
            ));
        }
        Ok(())
    }
}

/// Connector handing out one shared `RecordingSession`
#[derive(Default)]
pub struct RecordingConnector {
    session: Arc<RecordingSession>,
    connects: AtomicUsize,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The session every `connect` returns
    pub fn session(&self) -> Arc<RecordingSession> {
        Arc::clone(&self.session)
    }

    /// How many times `connect` was called
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl Connector for RecordingConnector {
    fn connect(&self, setting: &ConnectionSetting) -> Result<Arc<dyn Session>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            "Recording session for {:?}:{}",
            setting.contact_points,
            setting.port
        );

        let session: Arc<dyn Session> = self.session.clone();
        Ok(session)
    }
}
