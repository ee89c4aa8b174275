//! Entity registry
//!
//! Maps entity names to their adapters. Iteration follows registration
//! order; overwriting a name keeps its original position.

use std::collections::HashMap;
use std::sync::Arc;

use super::RegisteredEntity;

#[derive(Default)]
pub struct Registry {
    entries: Vec<(String, Arc<dyn RegisteredEntity>)>,
    positions: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite; returns the adapter previously registered under
    /// the name
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        adapter: Arc<dyn RegisteredEntity>,
    ) -> Option<Arc<dyn RegisteredEntity>> {
        let name = name.into();
        match self.positions.get(&name) {
            Some(&position) => Some(std::mem::replace(&mut self.entries[position].1, adapter)),
            None => {
                self.positions.insert(name.clone(), self.entries.len());
                self.entries.push((name, adapter));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn RegisteredEntity>> {
        self.positions
            .get(name)
            .map(|&position| Arc::clone(&self.entries[position].1))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Adapters in registration order
    pub fn adapters(&self) -> Vec<Arc<dyn RegisteredEntity>> {
        self.entries
            .iter()
            .map(|(_, adapter)| Arc::clone(adapter))
            .collect()
    }

    /// Names in registration order
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.positions.clear();
    }
}
