use std::sync::RwLock;

use super::error::StoreError;
use super::store::{select_window, ObservationStore, Observations, WindowQuery};
use super::types::Observation;

/// In-process store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<Observation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObservationStore for MemoryStore {
    fn append(&self, observation: &Observation) -> Result<(), StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|e| StoreError::write(&observation.aircraft_id, e))?;
        rows.push(observation.clone());
        Ok(())
    }

    fn query_window(&self, query: &WindowQuery) -> Result<Observations, StoreError> {
        let rows = self.rows.read().map_err(StoreError::query)?;
        Ok(select_window(rows.iter().cloned(), query))
    }
}
