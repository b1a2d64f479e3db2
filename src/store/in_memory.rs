use std::sync::{Arc, RwLock};

use super::RecordStore;
use crate::error::{CatalogError, CatalogResult};
use crate::record::Record;

/// In-memory record store for tests and ephemeral runs.
///
/// Clone-friendly via `Arc`: clones share the same collection, so a test can
/// keep a handle while the engine owns another.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    records: Arc<RwLock<Vec<Record>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing collection.
    pub fn with_records(records: Vec<Record>) -> Self {
        InMemoryStore {
            records: Arc::new(RwLock::new(records)),
        }
    }
}

impl RecordStore for InMemoryStore {
    fn load(&self) -> CatalogResult<Vec<Record>> {
        let records = self
            .records
            .read()
            .map_err(|_| CatalogError::storage("in-memory store lock poisoned during load"))?;
        Ok(records.clone())
    }

    fn save(&self, records: &[Record]) -> CatalogResult<()> {
        let mut stored = self
            .records
            .write()
            .map_err(|_| CatalogError::storage("in-memory store lock poisoned during save"))?;
        *stored = records.to_vec();
        Ok(())
    }
}
