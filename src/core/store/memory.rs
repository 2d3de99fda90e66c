//! In-process snapshot backend
//!
//! Holds the parsed dataset as an `Arc` snapshot behind an `RwLock`.
//! Queries clone the `Arc` and read without holding the lock; `replace_all`
//! builds nothing in place - it publishes a fully constructed dataset with
//! a single pointer swap, so concurrent readers observe either the old or
//! the new dataset, never a mixture. Contents are lost on process exit.

use std::sync::{Arc, RwLock};

use crate::core::dataset::{Dataset, EntityKind};
use crate::core::store::{ReferenceStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    snapshot: RwLock<Arc<Dataset>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<Arc<Dataset>, StoreError> {
        self.snapshot
            .read()
            .map(|guard| Arc::clone(&guard))
            .map_err(|_| StoreError::unavailable("snapshot lock poisoned"))
    }
}

impl ReferenceStore for MemoryStore {
    fn is_loaded(&self) -> Result<bool, StoreError> {
        Ok(!self.read()?.is_empty())
    }

    fn list_years(&self) -> Result<Vec<i32>, StoreError> {
        Ok(self.read()?.years_descending())
    }

    fn make_ids_for_year(&self, year: i32) -> Result<Vec<String>, StoreError> {
        Ok(self
            .read()?
            .year_makes
            .get(&year)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn model_ids_for_year_make(&self, year: i32, make_id: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .read()?
            .year_make_models
            .get(&(year, make_id.to_string()))
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn submodel_ids_for_year_make_model(
        &self,
        year: i32,
        make_id: &str,
        model_id: &str,
    ) -> Result<Vec<String>, StoreError> {
        Ok(self
            .read()?
            .ymm_submodels
            .get(&(year, make_id.to_string(), model_id.to_string()))
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn name_of(&self, kind: EntityKind, id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read()?.names(kind).get(id).cloned())
    }

    fn count_of(&self, kind: EntityKind) -> Result<usize, StoreError> {
        Ok(self.read()?.names(kind).len())
    }

    fn replace_all(&self, dataset: &Dataset) -> Result<(), StoreError> {
        let next = Arc::new(dataset.clone());
        let mut guard = self
            .snapshot
            .write()
            .map_err(|_| StoreError::unavailable("snapshot lock poisoned"))?;
        *guard = next;
        Ok(())
    }

    fn clear(&self) -> Result<u64, StoreError> {
        let mut guard = self
            .snapshot
            .write()
            .map_err(|_| StoreError::unavailable("snapshot lock poisoned"))?;
        let cleared = guard.record_count();
        *guard = Arc::new(Dataset::default());
        Ok(cleared)
    }
}
