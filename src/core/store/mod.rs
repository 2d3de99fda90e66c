//! Reference store contract and backend adapters
//!
//! The catalog is persisted behind a uniform contract with three
//! interchangeable backends, selected once at construction via
//! configuration:
//!
//! - [`MemoryStore`] - in-process dataset snapshot, nothing persisted
//! - [`RelationalStore`] - SQLite tables with indexed cascading lookups
//! - [`KvStore`] - key-value layout over SQLite using the composite-key
//!   convention, children lists denormalized at load time
//!
//! Reads against an unloaded store return empty results; only genuine
//! backend faults surface as [`StoreError`]. Callers distinguish "not
//! loaded" via [`ReferenceStore::is_loaded`], never by empty-result
//! inference.

mod kv;
mod memory;
mod relational;

pub use kv::KvStore;
pub use memory::MemoryStore;
pub use relational::RelationalStore;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::core::dataset::{Dataset, EntityKind};

/// Infrastructure faults below the store contract
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        StoreError::Unavailable(reason.into())
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// Uniform contract over the catalog storage medium
///
/// `clear` returns the backend-native record count removed: table rows for
/// the relational backend, keys for the key-value backend, entities plus
/// association rows for the memory backend.
pub trait ReferenceStore: Send + Sync {
    /// True iff at least one year is present
    fn is_loaded(&self) -> Result<bool, StoreError>;

    /// Distinct years, descending
    fn list_years(&self) -> Result<Vec<i32>, StoreError>;

    fn make_ids_for_year(&self, year: i32) -> Result<Vec<String>, StoreError>;

    fn model_ids_for_year_make(&self, year: i32, make_id: &str) -> Result<Vec<String>, StoreError>;

    fn submodel_ids_for_year_make_model(
        &self,
        year: i32,
        make_id: &str,
        model_id: &str,
    ) -> Result<Vec<String>, StoreError>;

    fn name_of(&self, kind: EntityKind, id: &str) -> Result<Option<String>, StoreError>;

    /// Count of entities of the given kind (diagnostics)
    fn count_of(&self, kind: EntityKind) -> Result<usize, StoreError>;

    /// Atomic full replace: no concurrent reader observes a partially
    /// replaced dataset
    fn replace_all(&self, dataset: &Dataset) -> Result<(), StoreError>;

    /// Remove all data; returns the number of removed records
    fn clear(&self) -> Result<u64, StoreError>;
}

/// Backend strategy selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process snapshot, lost on process exit
    Memory,
    /// SQLite junction tables with indexed lookups
    #[default]
    Relational,
    /// Composite-keyed JSON values over SQLite
    Kv,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Memory => "memory",
            BackendKind::Relational => "relational",
            BackendKind::Kv => "kv",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(BackendKind::Memory),
            "relational" | "sqlite" => Ok(BackendKind::Relational),
            "kv" | "keyvalue" => Ok(BackendKind::Kv),
            _ => Err(format!("unknown backend: {} (valid: memory, relational, kv)", s)),
        }
    }
}

/// Construct the configured backend
///
/// `db_path` is required for the SQLite-backed kinds; an unreachable
/// database path is the one fault that legitimately halts startup.
pub fn open_store(
    kind: BackendKind,
    db_path: Option<&Path>,
) -> Result<Arc<dyn ReferenceStore>, StoreError> {
    match kind {
        BackendKind::Memory => Ok(Arc::new(MemoryStore::new())),
        BackendKind::Relational => {
            let path = db_path
                .ok_or_else(|| StoreError::unavailable("relational backend requires a database path"))?;
            Ok(Arc::new(RelationalStore::open(path)?))
        }
        BackendKind::Kv => {
            let path = db_path
                .ok_or_else(|| StoreError::unavailable("kv backend requires a database path"))?;
            Ok(Arc::new(KvStore::open(path)?))
        }
    }
}
