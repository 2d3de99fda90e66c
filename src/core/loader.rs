//! Catalog import pipeline
//!
//! Locates and parses an import document, then publishes it to the
//! reference store as one atomic replacement. Imports are all-or-nothing:
//! a missing source or a failed parse leaves the existing dataset intact.
//! Repeated imports of an unchanged source are idempotent; imports of a
//! changed source leave no residue of the old dataset.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::core::document;
use crate::core::error::CatalogError;
use crate::core::store::ReferenceStore;

/// Per-entity counts from a completed import
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportCounts {
    pub years: usize,
    pub makes: usize,
    pub models: usize,
    pub submodels: usize,
    pub year_makes: usize,
    pub year_make_models: usize,
    pub ymm_submodels: usize,
}

/// Result of a successful import
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub source: PathBuf,
    pub counts: ImportCounts,
    /// Association rows dropped for referencing an unknown entity id
    pub pruned_associations: usize,
    /// Association keys skipped for violating the composite-key convention
    pub skipped_keys: usize,
    /// SHA-256 of the source document
    pub digest: String,
    pub imported_at: DateTime<Utc>,
}

/// Loads catalog documents into a reference store
pub struct CatalogLoader {
    store: Arc<dyn ReferenceStore>,
    last_import: Mutex<Option<ImportReport>>,
}

impl CatalogLoader {
    pub fn new(store: Arc<dyn ReferenceStore>) -> Self {
        Self {
            store,
            last_import: Mutex::new(None),
        }
    }

    /// Import a catalog document, replacing the store's contents
    pub fn import_from(&self, path: &Path) -> Result<ImportReport, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::SourceNotFound {
                path: path.to_path_buf(),
            });
        }

        let text = fs::read_to_string(path)
            .map_err(|e| CatalogError::malformed(format!("{}: {}", path.display(), e)))?;

        let mut decoded = document::decode(&text)?;
        let pruned = decoded.dataset.prune_dangling();

        self.store.replace_all(&decoded.dataset)?;

        let ds = &decoded.dataset;
        let report = ImportReport {
            source: path.to_path_buf(),
            counts: ImportCounts {
                years: ds.years.len(),
                makes: ds.makes.len(),
                models: ds.models.len(),
                submodels: ds.submodels.len(),
                year_makes: ds.year_makes.values().map(|s| s.len()).sum(),
                year_make_models: ds.year_make_models.values().map(|s| s.len()).sum(),
                ymm_submodels: ds.ymm_submodels.values().map(|s| s.len()).sum(),
            },
            pruned_associations: pruned,
            skipped_keys: decoded.skipped_keys,
            digest: digest_hex(&text),
            imported_at: Utc::now(),
        };

        if let Ok(mut last) = self.last_import.lock() {
            *last = Some(report.clone());
        }

        Ok(report)
    }

    /// Remove all catalog data unconditionally
    pub fn clear_all(&self) -> Result<u64, CatalogError> {
        Ok(self.store.clear()?)
    }

    /// Re-import from the last known source
    ///
    /// Parse-then-replace: a failing reload leaves the prior dataset
    /// intact, a successful one is a residue-free full replacement.
    pub fn reload(&self) -> Result<ImportReport, CatalogError> {
        let source = self
            .last_import
            .lock()
            .ok()
            .and_then(|last| last.as_ref().map(|r| r.source.clone()))
            .ok_or_else(|| CatalogError::SourceNotFound {
                path: PathBuf::from("<no previous import>"),
            })?;
        self.import_from(&source)
    }

    /// The most recent successful import in this process, if any
    pub fn last_import(&self) -> Option<ImportReport> {
        self.last_import.lock().ok().and_then(|last| last.clone())
    }
}

/// SHA-256 hex digest of document text
fn digest_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
