//! Cascading query engine
//!
//! Translates a partial Year/Make/Model prefix into the next level's valid
//! values: fetch child ids from the store, deduplicate, resolve display
//! names, drop ids that cannot be name-resolved (dangling references are a
//! data-quality fact, not an error), and sort by name with id as the
//! deterministic tie-break.

use std::collections::HashSet;
use std::sync::Arc;

use crate::core::dataset::{EntityKind, IdName};
use crate::core::error::CatalogError;
use crate::core::store::ReferenceStore;

/// Engine/powertrain options offered alongside the hierarchy
///
/// Catalog-external metadata: a fixed enumeration, independent of the
/// imported dataset.
pub const ENGINE_OPTIONS: &[&str] = &[
    "1.5L I4",
    "2.0L I4",
    "2.0L Turbo I4",
    "2.4L I4",
    "2.5L I4",
    "3.0L V6",
    "3.5L V6",
    "3.6L V6",
    "3.7L V6",
    "4.0L V6",
    "5.0L V8",
    "5.3L V8",
    "5.7L V8",
    "6.0L V8",
    "6.2L V8",
    "6.4L V8",
    "6.7L Diesel",
    "Hybrid",
    "Plug-in Hybrid",
    "Electric",
    "Other",
];

pub struct Resolver {
    store: Arc<dyn ReferenceStore>,
}

impl Resolver {
    pub fn new(store: Arc<dyn ReferenceStore>) -> Self {
        Self { store }
    }

    /// All years, descending
    pub fn list_years(&self) -> Result<Vec<i32>, CatalogError> {
        Ok(self.store.list_years()?)
    }

    /// Makes offered for a year
    pub fn list_makes(&self, year: Option<i32>) -> Result<Vec<IdName>, CatalogError> {
        let year = require(year, "year")?;
        let ids = self.store.make_ids_for_year(year)?;
        self.resolve_children(ids, EntityKind::Make)
    }

    /// Models offered for a year/make
    pub fn list_models(
        &self,
        year: Option<i32>,
        make_id: Option<&str>,
    ) -> Result<Vec<IdName>, CatalogError> {
        let year = require(year, "year")?;
        let make_id = require_key(make_id, "make_id")?;
        let ids = self.store.model_ids_for_year_make(year, make_id)?;
        self.resolve_children(ids, EntityKind::Model)
    }

    /// Submodels/trims offered for a year/make/model
    pub fn list_submodels(
        &self,
        year: Option<i32>,
        make_id: Option<&str>,
        model_id: Option<&str>,
    ) -> Result<Vec<IdName>, CatalogError> {
        let year = require(year, "year")?;
        let make_id = require_key(make_id, "make_id")?;
        let model_id = require_key(model_id, "model_id")?;
        let ids = self
            .store
            .submodel_ids_for_year_make_model(year, make_id, model_id)?;
        self.resolve_children(ids, EntityKind::Submodel)
    }

    pub fn engine_options() -> &'static [&'static str] {
        ENGINE_OPTIONS
    }

    /// Dedup ids, resolve names, drop the unresolvable, sort by name then id
    fn resolve_children(
        &self,
        ids: Vec<String>,
        kind: EntityKind,
    ) -> Result<Vec<IdName>, CatalogError> {
        let mut seen = HashSet::with_capacity(ids.len());
        let mut resolved = Vec::with_capacity(ids.len());

        for id in ids {
            if !seen.insert(id.clone()) {
                continue;
            }
            match self.store.name_of(kind, &id)? {
                Some(name) if !name.is_empty() => resolved.push(IdName { id, name }),
                _ => {}
            }
        }

        resolved.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(resolved)
    }
}

/// Missing numeric key parameter check
fn require(value: Option<i32>, name: &'static str) -> Result<i32, CatalogError> {
    value.ok_or(CatalogError::MissingParameter { name })
}

/// Missing/blank string key parameter check; never forwards a blank key to
/// the store
fn require_key<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, CatalogError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(CatalogError::MissingParameter { name }),
    }
}
