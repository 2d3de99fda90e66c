//! Lookup service façade
//!
//! The single boundary the surrounding application touches. Wraps the
//! resolver with store-readiness checks and converts every fault into a
//! reason-coded, well-formed response: callers can always tell "catalog not
//! yet imported" from "this combination has no entries" from "storage is
//! down". No storage-layer error type crosses this boundary.

use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::core::error::{CatalogError, ErrorBody};
use crate::core::loader::{CatalogLoader, ImportCounts, ImportReport};
use crate::core::resolver::Resolver;
use crate::core::store::{BackendKind, ReferenceStore};
use crate::core::dataset::{EntityKind, IdName};

#[derive(Debug, Serialize)]
pub struct YearsResponse {
    pub years: Vec<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct MakesResponse {
    pub makes: Vec<IdName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<IdName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct TrimsResponse {
    pub trims: Vec<IdName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct EnginesResponse {
    pub engines: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub loaded: bool,
    pub backend: BackendKind,
    pub years_count: usize,
    pub makes_count: usize,
    pub models_count: usize,
    pub submodels_count: usize,
    /// Newest years, for a quick sanity glance
    pub sample_years: Vec<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_import: Option<ImportReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct LoadResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<ImportCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub success: bool,
    pub cleared: u64,
}

/// The external-facing lookup contract
pub struct LookupService {
    store: Arc<dyn ReferenceStore>,
    resolver: Resolver,
    loader: CatalogLoader,
    backend: BackendKind,
}

impl LookupService {
    pub fn new(store: Arc<dyn ReferenceStore>, backend: BackendKind) -> Self {
        Self {
            resolver: Resolver::new(Arc::clone(&store)),
            loader: CatalogLoader::new(Arc::clone(&store)),
            store,
            backend,
        }
    }

    pub fn loader(&self) -> &CatalogLoader {
        &self.loader
    }

    pub fn years(&self) -> YearsResponse {
        match self.ready().and_then(|_| self.resolver.list_years()) {
            Ok(years) => YearsResponse { years, error: None },
            Err(err) => YearsResponse {
                years: Vec::new(),
                error: ErrorBody::from_error(&err),
            },
        }
    }

    pub fn makes(&self, year: Option<i32>) -> MakesResponse {
        match self.ready().and_then(|_| self.resolver.list_makes(year)) {
            Ok(makes) => MakesResponse { makes, error: None },
            Err(err) => MakesResponse {
                makes: Vec::new(),
                error: ErrorBody::from_error(&err),
            },
        }
    }

    pub fn models(&self, year: Option<i32>, make_id: Option<&str>) -> ModelsResponse {
        match self
            .ready()
            .and_then(|_| self.resolver.list_models(year, make_id))
        {
            Ok(models) => ModelsResponse {
                models,
                error: None,
            },
            Err(err) => ModelsResponse {
                models: Vec::new(),
                error: ErrorBody::from_error(&err),
            },
        }
    }

    pub fn trims(
        &self,
        year: Option<i32>,
        make_id: Option<&str>,
        model_id: Option<&str>,
    ) -> TrimsResponse {
        match self
            .ready()
            .and_then(|_| self.resolver.list_submodels(year, make_id, model_id))
        {
            Ok(trims) => TrimsResponse { trims, error: None },
            Err(err) => TrimsResponse {
                trims: Vec::new(),
                error: ErrorBody::from_error(&err),
            },
        }
    }

    pub fn engines(&self) -> EnginesResponse {
        EnginesResponse {
            engines: Resolver::engine_options().to_vec(),
        }
    }

    /// Diagnostic snapshot
    pub fn status(&self) -> StatusResponse {
        let snapshot = || -> Result<StatusResponse, CatalogError> {
            let years = self.store.list_years()?;
            Ok(StatusResponse {
                loaded: self.store.is_loaded()?,
                backend: self.backend,
                years_count: years.len(),
                makes_count: self.store.count_of(EntityKind::Make)?,
                models_count: self.store.count_of(EntityKind::Model)?,
                submodels_count: self.store.count_of(EntityKind::Submodel)?,
                sample_years: years.into_iter().take(5).collect(),
                last_import: self.loader.last_import(),
                error: None,
            })
        };

        snapshot().unwrap_or_else(|err| StatusResponse {
            loaded: false,
            backend: self.backend,
            years_count: 0,
            makes_count: 0,
            models_count: 0,
            submodels_count: 0,
            sample_years: Vec::new(),
            last_import: None,
            error: ErrorBody::from_error(&err),
        })
    }

    /// Import a catalog document (administrative)
    pub fn load(&self, path: &Path) -> LoadResponse {
        match self.loader.import_from(path) {
            Ok(report) => LoadResponse {
                success: true,
                counts: Some(report.counts),
                error: None,
            },
            Err(err) => LoadResponse {
                success: false,
                counts: None,
                error: Some(err.to_string()),
            },
        }
    }

    /// Remove all catalog data (administrative)
    pub fn clear(&self) -> ClearResponse {
        match self.loader.clear_all() {
            Ok(cleared) => ClearResponse {
                success: true,
                cleared,
            },
            Err(_) => ClearResponse {
                success: false,
                cleared: 0,
            },
        }
    }

    /// Re-import from the last known source (administrative)
    pub fn reload(&self) -> LoadResponse {
        match self.loader.reload() {
            Ok(report) => LoadResponse {
                success: true,
                counts: Some(report.counts),
                error: None,
            },
            Err(err) => LoadResponse {
                success: false,
                counts: None,
                error: Some(err.to_string()),
            },
        }
    }

    /// Not-loaded is reported as a distinct condition, never inferred from
    /// an empty result
    fn ready(&self) -> Result<(), CatalogError> {
        if self.store.is_loaded()? {
            Ok(())
        } else {
            Err(CatalogError::StoreNotLoaded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ReasonCode;
    use crate::core::store::MemoryStore;
    use std::fs;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"{
        "years": [2020],
        "makes": {"ford": "Ford"},
        "models": {"f150": "F-150"},
        "submodels": {"xlt": "XLT"},
        "year_makes": {"2020": ["ford"]},
        "year_make_models": {"2020_ford": ["f150"]},
        "ymm_submodels": {"2020_ford_f150": ["xlt"]}
    }"#;

    fn service() -> LookupService {
        LookupService::new(Arc::new(MemoryStore::new()), BackendKind::Memory)
    }

    fn loaded_service() -> LookupService {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("vcdb.json");
        fs::write(&path, SAMPLE).unwrap();
        let svc = service();
        assert!(svc.load(&path).success);
        svc
    }

    #[test]
    fn test_unloaded_queries_report_not_loaded() {
        let svc = service();
        let resp = svc.makes(Some(2020));
        assert!(resp.makes.is_empty());
        assert_eq!(resp.error.unwrap().code, ReasonCode::NotLoaded);

        let resp = svc.years();
        assert!(resp.years.is_empty());
        assert_eq!(resp.error.unwrap().code, ReasonCode::NotLoaded);
    }

    #[test]
    fn test_loaded_cascade_end_to_end() {
        let svc = loaded_service();

        let years = svc.years();
        assert_eq!(years.years, vec![2020]);
        assert!(years.error.is_none());

        let makes = svc.makes(Some(2020));
        assert_eq!(makes.makes, vec![IdName::new("ford", "Ford")]);

        let models = svc.models(Some(2020), Some("ford"));
        assert_eq!(models.models, vec![IdName::new("f150", "F-150")]);

        let trims = svc.trims(Some(2020), Some("ford"), Some("f150"));
        assert_eq!(trims.trims, vec![IdName::new("xlt", "XLT")]);
    }

    #[test]
    fn test_loaded_empty_result_carries_no_error() {
        let svc = loaded_service();
        let resp = svc.models(Some(2020), Some("toyota"));
        assert!(resp.models.is_empty());
        assert!(resp.error.is_none());
    }

    #[test]
    fn test_missing_parameter_distinct_from_not_loaded() {
        let svc = loaded_service();
        let resp = svc.models(Some(2020), None);
        assert!(resp.models.is_empty());
        assert_eq!(resp.error.unwrap().code, ReasonCode::MissingParameter);
    }

    #[test]
    fn test_engines_independent_of_store() {
        let svc = service();
        assert_eq!(svc.engines().engines.len(), 21);
    }

    #[test]
    fn test_status_reflects_load_state() {
        let svc = service();
        let status = svc.status();
        assert!(!status.loaded);
        assert_eq!(status.years_count, 0);

        let svc = loaded_service();
        let status = svc.status();
        assert!(status.loaded);
        assert_eq!(status.years_count, 1);
        assert_eq!(status.makes_count, 1);
        assert_eq!(status.sample_years, vec![2020]);
        assert!(status.last_import.is_some());
    }

    #[test]
    fn test_load_failure_reported_in_envelope() {
        let svc = service();
        let resp = svc.load(Path::new("/definitely/not/here.json"));
        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("not found"));
    }

    #[test]
    fn test_clear_reports_count() {
        let svc = loaded_service();
        let resp = svc.clear();
        assert!(resp.success);
        assert!(resp.cleared > 0);
        assert!(!svc.status().loaded);
    }

    #[test]
    fn test_backend_fault_reported_as_backend_unavailable() {
        use crate::core::store::{ReferenceStore, StoreError};

        struct DownStore;
        impl ReferenceStore for DownStore {
            fn is_loaded(&self) -> Result<bool, StoreError> {
                Err(StoreError::unavailable("connection refused"))
            }
            fn list_years(&self) -> Result<Vec<i32>, StoreError> {
                Err(StoreError::unavailable("connection refused"))
            }
            fn make_ids_for_year(&self, _year: i32) -> Result<Vec<String>, StoreError> {
                Err(StoreError::unavailable("connection refused"))
            }
            fn model_ids_for_year_make(
                &self,
                _year: i32,
                _make_id: &str,
            ) -> Result<Vec<String>, StoreError> {
                Err(StoreError::unavailable("connection refused"))
            }
            fn submodel_ids_for_year_make_model(
                &self,
                _year: i32,
                _make_id: &str,
                _model_id: &str,
            ) -> Result<Vec<String>, StoreError> {
                Err(StoreError::unavailable("connection refused"))
            }
            fn name_of(
                &self,
                _kind: EntityKind,
                _id: &str,
            ) -> Result<Option<String>, StoreError> {
                Err(StoreError::unavailable("connection refused"))
            }
            fn count_of(&self, _kind: EntityKind) -> Result<usize, StoreError> {
                Err(StoreError::unavailable("connection refused"))
            }
            fn replace_all(
                &self,
                _dataset: &crate::core::dataset::Dataset,
            ) -> Result<(), StoreError> {
                Err(StoreError::unavailable("connection refused"))
            }
            fn clear(&self) -> Result<u64, StoreError> {
                Err(StoreError::unavailable("connection refused"))
            }
        }

        let svc = LookupService::new(Arc::new(DownStore), BackendKind::Relational);

        let resp = svc.makes(Some(2020));
        assert!(resp.makes.is_empty());
        assert_eq!(resp.error.unwrap().code, ReasonCode::BackendUnavailable);

        let status = svc.status();
        assert!(!status.loaded);
        assert_eq!(status.error.unwrap().code, ReasonCode::BackendUnavailable);

        let clear = svc.clear();
        assert!(!clear.success);
    }

    #[test]
    fn test_reload_after_clear_restores_data() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("vcdb.json");
        fs::write(&path, SAMPLE).unwrap();
        let svc = service();
        svc.load(&path);
        svc.clear();

        let resp = svc.reload();
        assert!(resp.success);
        assert!(svc.status().loaded);
    }
}
