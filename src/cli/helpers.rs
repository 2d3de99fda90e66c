//! Shared command plumbing

use miette::{miette, Result};
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::service::LookupService;
use crate::core::store::{open_store, BackendKind};

/// Construct the lookup service from CLI flags and layered configuration
///
/// The one place a fault may halt instead of being converted to a response
/// envelope: an unreachable storage medium at startup.
pub fn open_service(global: &GlobalOpts) -> Result<LookupService> {
    let config = Config::load();

    let backend = global.backend.unwrap_or_else(|| config.backend());
    let db_path = global
        .db_path
        .clone()
        .unwrap_or_else(|| config.db_path(backend));

    let store = open_store(backend, Some(&db_path))
        .map_err(|e| miette!("cannot open {} store: {}", backend, e))?;
    let service = LookupService::new(store, backend);

    // The memory backend starts empty every process; give it a best-effort
    // import of the configured document. Failures read as not_loaded.
    if backend == BackendKind::Memory {
        let _ = service.loader().import_from(&data_file(global, &config));
    }

    Ok(service)
}

/// Effective catalog document path for load/reload
pub fn data_file(global: &GlobalOpts, config: &Config) -> PathBuf {
    global
        .data_file
        .clone()
        .unwrap_or_else(|| config.data_file())
}

/// Load the layered configuration once for commands that need paths
pub fn load_config() -> Config {
    Config::load()
}
