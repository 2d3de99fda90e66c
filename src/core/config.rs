//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::store::BackendKind;

/// Local settings directory (config + default database location)
pub const VCAT_DIR: &str = ".vcat";

/// VCAT configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage backend: memory, relational, or kv
    pub backend: Option<BackendKind>,

    /// Catalog document imported by `load`/`reload` when no path is given
    pub data_file: Option<PathBuf>,

    /// Database location for the SQLite-backed backends
    pub db_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        Self::load_from(Path::new("."))
    }

    /// Load configuration rooted at the given working directory
    pub fn load_from(root: &Path) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/vcat/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                if let Ok(contents) = std::fs::read_to_string(&global_path) {
                    if let Ok(global) = serde_yml::from_str::<Config>(&contents) {
                        config.merge(global);
                    }
                }
            }
        }

        // 3. Local config (.vcat/config.yaml)
        let local_path = root.join(VCAT_DIR).join("config.yaml");
        if local_path.exists() {
            if let Ok(contents) = std::fs::read_to_string(&local_path) {
                if let Ok(local) = serde_yml::from_str::<Config>(&contents) {
                    config.merge(local);
                }
            }
        }

        // 4. Environment variables
        if let Ok(backend) = std::env::var("VCAT_BACKEND") {
            if let Ok(kind) = backend.parse() {
                config.backend = Some(kind);
            }
        }
        if let Ok(data_file) = std::env::var("VCAT_DATA_FILE") {
            config.data_file = Some(PathBuf::from(data_file));
        }
        if let Ok(db_path) = std::env::var("VCAT_DB_PATH") {
            config.db_path = Some(PathBuf::from(db_path));
        }

        config
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "vcat")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.backend.is_some() {
            self.backend = other.backend;
        }
        if other.data_file.is_some() {
            self.data_file = other.data_file;
        }
        if other.db_path.is_some() {
            self.db_path = other.db_path;
        }
    }

    /// Effective backend kind
    pub fn backend(&self) -> BackendKind {
        self.backend.unwrap_or_default()
    }

    /// Effective database path for the SQLite-backed backends
    ///
    /// Each backend gets its own default file so switching strategies never
    /// reads the other one's layout.
    pub fn db_path(&self, backend: BackendKind) -> PathBuf {
        self.db_path.clone().unwrap_or_else(|| {
            let file = match backend {
                BackendKind::Kv => "kvcache.db",
                _ => "catalog.db",
            };
            Path::new(VCAT_DIR).join(file)
        })
    }

    /// Effective catalog document path
    pub fn data_file(&self) -> PathBuf {
        self.data_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("data/vcdb.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend(), BackendKind::Relational);
        assert_eq!(
            config.db_path(BackendKind::Relational),
            Path::new(".vcat/catalog.db")
        );
        assert_eq!(config.db_path(BackendKind::Kv), Path::new(".vcat/kvcache.db"));
        assert_eq!(config.data_file(), Path::new("data/vcdb.json"));
    }

    #[test]
    fn test_local_config_overrides_defaults() {
        let tmp = tempdir().unwrap();
        let vcat_dir = tmp.path().join(VCAT_DIR);
        fs::create_dir_all(&vcat_dir).unwrap();
        fs::write(
            vcat_dir.join("config.yaml"),
            "backend: memory\ndata_file: catalog/current.json\n",
        )
        .unwrap();

        let config = Config::load_from(tmp.path());
        assert_eq!(config.backend(), BackendKind::Memory);
        assert_eq!(config.data_file(), Path::new("catalog/current.json"));
    }

    #[test]
    fn test_unreadable_local_config_falls_back() {
        let tmp = tempdir().unwrap();
        let vcat_dir = tmp.path().join(VCAT_DIR);
        fs::create_dir_all(&vcat_dir).unwrap();
        fs::write(vcat_dir.join("config.yaml"), ": not yaml :").unwrap();

        let config = Config::load_from(tmp.path());
        assert_eq!(config.backend(), BackendKind::Relational);
    }
}
