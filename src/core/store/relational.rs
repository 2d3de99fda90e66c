//! SQLite relational backend
//!
//! Entities and the four association tables persisted as indexed SQLite
//! tables, WAL-journaled. `replace_all` runs delete + bulk insert inside a
//! single transaction; all access is serialized through one connection, so
//! readers never observe a half-replaced dataset. The schema is rebuilt
//! from scratch on version mismatch - the catalog is wholesale re-imported
//! rather than migrated.

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::core::dataset::{Dataset, EntityKind};
use crate::core::store::{ReferenceStore, StoreError};

/// Bumped whenever the table layout changes
const SCHEMA_VERSION: i32 = 2;

pub struct RelationalStore {
    conn: Mutex<Connection>,
}

impl RelationalStore {
    /// Open or create the catalog database at the given path
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::unavailable(format!("{}: {}", parent.display(), e)))?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.ensure_schema()?;
        Ok(store)
    }

    /// In-memory database, for tests
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.ensure_schema()?;
        Ok(store)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::unavailable("connection lock poisoned"))
    }

    fn ensure_schema(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;

        let current: i32 = conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        if current != SCHEMA_VERSION {
            conn.execute_batch(
                r#"
                DROP TABLE IF EXISTS schema_version;
                DROP TABLE IF EXISTS years;
                DROP TABLE IF EXISTS makes;
                DROP TABLE IF EXISTS models;
                DROP TABLE IF EXISTS submodels;
                DROP TABLE IF EXISTS year_makes;
                DROP TABLE IF EXISTS year_make_models;
                DROP TABLE IF EXISTS ymm_submodels;
                "#,
            )?;
            Self::init_schema(&conn)?;
        }

        Ok(())
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS years (
                year INTEGER PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS makes (
                make_id TEXT PRIMARY KEY,
                name TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_makes_name ON makes(name);

            CREATE TABLE IF NOT EXISTS models (
                model_id TEXT PRIMARY KEY,
                name TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_models_name ON models(name);

            CREATE TABLE IF NOT EXISTS submodels (
                submodel_id TEXT PRIMARY KEY,
                name TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_submodels_name ON submodels(name);

            CREATE TABLE IF NOT EXISTS year_makes (
                year INTEGER NOT NULL,
                make_id TEXT NOT NULL,
                PRIMARY KEY (year, make_id)
            );
            CREATE INDEX IF NOT EXISTS idx_year_makes_year ON year_makes(year);

            CREATE TABLE IF NOT EXISTS year_make_models (
                year INTEGER NOT NULL,
                make_id TEXT NOT NULL,
                model_id TEXT NOT NULL,
                PRIMARY KEY (year, make_id, model_id)
            );
            CREATE INDEX IF NOT EXISTS idx_ymm_year_make ON year_make_models(year, make_id);

            CREATE TABLE IF NOT EXISTS ymm_submodels (
                year INTEGER NOT NULL,
                make_id TEXT NOT NULL,
                model_id TEXT NOT NULL,
                submodel_id TEXT NOT NULL,
                PRIMARY KEY (year, make_id, model_id, submodel_id)
            );
            CREATE INDEX IF NOT EXISTS idx_ymms_year_make_model
                ON ymm_submodels(year, make_id, model_id);
            "#,
        )?;

        conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }

    fn name_table(kind: EntityKind) -> (&'static str, &'static str) {
        match kind {
            EntityKind::Make => ("makes", "make_id"),
            EntityKind::Model => ("models", "model_id"),
            EntityKind::Submodel => ("submodels", "submodel_id"),
        }
    }

    fn collect_ids(
        conn: &Connection,
        sql: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<String>, StoreError> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(args, |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

impl ReferenceStore for RelationalStore {
    fn is_loaded(&self) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let loaded: bool =
            conn.query_row("SELECT EXISTS(SELECT 1 FROM years)", [], |row| row.get(0))?;
        Ok(loaded)
    }

    fn list_years(&self) -> Result<Vec<i32>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT year FROM years ORDER BY year DESC")?;
        let rows = stmt.query_map([], |row| row.get::<_, i32>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn make_ids_for_year(&self, year: i32) -> Result<Vec<String>, StoreError> {
        let conn = self.lock()?;
        Self::collect_ids(
            &conn,
            "SELECT make_id FROM year_makes WHERE year = ?1",
            &[&year],
        )
    }

    fn model_ids_for_year_make(&self, year: i32, make_id: &str) -> Result<Vec<String>, StoreError> {
        let conn = self.lock()?;
        Self::collect_ids(
            &conn,
            "SELECT model_id FROM year_make_models WHERE year = ?1 AND make_id = ?2",
            &[&year, &make_id],
        )
    }

    fn submodel_ids_for_year_make_model(
        &self,
        year: i32,
        make_id: &str,
        model_id: &str,
    ) -> Result<Vec<String>, StoreError> {
        let conn = self.lock()?;
        Self::collect_ids(
            &conn,
            "SELECT submodel_id FROM ymm_submodels \
             WHERE year = ?1 AND make_id = ?2 AND model_id = ?3",
            &[&year, &make_id, &model_id],
        )
    }

    fn name_of(&self, kind: EntityKind, id: &str) -> Result<Option<String>, StoreError> {
        let conn = self.lock()?;
        let (table, id_col) = Self::name_table(kind);
        let name = conn
            .query_row(
                &format!("SELECT name FROM {} WHERE {} = ?1", table, id_col),
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name)
    }

    fn count_of(&self, kind: EntityKind) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let (table, _) = Self::name_table(kind);
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
        Ok(count as usize)
    }

    fn replace_all(&self, dataset: &Dataset) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute_batch(
            r#"
            DELETE FROM years;
            DELETE FROM makes;
            DELETE FROM models;
            DELETE FROM submodels;
            DELETE FROM year_makes;
            DELETE FROM year_make_models;
            DELETE FROM ymm_submodels;
            "#,
        )?;

        {
            let mut stmt = tx.prepare("INSERT INTO years (year) VALUES (?1)")?;
            for year in &dataset.years {
                stmt.execute(params![year])?;
            }

            for (kind, rows) in [
                (EntityKind::Make, &dataset.makes),
                (EntityKind::Model, &dataset.models),
                (EntityKind::Submodel, &dataset.submodels),
            ] {
                let (table, id_col) = Self::name_table(kind);
                let mut stmt = tx.prepare(&format!(
                    "INSERT OR REPLACE INTO {} ({}, name) VALUES (?1, ?2)",
                    table, id_col
                ))?;
                for (id, name) in rows {
                    stmt.execute(params![id, name])?;
                }
            }

            let mut stmt =
                tx.prepare("INSERT OR IGNORE INTO year_makes (year, make_id) VALUES (?1, ?2)")?;
            for (year, make_ids) in &dataset.year_makes {
                for make_id in make_ids {
                    stmt.execute(params![year, make_id])?;
                }
            }

            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO year_make_models (year, make_id, model_id) \
                 VALUES (?1, ?2, ?3)",
            )?;
            for ((year, make_id), model_ids) in &dataset.year_make_models {
                for model_id in model_ids {
                    stmt.execute(params![year, make_id, model_id])?;
                }
            }

            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO ymm_submodels (year, make_id, model_id, submodel_id) \
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for ((year, make_id, model_id), submodel_ids) in &dataset.ymm_submodels {
                for submodel_id in submodel_ids {
                    stmt.execute(params![year, make_id, model_id, submodel_id])?;
                }
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn clear(&self) -> Result<u64, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let tables = [
            "years",
            "makes",
            "models",
            "submodels",
            "year_makes",
            "year_make_models",
            "ymm_submodels",
        ];

        let mut cleared = 0u64;
        for table in tables {
            let count: i64 =
                tx.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
            cleared += count as u64;
            tx.execute(&format!("DELETE FROM {}", table), [])?;
        }

        tx.commit()?;
        Ok(cleared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::contract_tests;
    use tempfile::tempdir;

    #[test]
    fn test_contract() {
        let store = RelationalStore::open_in_memory().unwrap();
        contract_tests::assert_contract(&store);
    }

    #[test]
    fn test_persists_across_reopen() {
        let tmp = tempdir().unwrap();
        let db = tmp.path().join("catalog.db");

        {
            let store = RelationalStore::open(&db).unwrap();
            store
                .replace_all(&contract_tests::sample_dataset())
                .unwrap();
        }

        let store = RelationalStore::open(&db).unwrap();
        assert!(store.is_loaded().unwrap());
        assert_eq!(store.list_years().unwrap(), vec![2020, 2019]);
    }

    #[test]
    fn test_creates_parent_directories() {
        let tmp = tempdir().unwrap();
        let db = tmp.path().join("nested/dir/catalog.db");
        let store = RelationalStore::open(&db).unwrap();
        assert!(!store.is_loaded().unwrap());
        assert!(db.exists());
    }

    #[test]
    fn test_clear_counts_rows() {
        let store = RelationalStore::open_in_memory().unwrap();
        store
            .replace_all(&contract_tests::sample_dataset())
            .unwrap();
        // 2 years + 5 entities + 6 association rows
        assert_eq!(store.clear().unwrap(), 13);
    }
}
