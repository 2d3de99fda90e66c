//! Key-value backend
//!
//! Stores the catalog as composite-keyed JSON values in a single key/value
//! table: `years`, `makes`, `models`, `submodels` hold the full arrays/maps,
//! and every `year_makes:{year}`, `ymm:{year}_{make_id}` and
//! `ymms:{year}_{make_id}_{model_id}` key holds the pre-computed children
//! list for that prefix. The denormalization happens once at load time,
//! making each cascading lookup a single key fetch. A `loaded` marker key
//! records that an import completed.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::core::dataset::{composite, Dataset, EntityKind};
use crate::core::store::{ReferenceStore, StoreError};

const KEY_LOADED: &str = "loaded";
const KEY_YEARS: &str = "years";

pub struct KvStore {
    conn: Mutex<Connection>,
}

impl KvStore {
    /// Open or create the key-value database at the given path
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::unavailable(format!("{}: {}", parent.display(), e)))?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL);",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::unavailable("connection lock poisoned"))
    }

    fn get_raw(conn: &Connection, key: &str) -> Result<Option<String>, StoreError> {
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Fetch and decode a JSON id list stored under `key`
    ///
    /// A missing key is an empty list; an undecodable value counts as
    /// corrupt storage and also reads as empty rather than failing.
    fn get_id_list(conn: &Connection, key: &str) -> Result<Vec<String>, StoreError> {
        Ok(Self::get_raw(conn, key)?
            .and_then(|raw| serde_json::from_str::<Vec<String>>(&raw).ok())
            .unwrap_or_default())
    }

    fn get_name_map(
        conn: &Connection,
        kind: EntityKind,
    ) -> Result<HashMap<String, String>, StoreError> {
        Ok(Self::get_raw(conn, Self::map_key(kind))?
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default())
    }

    fn map_key(kind: EntityKind) -> &'static str {
        match kind {
            EntityKind::Make => "makes",
            EntityKind::Model => "models",
            EntityKind::Submodel => "submodels",
        }
    }

    fn sorted(ids: &std::collections::HashSet<String>) -> Vec<&String> {
        let mut ids: Vec<&String> = ids.iter().collect();
        ids.sort();
        ids
    }
}

impl ReferenceStore for KvStore {
    fn is_loaded(&self) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        Ok(Self::get_raw(&conn, KEY_LOADED)?.is_some())
    }

    fn list_years(&self) -> Result<Vec<i32>, StoreError> {
        let conn = self.lock()?;
        // Stored pre-sorted descending at load time
        Ok(Self::get_raw(&conn, KEY_YEARS)?
            .and_then(|raw| serde_json::from_str::<Vec<i32>>(&raw).ok())
            .unwrap_or_default())
    }

    fn make_ids_for_year(&self, year: i32) -> Result<Vec<String>, StoreError> {
        let conn = self.lock()?;
        Self::get_id_list(&conn, &format!("year_makes:{}", year))
    }

    fn model_ids_for_year_make(&self, year: i32, make_id: &str) -> Result<Vec<String>, StoreError> {
        let conn = self.lock()?;
        Self::get_id_list(&conn, &format!("ymm:{}", composite::year_make_key(year, make_id)))
    }

    fn submodel_ids_for_year_make_model(
        &self,
        year: i32,
        make_id: &str,
        model_id: &str,
    ) -> Result<Vec<String>, StoreError> {
        let conn = self.lock()?;
        Self::get_id_list(
            &conn,
            &format!("ymms:{}", composite::ymm_key(year, make_id, model_id)),
        )
    }

    fn name_of(&self, kind: EntityKind, id: &str) -> Result<Option<String>, StoreError> {
        let conn = self.lock()?;
        Ok(Self::get_name_map(&conn, kind)?.remove(id))
    }

    fn count_of(&self, kind: EntityKind) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        Ok(Self::get_name_map(&conn, kind)?.len())
    }

    fn replace_all(&self, dataset: &Dataset) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM kv", [])?;

        {
            let mut stmt =
                tx.prepare("INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)")?;

            stmt.execute(params![
                KEY_YEARS,
                serde_json::to_string(&dataset.years_descending())
                    .map_err(|e| StoreError::unavailable(e.to_string()))?
            ])?;

            for kind in [EntityKind::Make, EntityKind::Model, EntityKind::Submodel] {
                stmt.execute(params![
                    Self::map_key(kind),
                    serde_json::to_string(dataset.names(kind))
                        .map_err(|e| StoreError::unavailable(e.to_string()))?
                ])?;
            }

            for (year, make_ids) in &dataset.year_makes {
                stmt.execute(params![
                    format!("year_makes:{}", year),
                    serde_json::to_string(&Self::sorted(make_ids))
                        .map_err(|e| StoreError::unavailable(e.to_string()))?
                ])?;
            }

            for ((year, make_id), model_ids) in &dataset.year_make_models {
                stmt.execute(params![
                    format!("ymm:{}", composite::year_make_key(*year, make_id)),
                    serde_json::to_string(&Self::sorted(model_ids))
                        .map_err(|e| StoreError::unavailable(e.to_string()))?
                ])?;
            }

            for ((year, make_id, model_id), submodel_ids) in &dataset.ymm_submodels {
                stmt.execute(params![
                    format!("ymms:{}", composite::ymm_key(*year, make_id, model_id)),
                    serde_json::to_string(&Self::sorted(submodel_ids))
                        .map_err(|e| StoreError::unavailable(e.to_string()))?
                ])?;
            }

            if !dataset.is_empty() {
                stmt.execute(params![KEY_LOADED, "true"])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn clear(&self) -> Result<u64, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let count: i64 = tx.query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))?;
        tx.execute("DELETE FROM kv", [])?;
        tx.commit()?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::contract_tests;

    #[test]
    fn test_contract() {
        let store = KvStore::open_in_memory().unwrap();
        contract_tests::assert_contract(&store);
    }

    #[test]
    fn test_children_lists_are_denormalized_per_key() {
        let store = KvStore::open_in_memory().unwrap();
        store
            .replace_all(&contract_tests::sample_dataset())
            .unwrap();

        let conn = store.conn.lock().unwrap();
        let raw = KvStore::get_raw(&conn, "year_makes:2020").unwrap().unwrap();
        assert_eq!(raw, r#"["ford","toyota"]"#);
        let raw = KvStore::get_raw(&conn, "ymm:2020_ford").unwrap().unwrap();
        assert_eq!(raw, r#"["f150"]"#);
        assert!(KvStore::get_raw(&conn, "loaded").unwrap().is_some());
    }

    #[test]
    fn test_corrupt_value_reads_as_empty() {
        let store = KvStore::open_in_memory().unwrap();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO kv (key, value) VALUES ('year_makes:2020', 'not json')",
                [],
            )
            .unwrap();
        }
        assert!(store.make_ids_for_year(2020).unwrap().is_empty());
    }
}
