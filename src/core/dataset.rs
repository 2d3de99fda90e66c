//! Catalog dataset types
//!
//! The normalized in-memory form of the four-level vehicle hierarchy.
//! Associations are held as structured tuples; the underscore-joined
//! composite-key convention exists only at the import-document and
//! key-value-storage boundaries (see [`composite`]).

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// The three name-resolvable entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Make,
    Model,
    Submodel,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Make => "make",
            EntityKind::Model => "model",
            EntityKind::Submodel => "submodel",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An id/display-name pair returned by cascading queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdName {
    pub id: String,
    pub name: String,
}

impl IdName {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// The full catalog dataset in normalized form
///
/// Ids are opaque strings chosen by the external catalog; they are never
/// parsed, ordered, or generated here. Children sets deduplicate
/// associations by construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub years: HashSet<i32>,
    pub makes: HashMap<String, String>,
    pub models: HashMap<String, String>,
    pub submodels: HashMap<String, String>,
    pub year_makes: HashMap<i32, HashSet<String>>,
    pub year_make_models: HashMap<(i32, String), HashSet<String>>,
    pub ymm_submodels: HashMap<(i32, String, String), HashSet<String>>,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Years present, sorted descending
    pub fn years_descending(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.years.iter().copied().collect();
        years.sort_unstable_by(|a, b| b.cmp(a));
        years
    }

    /// Name map for the given entity kind
    pub fn names(&self, kind: EntityKind) -> &HashMap<String, String> {
        match kind {
            EntityKind::Make => &self.makes,
            EntityKind::Model => &self.models,
            EntityKind::Submodel => &self.submodels,
        }
    }

    /// Total record count: entities plus association rows
    pub fn record_count(&self) -> u64 {
        let associations: usize = self.year_makes.values().map(HashSet::len).sum::<usize>()
            + self.year_make_models.values().map(HashSet::len).sum::<usize>()
            + self.ymm_submodels.values().map(HashSet::len).sum::<usize>();
        (self.years.len()
            + self.makes.len()
            + self.models.len()
            + self.submodels.len()
            + associations) as u64
    }

    /// Remove association rows whose target entity has no name-map entry
    ///
    /// Returns the number of rows pruned. Associations keyed by an unknown
    /// make/model are pruned along with their children.
    pub fn prune_dangling(&mut self) -> usize {
        let mut pruned = 0;

        let makes = &self.makes;
        let models = &self.models;

        for children in self.year_makes.values_mut() {
            let before = children.len();
            children.retain(|make_id| makes.contains_key(make_id));
            pruned += before - children.len();
        }
        self.year_makes.retain(|_, children| !children.is_empty());
        let before: usize = self.year_make_models.values().map(HashSet::len).sum();
        self.year_make_models.retain(|(_, make_id), children| {
            if !makes.contains_key(make_id) {
                return false;
            }
            children.retain(|model_id| models.contains_key(model_id));
            !children.is_empty()
        });
        pruned += before - self.year_make_models.values().map(HashSet::len).sum::<usize>();

        let submodels = &self.submodels;
        let before: usize = self.ymm_submodels.values().map(HashSet::len).sum();
        self.ymm_submodels.retain(|(_, make_id, model_id), children| {
            if !makes.contains_key(make_id) || !models.contains_key(model_id) {
                return false;
            }
            children.retain(|submodel_id| submodels.contains_key(submodel_id));
            !children.is_empty()
        });
        pruned += before - self.ymm_submodels.values().map(HashSet::len).sum::<usize>();

        pruned
    }
}

/// Composite-key formatting and parsing for the underscore wire convention
///
/// `"{year}_{make_id}"` and `"{year}_{make_id}_{model_id}"`. The year is
/// split off first; the remaining segments split at the next underscore.
/// Ids containing the delimiter are representable internally but not
/// addressable through this convention.
pub mod composite {
    use thiserror::Error;

    #[derive(Debug, Error, PartialEq)]
    pub enum KeyParseError {
        #[error("composite key '{0}' has a non-numeric year segment")]
        BadYear(String),

        #[error("composite key '{0}' is missing a segment")]
        MissingSegment(String),
    }

    pub fn year_make_key(year: i32, make_id: &str) -> String {
        format!("{}_{}", year, make_id)
    }

    pub fn ymm_key(year: i32, make_id: &str, model_id: &str) -> String {
        format!("{}_{}_{}", year, make_id, model_id)
    }

    /// Parse `"{year}_{make_id}"`
    pub fn parse_year_make(key: &str) -> Result<(i32, String), KeyParseError> {
        let (year_str, make_id) = key
            .split_once('_')
            .ok_or_else(|| KeyParseError::MissingSegment(key.to_string()))?;
        let year = parse_year(year_str, key)?;
        if make_id.is_empty() {
            return Err(KeyParseError::MissingSegment(key.to_string()));
        }
        Ok((year, make_id.to_string()))
    }

    /// Parse `"{year}_{make_id}_{model_id}"`
    pub fn parse_ymm(key: &str) -> Result<(i32, String, String), KeyParseError> {
        let (year_str, rest) = key
            .split_once('_')
            .ok_or_else(|| KeyParseError::MissingSegment(key.to_string()))?;
        let year = parse_year(year_str, key)?;
        let (make_id, model_id) = rest
            .split_once('_')
            .ok_or_else(|| KeyParseError::MissingSegment(key.to_string()))?;
        if make_id.is_empty() || model_id.is_empty() {
            return Err(KeyParseError::MissingSegment(key.to_string()));
        }
        Ok((year, make_id.to_string(), model_id.to_string()))
    }

    fn parse_year(s: &str, key: &str) -> Result<i32, KeyParseError> {
        s.parse::<i32>()
            .map_err(|_| KeyParseError::BadYear(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::composite::*;
    use super::*;

    fn sample_dataset() -> Dataset {
        let mut ds = Dataset::default();
        ds.years.insert(2020);
        ds.makes.insert("ford".into(), "Ford".into());
        ds.models.insert("f150".into(), "F-150".into());
        ds.submodels.insert("xlt".into(), "XLT".into());
        ds.year_makes.insert(2020, ["ford".to_string()].into());
        ds.year_make_models
            .insert((2020, "ford".into()), ["f150".to_string()].into());
        ds.ymm_submodels
            .insert((2020, "ford".into(), "f150".into()), ["xlt".to_string()].into());
        ds
    }

    #[test]
    fn test_years_descending() {
        let mut ds = Dataset::default();
        ds.years.extend([1995, 2021, 2003]);
        assert_eq!(ds.years_descending(), vec![2021, 2003, 1995]);
    }

    #[test]
    fn test_prune_dangling_keeps_valid_rows() {
        let mut ds = sample_dataset();
        assert_eq!(ds.prune_dangling(), 0);
        assert_eq!(ds.year_makes[&2020].len(), 1);
    }

    #[test]
    fn test_prune_dangling_drops_unknown_targets() {
        let mut ds = sample_dataset();
        ds.year_makes.get_mut(&2020).unwrap().insert("ghost".into());
        ds.ymm_submodels
            .get_mut(&(2020, "ford".into(), "f150".into()))
            .unwrap()
            .insert("phantom".into());

        assert_eq!(ds.prune_dangling(), 2);
        assert!(!ds.year_makes[&2020].contains("ghost"));
        assert_eq!(
            ds.ymm_submodels[&(2020, "ford".into(), "f150".into())].len(),
            1
        );
    }

    #[test]
    fn test_prune_dangling_drops_rows_keyed_by_unknown_make() {
        let mut ds = sample_dataset();
        ds.year_make_models
            .insert((2020, "ghost".into()), ["f150".to_string()].into());

        assert_eq!(ds.prune_dangling(), 1);
        assert!(!ds.year_make_models.contains_key(&(2020, "ghost".into())));
    }

    #[test]
    fn test_composite_roundtrip() {
        assert_eq!(year_make_key(2020, "ford"), "2020_ford");
        assert_eq!(parse_year_make("2020_ford").unwrap(), (2020, "ford".into()));
        assert_eq!(
            parse_ymm("2020_ford_f150").unwrap(),
            (2020, "ford".into(), "f150".into())
        );
    }

    #[test]
    fn test_composite_model_id_may_contain_delimiter() {
        // Only the model segment (the tail) tolerates embedded underscores.
        let (year, make, model) = parse_ymm("2020_ford_f_150").unwrap();
        assert_eq!((year, make.as_str(), model.as_str()), (2020, "ford", "f_150"));
    }

    #[test]
    fn test_composite_rejects_bad_keys() {
        assert!(matches!(
            parse_year_make("twenty_ford"),
            Err(KeyParseError::BadYear(_))
        ));
        assert!(matches!(
            parse_year_make("2020"),
            Err(KeyParseError::MissingSegment(_))
        ));
        assert!(matches!(
            parse_ymm("2020_ford"),
            Err(KeyParseError::MissingSegment(_))
        ));
        assert!(matches!(parse_ymm("2020_ford_"), Err(KeyParseError::MissingSegment(_))));
    }

    #[test]
    fn test_record_count() {
        let ds = sample_dataset();
        // 1 year + 3 entities + 3 association rows
        assert_eq!(ds.record_count(), 7);
    }
}
