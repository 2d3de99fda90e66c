//! Import document parsing
//!
//! The import format is a JSON object with six data members plus `years`:
//! `years` (array of ints), `makes`/`models`/`submodels` (id → name maps),
//! `year_makes` (year-string → make-id array), `year_make_models`
//! (`"{year}_{make_id}"` → model-id array), `ymm_submodels`
//! (`"{year}_{make_id}_{model_id}"` → submodel-id array).
//!
//! Parsing is lenient member-by-member: a missing or wrongly typed top-level
//! member becomes its empty equivalent, and a composite key that does not
//! follow the underscore convention is skipped and counted. Only an
//! unreadable document or a non-object root fails the parse outright.

use serde_json::Value;
use std::collections::HashSet;

use crate::core::dataset::{composite, Dataset};
use crate::core::error::CatalogError;

/// Outcome of decoding a document into a [`Dataset`]
#[derive(Debug, Default)]
pub struct DecodedDocument {
    pub dataset: Dataset,
    /// Association keys that failed the composite-key convention
    pub skipped_keys: usize,
}

/// Decode raw JSON text into a normalized dataset
pub fn decode(text: &str) -> Result<DecodedDocument, CatalogError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| CatalogError::malformed(e.to_string()))?;

    let root = value
        .as_object()
        .ok_or_else(|| CatalogError::malformed("document root is not a JSON object"))?;

    let mut decoded = DecodedDocument::default();
    let ds = &mut decoded.dataset;

    if let Some(years) = root.get("years").and_then(Value::as_array) {
        ds.years
            .extend(years.iter().filter_map(Value::as_i64).map(|y| y as i32));
    }

    ds.makes = name_map(root.get("makes"));
    ds.models = name_map(root.get("models"));
    ds.submodels = name_map(root.get("submodels"));

    if let Some(map) = root.get("year_makes").and_then(Value::as_object) {
        for (key, children) in map {
            match key.parse::<i32>() {
                Ok(year) => {
                    ds.year_makes
                        .entry(year)
                        .or_default()
                        .extend(id_list(children));
                }
                Err(_) => decoded.skipped_keys += 1,
            }
        }
    }

    if let Some(map) = root.get("year_make_models").and_then(Value::as_object) {
        for (key, children) in map {
            match composite::parse_year_make(key) {
                Ok((year, make_id)) => {
                    ds.year_make_models
                        .entry((year, make_id))
                        .or_default()
                        .extend(id_list(children));
                }
                Err(_) => decoded.skipped_keys += 1,
            }
        }
    }

    if let Some(map) = root.get("ymm_submodels").and_then(Value::as_object) {
        for (key, children) in map {
            match composite::parse_ymm(key) {
                Ok((year, make_id, model_id)) => {
                    ds.ymm_submodels
                        .entry((year, make_id, model_id))
                        .or_default()
                        .extend(id_list(children));
                }
                Err(_) => decoded.skipped_keys += 1,
            }
        }
    }

    Ok(decoded)
}

/// Id → name map; non-string names are dropped
fn name_map(value: Option<&Value>) -> std::collections::HashMap<String, String> {
    value
        .and_then(Value::as_object)
        .map(|obj| {
            obj.iter()
                .filter_map(|(id, name)| name.as_str().map(|n| (id.clone(), n.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

/// Child-id array; accepts string or integer elements (integers rendered in
/// decimal), normalizing the id-typing inconsistency seen in upstream data
fn id_list(value: &Value) -> HashSet<String> {
    value
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => n.as_i64().map(|i| i.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "years": [2020],
        "makes": {"ford": "Ford"},
        "models": {"f150": "F-150"},
        "submodels": {"xlt": "XLT"},
        "year_makes": {"2020": ["ford"]},
        "year_make_models": {"2020_ford": ["f150"]},
        "ymm_submodels": {"2020_ford_f150": ["xlt"]}
    }"#;

    #[test]
    fn test_decode_sample() {
        let decoded = decode(SAMPLE).unwrap();
        let ds = &decoded.dataset;

        assert_eq!(ds.years_descending(), vec![2020]);
        assert_eq!(ds.makes["ford"], "Ford");
        assert!(ds.year_makes[&2020].contains("ford"));
        assert!(ds.year_make_models[&(2020, "ford".into())].contains("f150"));
        assert!(ds.ymm_submodels[&(2020, "ford".into(), "f150".into())].contains("xlt"));
        assert_eq!(decoded.skipped_keys, 0);
    }

    #[test]
    fn test_decode_missing_members_default_to_empty() {
        let decoded = decode(r#"{"years": [2021]}"#).unwrap();
        assert_eq!(decoded.dataset.years_descending(), vec![2021]);
        assert!(decoded.dataset.makes.is_empty());
        assert!(decoded.dataset.year_makes.is_empty());
    }

    #[test]
    fn test_decode_wrongly_typed_members_default_to_empty() {
        let decoded = decode(
            r#"{"years": "not-an-array", "makes": [1, 2], "year_makes": {"2020": ["ford"]}}"#,
        )
        .unwrap();
        assert!(decoded.dataset.years.is_empty());
        assert!(decoded.dataset.makes.is_empty());
        assert!(decoded.dataset.year_makes[&2020].contains("ford"));
    }

    #[test]
    fn test_decode_rejects_non_json() {
        let err = decode("not json at all").unwrap_err();
        assert!(matches!(err, CatalogError::MalformedDocument { .. }));
    }

    #[test]
    fn test_decode_rejects_non_object_root() {
        let err = decode("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, CatalogError::MalformedDocument { .. }));
    }

    #[test]
    fn test_decode_skips_bad_composite_keys() {
        let decoded = decode(
            r#"{
                "years": [2020],
                "year_makes": {"notayear": ["x"], "2020": ["ford"]},
                "year_make_models": {"2020": ["orphan"], "2020_ford": ["f150"]},
                "ymm_submodels": {"2020_ford": ["missing-model"]}
            }"#,
        )
        .unwrap();
        assert_eq!(decoded.skipped_keys, 3);
        assert_eq!(decoded.dataset.year_makes.len(), 1);
        assert_eq!(decoded.dataset.year_make_models.len(), 1);
        assert!(decoded.dataset.ymm_submodels.is_empty());
    }

    #[test]
    fn test_decode_accepts_integer_ids() {
        let decoded = decode(
            r#"{
                "years": [2020],
                "makes": {"54": "Ford"},
                "year_makes": {"2020": [54]}
            }"#,
        )
        .unwrap();
        assert!(decoded.dataset.year_makes[&2020].contains("54"));
    }
}
