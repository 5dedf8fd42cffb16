use crate::entity::EntityType;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordsError {
    #[error("Failed to read records file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse records file '{path}': {message}")]
    Parse { path: String, message: String },
    #[error("Records file '{path}' does not contain an array of records")]
    NotAnArray { path: String },
}

/// Load records from a JSON export file.
///
/// Accepts a top-level array, or an envelope object carrying the array under
/// `results`, `records`, or `data` (the shape hosted-backend responses are
/// dumped in). Strict JSON is tried first, then JSON5 for hand-edited files.
/// When an entity type is given, backend field names are normalized to their
/// UI names via the entity's schema table.
pub fn load_records(
    path: impl AsRef<Path>,
    entity: Option<EntityType>,
) -> Result<Vec<Value>, RecordsError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| RecordsError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let parsed: Value = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(json_err) => json5::from_str(&text).map_err(|_| RecordsError::Parse {
            path: path.display().to_string(),
            message: json_err.to_string(),
        })?,
    };

    let records = unwrap_envelope(parsed).ok_or_else(|| RecordsError::NotAnArray {
        path: path.display().to_string(),
    })?;

    Ok(match entity {
        Some(entity) => records
            .into_iter()
            .map(|record| normalize_record(record, entity))
            .collect(),
        None => records,
    })
}

/// Pull the record array out of a possible response envelope.
fn unwrap_envelope(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(records) => Some(records),
        Value::Object(mut map) => {
            for key in ["results", "records", "data"] {
                if let Some(Value::Array(records)) = map.remove(key) {
                    return Some(records);
                }
            }
            None
        }
        _ => None,
    }
}

/// Rename backend-capitalized fields to their UI names and split comma-joined
/// tag strings into arrays. Fields outside the schema pass through untouched;
/// an existing UI-named field wins over its backend counterpart.
pub fn normalize_record(record: Value, entity: EntityType) -> Value {
    let Value::Object(map) = record else {
        return record;
    };

    let mut normalized = Map::with_capacity(map.len());
    for (key, value) in map {
        match entity.field_by_backend_name(&key) {
            // Renamed fields never clobber a UI-named field from the source
            Some(def) if def.ui_name != key => {
                let value = if def.ui_name == "tags" {
                    split_tags(value)
                } else {
                    value
                };
                normalized.entry(def.ui_name.to_string()).or_insert(value);
            }
            _ => {
                let value = if key == "tags" { split_tags(value) } else { value };
                normalized.insert(key, value);
            }
        }
    }

    Value::Object(normalized)
}

/// Tags arrive either as an array or as one comma-joined string.
fn split_tags(value: Value) -> Value {
    match value {
        Value::String(s) if !s.is_empty() => Value::Array(
            s.split(',')
                .map(|tag| Value::String(tag.trim().to_string()))
                .collect(),
        ),
        Value::String(_) => Value::Array(Vec::new()),
        other => other,
    }
}
