use crate::criteria::Criterion;
use crate::entity::EntityType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read filter store '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse filter store '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to write filter store '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("No saved filter with id {0}")]
    NotFound(u64),
    #[error("No saved filter named '{0}'")]
    NameNotFound(String),
}

/// A named, persisted filter definition scoped to one entity type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedFilter {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub entity_type: EntityType,
    #[serde(default)]
    pub criteria: Vec<Criterion>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a filter; the store assigns id and stamps.
#[derive(Debug, Clone)]
pub struct NewFilter {
    pub name: String,
    pub description: Option<String>,
    pub entity_type: EntityType,
    pub criteria: Vec<Criterion>,
    pub tags: Vec<String>,
}

/// Partial update: only provided fields are applied.
#[derive(Debug, Clone, Default)]
pub struct FilterPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub entity_type: Option<EntityType>,
    pub criteria: Option<Vec<Criterion>>,
    pub tags: Option<Vec<String>>,
}

/// Persistence contract for saved filters. The filtering core never holds a
/// store reference; callers load a definition and hand its criteria to the
/// engine.
pub trait FilterStore {
    fn list(&self, entity: Option<EntityType>) -> Result<Vec<SavedFilter>, StoreError>;
    fn get(&self, id: u64) -> Result<SavedFilter, StoreError>;
    fn create(&mut self, new: NewFilter) -> Result<SavedFilter, StoreError>;
    fn update(&mut self, id: u64, patch: FilterPatch) -> Result<SavedFilter, StoreError>;
    fn delete(&mut self, id: u64) -> Result<bool, StoreError>;
}

/// Saved filters persisted as one JSON array in a single file. A missing
/// file reads as an empty store and is created on first write.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Find a saved filter by id when the argument parses as one, otherwise
    /// by exact name.
    pub fn resolve(&self, id_or_name: &str) -> Result<SavedFilter, StoreError> {
        if let Ok(id) = id_or_name.parse::<u64>() {
            return self.get(id);
        }
        self.list(None)?
            .into_iter()
            .find(|filter| filter.name == id_or_name)
            .ok_or_else(|| StoreError::NameNotFound(id_or_name.to_string()))
    }

    fn load(&self) -> Result<Vec<SavedFilter>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.display().to_string(),
                    source,
                });
            }
        };

        serde_json::from_str(&text).map_err(|source| StoreError::Parse {
            path: self.path.display().to_string(),
            source,
        })
    }

    fn save(&self, filters: &[SavedFilter]) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(filters).map_err(|source| StoreError::Parse {
            path: self.path.display().to_string(),
            source,
        })?;
        fs::write(&self.path, text).map_err(|source| StoreError::Write {
            path: self.path.display().to_string(),
            source,
        })
    }
}

impl FilterStore for JsonFileStore {
    fn list(&self, entity: Option<EntityType>) -> Result<Vec<SavedFilter>, StoreError> {
        let mut filters = self.load()?;
        if let Some(entity) = entity {
            filters.retain(|filter| filter.entity_type == entity);
        }
        Ok(filters)
    }

    fn get(&self, id: u64) -> Result<SavedFilter, StoreError> {
        self.load()?
            .into_iter()
            .find(|filter| filter.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    fn create(&mut self, new: NewFilter) -> Result<SavedFilter, StoreError> {
        let mut filters = self.load()?;
        let id = filters.iter().map(|f| f.id).max().unwrap_or(0) + 1;
        let now = Utc::now();

        let filter = SavedFilter {
            id,
            name: new.name,
            description: new.description,
            entity_type: new.entity_type,
            criteria: new.criteria,
            tags: new.tags,
            created_at: now,
            updated_at: now,
        };

        filters.push(filter.clone());
        self.save(&filters)?;
        Ok(filter)
    }

    fn update(&mut self, id: u64, patch: FilterPatch) -> Result<SavedFilter, StoreError> {
        let mut filters = self.load()?;
        let filter = filters
            .iter_mut()
            .find(|filter| filter.id == id)
            .ok_or(StoreError::NotFound(id))?;

        if let Some(name) = patch.name {
            filter.name = name;
        }
        if let Some(description) = patch.description {
            filter.description = Some(description);
        }
        if let Some(entity_type) = patch.entity_type {
            filter.entity_type = entity_type;
        }
        if let Some(criteria) = patch.criteria {
            filter.criteria = criteria;
        }
        if let Some(tags) = patch.tags {
            filter.tags = tags;
        }
        filter.updated_at = Utc::now();

        let updated = filter.clone();
        self.save(&filters)?;
        Ok(updated)
    }

    fn delete(&mut self, id: u64) -> Result<bool, StoreError> {
        let mut filters = self.load()?;
        let before = filters.len();
        filters.retain(|filter| filter.id != id);

        if filters.len() == before {
            return Ok(false);
        }
        self.save(&filters)?;
        Ok(true)
    }
}
