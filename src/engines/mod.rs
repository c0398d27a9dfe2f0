//! Backend search engines.
//!
//! An [`Engine`] turns a [`QuerySpec`] into unranked matching records. Only
//! local engines live here: a linear in-memory scan, an SQL `LIKE` query and
//! a no-op engine. [`EngineManager`] resolves the configured driver name.

pub mod collection;
pub mod database;
pub mod manager;
pub mod null;

use serde::Serialize;
use serde_json::Value;

use crate::core::{SearchableRecord, value_text};
use crate::error::{Result, SearchError};
use crate::models::SearchableModel;

pub use collection::CollectionEngine;
pub use database::DatabaseEngine;
pub use manager::EngineManager;
pub use null::NullEngine;

/// Which records a soft-deleting model exposes to a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoftDeleteFilter {
    /// Only live records.
    Excluded,
    /// Only soft-deleted records.
    OnlyDeleted,
    /// Both.
    Included,
}

impl SoftDeleteFilter {
    pub fn admits(self, record: &SearchableRecord) -> bool {
        match self {
            Self::Excluded => !record.is_trashed(),
            Self::OnlyDeleted => record.is_trashed(),
            Self::Included => true,
        }
    }
}

/// Everything an engine needs to run one search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QuerySpec {
    pub query: String,
    /// Index name, `searchable_as` of the model.
    pub index: String,
    /// `None` when the model does not soft-delete.
    pub soft_delete: Option<SoftDeleteFilter>,
    /// Exact-match constraints, ANDed.
    pub wheres: Vec<(String, Value)>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl QuerySpec {
    pub fn new(query: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            index: index.into(),
            ..Self::default()
        }
    }

    /// Same constraints without limit and offset.
    #[must_use]
    pub fn unbounded(&self) -> Self {
        Self {
            limit: None,
            offset: 0,
            ..self.clone()
        }
    }

    /// Whether `record` satisfies the soft-delete filter and every where
    /// clause. Values compare by their text rendering.
    pub fn admits(&self, record: &SearchableRecord) -> bool {
        if let Some(filter) = self.soft_delete {
            if !filter.admits(record) {
                return false;
            }
        }
        self.wheres.iter().all(|(field, expected)| {
            record
                .value(field)
                .is_some_and(|actual| actual == expected || value_text(actual) == value_text(expected))
        })
    }

    /// Apply offset and limit to an already filtered list.
    pub fn window<T>(&self, items: Vec<T>) -> Vec<T> {
        let iter = items.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => iter.take(limit).collect(),
            None => iter.collect(),
        }
    }
}

/// A backend that can find records matching a query.
pub trait Engine: Send + Sync {
    fn name(&self) -> &'static str;

    /// Matching records in backend order, unranked.
    fn search(&self, model: &dyn SearchableModel, spec: &QuerySpec) -> Result<Vec<SearchableRecord>>;

    /// Number of matches, ignoring limit and offset.
    fn count(&self, model: &dyn SearchableModel, spec: &QuerySpec) -> Result<usize> {
        Ok(self.search(model, &spec.unbounded())?.len())
    }

    /// Push records into the engine's index.
    fn update(&self, _model: &dyn SearchableModel, _records: &[SearchableRecord]) -> Result<()> {
        Ok(())
    }

    /// Remove records from the engine's index.
    fn delete(&self, _model: &dyn SearchableModel, _records: &[SearchableRecord]) -> Result<()> {
        Ok(())
    }

    /// Remove every record of the model from the engine's index.
    fn flush(&self, _model: &dyn SearchableModel) -> Result<()> {
        Ok(())
    }

    fn create_index(&self, name: &str, _key: Option<&str>) -> Result<()> {
        Err(SearchError::Unsupported(format!(
            "the {} engine does not manage indexes (create {name})",
            self.name()
        )))
    }

    fn delete_index(&self, name: &str) -> Result<()> {
        Err(SearchError::Unsupported(format!(
            "the {} engine does not manage indexes (delete {name})",
            self.name()
        )))
    }
}
