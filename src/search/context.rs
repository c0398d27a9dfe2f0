//! Entry point binding configuration to engines.
//!
//! [`SearchContext`] starts searches and keeps engine indexes in sync with
//! record changes.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::SearchConfig;
use crate::core::SearchableRecord;
use crate::engines::{Engine, EngineManager, SoftDeleteFilter};
use crate::error::Result;
use crate::models::SearchableModel;

use super::builder::SearchBuilder;
use super::tokenizer::tokenize;

/// Result of a sync request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The engine was updated in place.
    Synced { records: usize },
    /// Queueing is enabled; the caller dispatches the job.
    Queued {
        records: usize,
        connection: Option<String>,
        queue: Option<String>,
    },
}

#[derive(Debug)]
pub struct SearchContext {
    config: SearchConfig,
    engines: EngineManager,
}

impl SearchContext {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            engines: EngineManager::new(config.clone()),
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn engines(&self) -> &EngineManager {
        &self.engines
    }

    pub fn engine(&self, driver: Option<&str>) -> Result<Arc<dyn Engine>> {
        self.engines.engine(driver)
    }

    /// Start a search on the configured driver.
    pub fn search<'a>(&self, model: &'a dyn SearchableModel, query: &str) -> Result<SearchBuilder<'a>> {
        self.search_with(model, query, None)
    }

    /// Start a search on a specific driver.
    pub fn search_with<'a>(
        &self,
        model: &'a dyn SearchableModel,
        query: &str,
        driver: Option<&str>,
    ) -> Result<SearchBuilder<'a>> {
        let engine = self.engines.engine(driver)?;
        Ok(SearchBuilder::new(model, engine, &self.config, query))
    }

    /// Normalized query terms, or `None` when nothing searchable is left.
    pub fn search_terms(&self, query: &str) -> Option<Vec<String>> {
        let terms = tokenize(query);
        if terms.is_empty() { None } else { Some(terms) }
    }

    /// Push records into the engine's index.
    pub fn make_searchable(
        &self,
        model: &dyn SearchableModel,
        records: &[SearchableRecord],
    ) -> Result<SyncOutcome> {
        self.sync(model, records, SyncKind::Update)
    }

    /// Remove records from the engine's index.
    pub fn remove_from_search(
        &self,
        model: &dyn SearchableModel,
        records: &[SearchableRecord],
    ) -> Result<SyncOutcome> {
        self.sync(model, records, SyncKind::Delete)
    }

    /// Remove every record of the model from the engine and discard any
    /// materialized store behind it.
    pub fn flush(&self, model: &dyn SearchableModel) -> Result<()> {
        self.engines.engine(None)?.flush(model)?;
        if let Some(index) = model.virtual_index() {
            index.teardown()?;
        }
        info!(index = %model.searchable_as(&self.config), "flushed search index");
        Ok(())
    }

    /// Load every record of the model and sync it to the engine.
    ///
    /// Materialized content is rebuilt first. Trashed records are included
    /// when soft-delete search is enabled.
    pub fn import(&self, model: &dyn SearchableModel) -> Result<SyncOutcome> {
        if let Some(index) = model.virtual_index() {
            index.invalidate();
            index.ensure_fresh()?;
        }

        let filter = model.soft_deletes().then_some(if self.config.soft_delete {
            SoftDeleteFilter::Included
        } else {
            SoftDeleteFilter::Excluded
        });
        let records = model.all_records(filter)?;
        let outcome = self.make_searchable(model, &records)?;
        info!(
            index = %model.searchable_as(&self.config),
            records = records.len(),
            "imported records"
        );
        Ok(outcome)
    }

    fn sync(
        &self,
        model: &dyn SearchableModel,
        records: &[SearchableRecord],
        kind: SyncKind,
    ) -> Result<SyncOutcome> {
        if records.is_empty() {
            return Ok(SyncOutcome::Synced { records: 0 });
        }

        let queue = &self.config.queue;
        if queue.is_enabled() {
            debug!(records = records.len(), ?kind, "sync deferred to queue");
            return Ok(SyncOutcome::Queued {
                records: records.len(),
                connection: queue.connection().map(str::to_string),
                queue: queue.queue().map(str::to_string),
            });
        }

        let engine = self.engines.engine(None)?;
        match kind {
            SyncKind::Update => engine.update(model, records)?,
            SyncKind::Delete => engine.delete(model, records)?,
        }
        Ok(SyncOutcome::Synced {
            records: records.len(),
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum SyncKind {
    Update,
    Delete,
}
