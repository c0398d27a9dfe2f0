//! Fluent search over one model.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::SearchConfig;
use crate::core::{RecordKey, SearchableRecord};
use crate::engines::{Engine, QuerySpec, SoftDeleteFilter};
use crate::error::Result;
use crate::models::SearchableModel;

use super::ranking::{DefaultScorer, RelevanceScorer, rank_records};

/// One page of results with length-aware paginator metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub per_page: usize,
    pub current_page: usize,
    /// Never less than 1.
    pub last_page: usize,
    /// 1-based position of the first item, `None` when the page is empty.
    pub from: Option<usize>,
    pub to: Option<usize>,
}

impl<T> Page<T> {
    /// Page over an already fetched page of items.
    pub fn new(items: Vec<T>, total: usize, per_page: usize, current_page: usize) -> Self {
        let per_page = per_page.max(1);
        let current_page = current_page.max(1);
        let last_page = total.div_ceil(per_page).max(1);
        let (from, to) = if items.is_empty() {
            (None, None)
        } else {
            let from = (current_page - 1) * per_page + 1;
            (Some(from), Some(from + items.len() - 1))
        };
        Self {
            items,
            total,
            per_page,
            current_page,
            last_page,
            from,
            to,
        }
    }

    /// Slice the requested page out of the full result list.
    pub fn slice(all: Vec<T>, per_page: usize, current_page: usize) -> Self {
        let total = all.len();
        let per_page = per_page.max(1);
        let current_page = current_page.max(1);
        let items = all
            .into_iter()
            .skip((current_page - 1).saturating_mul(per_page))
            .take(per_page)
            .collect();
        Self::new(items, total, per_page, current_page)
    }

    /// Number of items on this page.
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.last_page
    }
}

/// A pending search: query, constraints, and the engine to run it on.
///
/// Nothing touches the engine until a terminal method (`get`, `count`,
/// `get_ranked`, ...) is called.
pub struct SearchBuilder<'a> {
    model: &'a dyn SearchableModel,
    engine: Arc<dyn Engine>,
    allow_trashed: bool,
    spec: QuerySpec,
}

impl std::fmt::Debug for SearchBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchBuilder")
            .field("engine", &self.engine.name())
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

impl<'a> SearchBuilder<'a> {
    pub fn new(
        model: &'a dyn SearchableModel,
        engine: Arc<dyn Engine>,
        config: &SearchConfig,
        query: impl Into<String>,
    ) -> Self {
        let mut spec = QuerySpec::new(query, model.searchable_as(config));
        spec.soft_delete = model.soft_deletes().then_some(SoftDeleteFilter::Excluded);
        Self {
            model,
            engine,
            allow_trashed: config.soft_delete,
            spec,
        }
    }

    pub fn query(&self) -> &str {
        &self.spec.query
    }

    pub fn query_spec(&self) -> &QuerySpec {
        &self.spec
    }

    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    #[must_use]
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.spec.wheres.push((field.into(), value.into()));
        self
    }

    /// Include soft-deleted records. Only honored when soft-delete search is
    /// enabled in the config.
    #[must_use]
    pub fn with_trashed(mut self) -> Self {
        if self.model.soft_deletes() {
            self.spec.soft_delete = Some(if self.allow_trashed {
                SoftDeleteFilter::Included
            } else {
                SoftDeleteFilter::Excluded
            });
        }
        self
    }

    #[must_use]
    pub fn only_trashed(mut self) -> Self {
        if self.model.soft_deletes() {
            self.spec.soft_delete = Some(SoftDeleteFilter::OnlyDeleted);
        }
        self
    }

    #[must_use]
    pub fn take(mut self, limit: usize) -> Self {
        self.spec.limit = Some(limit);
        self
    }

    /// Matches in backend order.
    pub fn get(&self) -> Result<Vec<SearchableRecord>> {
        self.engine.search(self.model, &self.spec)
    }

    pub fn keys(&self) -> Result<Vec<RecordKey>> {
        Ok(self.get()?.into_iter().map(|r| r.key().clone()).collect())
    }

    /// Number of matches, capped by `take`.
    pub fn count(&self) -> Result<usize> {
        let total = self.engine.count(self.model, &self.spec)?;
        Ok(self.spec.limit.map_or(total, |limit| total.min(limit)))
    }

    /// One page of matches in backend order.
    pub fn paginate(&self, per_page: usize, page: usize) -> Result<Page<SearchableRecord>> {
        let per_page = per_page.max(1);
        let page = page.max(1);
        let total = self.count()?;

        let offset = (page - 1).saturating_mul(per_page);
        let remaining = total.saturating_sub(offset);
        let items = if remaining == 0 {
            Vec::new()
        } else {
            let spec = QuerySpec {
                limit: Some(per_page.min(remaining)),
                offset,
                ..self.spec.clone()
            };
            self.engine.search(self.model, &spec)?
        };
        Ok(Page::new(items, total, per_page, page))
    }

    /// Matches ordered by descending relevance. Equal scores keep backend
    /// order. Uses [`DefaultScorer`] when no scorer is given.
    pub fn get_ranked(&self, scorer: Option<&dyn RelevanceScorer>) -> Result<Vec<SearchableRecord>> {
        let records = self.get()?;
        Ok(rank_records(records, &self.spec.query, scorer.unwrap_or(&DefaultScorer)))
    }

    /// The most relevant match.
    pub fn first_ranked(&self, scorer: Option<&dyn RelevanceScorer>) -> Result<Option<SearchableRecord>> {
        Ok(self.get_ranked(scorer)?.into_iter().next())
    }

    /// One page of relevance-ordered matches.
    pub fn paginate_ranked(
        &self,
        per_page: usize,
        page: usize,
        scorer: Option<&dyn RelevanceScorer>,
    ) -> Result<Page<SearchableRecord>> {
        Ok(Page::slice(self.get_ranked(scorer)?, per_page, page))
    }
}
