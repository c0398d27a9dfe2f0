//! Multi-handler search, as run by a site search widget.
//!
//! Each [`SearchHandler`] pairs a model with a formatter that turns matching
//! records into display entries. [`run`] searches every handler, paginates
//! and optionally groups the formatted entries. Rendering is left to the
//! caller.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ComponentConfig;
use crate::core::SearchableRecord;
use crate::error::Result;
use crate::models::SearchableModel;

use super::builder::Page;
use super::context::SearchContext;
use super::tokenizer::{to_wildcard_query, tokenize};

/// Group used for entries that name none.
pub const DEFAULT_GROUP: &str = "Other results";

/// Formats a matching record for display. Returning `None` drops it.
pub type Formatter = Arc<dyn Fn(&SearchableRecord, &str) -> Option<ResultEntry> + Send + Sync>;

/// One display entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultEntry {
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ResultEntry {
    pub fn new(title: impl Into<String>, description: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            url: url.into(),
            group: None,
            label: None,
            image: None,
        }
    }

    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// A named search source.
#[derive(Clone)]
pub struct SearchHandler {
    pub id: String,
    pub name: String,
    pub model: Arc<dyn SearchableModel>,
    pub formatter: Formatter,
}

impl std::fmt::Debug for SearchHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchHandler")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl SearchHandler {
    pub fn new<F>(
        id: impl Into<String>,
        name: impl Into<String>,
        model: Arc<dyn SearchableModel>,
        formatter: F,
    ) -> Self
    where
        F: Fn(&SearchableRecord, &str) -> Option<ResultEntry> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            name: name.into(),
            model,
            formatter: Arc::new(formatter),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultGroup {
    pub group: String,
    pub results: Vec<ResultEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HandlerEntries {
    Flat(Vec<ResultEntry>),
    Grouped(Vec<ResultGroup>),
}

impl HandlerEntries {
    pub fn len(&self) -> usize {
        match self {
            Self::Flat(entries) => entries.len(),
            Self::Grouped(groups) => groups.iter().map(|g| g.results.len()).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Results of one handler, with pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerResults {
    pub id: String,
    pub name: String,
    pub results: HandlerEntries,
    /// Entries on this page before formatting.
    pub count: usize,
    pub total: usize,
    pub pages: usize,
    pub current_page: usize,
    /// 1-based, 0 when empty.
    pub from: usize,
    pub to: usize,
}

impl HandlerResults {
    fn empty(handler: &SearchHandler) -> Self {
        Self {
            id: handler.id.clone(),
            name: handler.name.clone(),
            results: HandlerEntries::Flat(Vec::new()),
            count: 0,
            total: 0,
            pages: 1,
            current_page: 1,
            from: 0,
            to: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResponse {
    pub query: String,
    /// Set only when a search actually ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_handler: Option<String>,
    pub results: Vec<HandlerResults>,
    pub count: usize,
    pub total: usize,
    /// Whether renderers should print each entry's excerpt.
    pub show_excerpts: bool,
}

impl SearchResponse {
    fn no_query(query: &str, options: &ComponentConfig) -> Self {
        Self {
            query: query.to_string(),
            selected_handler: None,
            results: Vec::new(),
            count: 0,
            total: 0,
            show_excerpts: options.show_excerpts,
        }
    }

    /// Whether the response short-circuited without searching.
    pub fn is_no_query(&self) -> bool {
        self.selected_handler.is_none()
    }
}

/// Run `query` against every handler.
///
/// `page` applies only to the handler named by `handler_page`; every other
/// handler shows its first page. A blank query, no handlers, or (in fuzzy
/// mode) a query of nothing but stop words returns an empty response
/// without touching any engine.
pub fn run(
    ctx: &SearchContext,
    handlers: &[SearchHandler],
    options: &ComponentConfig,
    query: &str,
    page: usize,
    handler_page: Option<&str>,
) -> Result<SearchResponse> {
    if handlers.is_empty() || query.trim().is_empty() {
        return Ok(SearchResponse::no_query(query, options));
    }

    let processed = if options.fuzzy_search {
        let terms = tokenize(query);
        if terms.is_empty() {
            debug!(query, "query reduced to nothing; skipping search");
            return Ok(SearchResponse::no_query(query, options));
        }
        to_wildcard_query(&terms)
    } else {
        query.to_string()
    };

    let mut response = SearchResponse {
        query: query.to_string(),
        selected_handler: handler_page
            .map(str::to_string)
            .or_else(|| handlers.first().map(|h| h.id.clone())),
        results: Vec::with_capacity(handlers.len()),
        count: 0,
        total: 0,
        show_excerpts: options.show_excerpts,
    };

    for handler in handlers {
        let mut search = ctx.search(handler.model.as_ref(), &processed)?;
        if options.limit > 0 {
            search = search.take(options.limit);
        }
        let records = if options.order_by_relevance {
            search.get_ranked(None)?
        } else {
            search.get()?
        };

        if records.is_empty() {
            response.results.push(HandlerResults::empty(handler));
            continue;
        }

        let current = if handler_page == Some(handler.id.as_str()) { page } else { 1 };
        let paginated = Page::slice(records, options.per_page, current);

        let entries: Vec<ResultEntry> = paginated
            .items
            .iter()
            .filter_map(|record| (handler.formatter)(record, query))
            .collect();
        if entries.is_empty() {
            warn!(handler = %handler.id, "formatter dropped every result");
            continue;
        }

        response.count += paginated.count();
        response.total += paginated.total;

        let results = if options.grouping {
            HandlerEntries::Grouped(group_entries(entries, options.per_group))
        } else {
            HandlerEntries::Flat(entries)
        };
        response.results.push(HandlerResults {
            id: handler.id.clone(),
            name: handler.name.clone(),
            results,
            count: paginated.count(),
            total: paginated.total,
            pages: paginated.last_page,
            current_page: paginated.current_page,
            from: paginated.from.unwrap_or(0),
            to: paginated.to.unwrap_or(0),
        });
    }

    Ok(response)
}

/// Group entries in first-seen group order, keeping at most `per_group`
/// entries per group.
pub fn group_entries(entries: Vec<ResultEntry>, per_group: usize) -> Vec<ResultGroup> {
    let mut groups: Vec<ResultGroup> = Vec::new();
    for entry in entries {
        let name = entry.group.clone().unwrap_or_else(|| DEFAULT_GROUP.to_string());
        let index = match groups.iter().position(|g| g.group == name) {
            Some(index) => index,
            None => {
                groups.push(ResultGroup {
                    group: name,
                    results: Vec::new(),
                });
                groups.len() - 1
            }
        };
        if groups[index].results.len() < per_group {
            groups[index].results.push(entry);
        }
    }
    groups
}
