//! Query processing, relevance ranking and search entry points.
//!
//! ```text
//! query ─▶ tokenizer ─▶ SearchBuilder ─▶ Engine ─▶ records
//!                            │                        │
//!                            └──── ranking ◀──────────┘
//! ```

pub mod builder;
pub mod context;
pub mod handlers;
pub mod ranking;
pub mod stemmer;
pub mod tokenizer;

pub use builder::{Page, SearchBuilder};
pub use context::{SearchContext, SyncOutcome};
pub use handlers::{ResultEntry, SearchHandler, SearchResponse};
pub use ranking::{DefaultScorer, RankingMap, RelevanceScorer, build_ranking_map, rank_records, score};
pub use tokenizer::{split_words, to_wildcard_query, tokenize};
