//! cms-search - Full-text search for CMS content
//!
//! Records are searched through pluggable [`engines`]. Theme content files,
//! which have no table of their own, are materialized on demand into a
//! per-theme SQLite store by [`index::VirtualIndex`] so that SQL-backed
//! engines can query them like any other table.

pub mod app;
pub mod cli;
pub mod config;
pub mod content;
pub mod core;
pub mod engines;
pub mod error;
pub mod index;
pub mod models;
pub mod search;
pub mod storage;

pub use error::{Result, SearchError};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
