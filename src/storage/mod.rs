//! Storage layer for materialized content.
//!
//! A [`ContentStore`] holds one flat table per materialized index. The
//! SQLite implementation lives in [`sqlite`]; [`lock`] provides the advisory
//! file lock taken around rebuilds.

pub mod lock;
pub mod sqlite;

use crate::core::Attributes;
use crate::error::Result;
use crate::index::schema::TableSchema;

pub use lock::StoreLock;
pub use sqlite::{SqlTable, SqliteStore, StoreLocation};

/// Table-level operations the materializer needs from a store.
pub trait ContentStore: Send + Sync {
    /// Create the table. An "already exists" failure counts as success.
    fn create_schema(&self, schema: &TableSchema) -> Result<()>;

    /// Rows whose `key_column` is one of `ids`, in store order.
    fn query_by_id(&self, table: &str, key_column: &str, ids: &[String]) -> Result<Vec<Attributes>>;

    /// Every row, in store order.
    fn all(&self, table: &str) -> Result<Vec<Attributes>>;

    fn drop_table(&self, table: &str) -> Result<()>;

    fn location(&self) -> &StoreLocation;

    /// Discard the table and rebuild it from `schema` and `rows`, all at
    /// once. Returns the number of rows stored.
    fn replace(&self, schema: &TableSchema, rows: &[Attributes]) -> Result<usize>;
}
