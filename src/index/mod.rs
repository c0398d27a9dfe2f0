//! Materialized indexes over filesystem content.

pub mod registry;
pub mod schema;
pub mod virtual_index;

pub use registry::IndexRegistry;
pub use schema::{Column, ColumnType, PrimaryKey, TableSchema, resolve_schema};
pub use virtual_index::{IndexKey, IndexSettings, IndexSource, IndexStatus, Phase, VirtualIndex};
