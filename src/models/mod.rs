//! Record sources the engines search over.
//!
//! A [`SearchableModel`] owns the records of one type and knows how to
//! project them for indexing. Three sources ship with the crate:
//! [`MemoryModel`] (records held in memory), [`TableModel`] (an SQLite
//! table) and [`VirtualContentModel`] (theme content, materialized on
//! demand).

pub mod memory;
pub mod table;
pub mod virtual_content;

use std::sync::Arc;

use crate::config::SearchConfig;
use crate::core::{Attributes, ModelDescriptor, RecordKey, SearchableRecord};
use crate::engines::SoftDeleteFilter;
use crate::error::Result;
use crate::index::VirtualIndex;
use crate::storage::SqlTable;

pub use memory::MemoryModel;
pub use table::TableModel;
pub use virtual_content::{ContentModelOptions, VirtualContentModel};

pub trait SearchableModel: Send + Sync {
    fn descriptor(&self) -> &Arc<ModelDescriptor>;

    /// Index name: configured prefix plus the table name.
    fn searchable_as(&self, config: &SearchConfig) -> String {
        format!("{}{}", config.prefix, self.descriptor().table)
    }

    /// Indexable projection of `record`.
    fn to_searchable_array(&self, record: &SearchableRecord) -> Attributes {
        record.to_searchable_array()
    }

    /// Every record the filter admits, in source order. `None` means the
    /// model does not soft-delete and everything is returned.
    fn all_records(&self, filter: Option<SoftDeleteFilter>) -> Result<Vec<SearchableRecord>>;

    /// Records with the given keys, in source order.
    fn records_by_ids(&self, ids: &[RecordKey]) -> Result<Vec<SearchableRecord>>;

    /// Backing SQL table, for engines that query SQL directly.
    fn sql_table(&self) -> Result<Option<SqlTable>> {
        Ok(None)
    }

    /// Turn raw rows from [`sql_table`](Self::sql_table) into records.
    /// Rows without a usable key are skipped.
    fn hydrate(&self, rows: Vec<Attributes>) -> Result<Vec<SearchableRecord>> {
        let descriptor = self.descriptor();
        Ok(rows
            .into_iter()
            .filter_map(|row| SearchableRecord::from_attributes(row, Arc::clone(descriptor)))
            .collect())
    }

    /// Materialized index behind the model, if any.
    fn virtual_index(&self) -> Option<Arc<VirtualIndex>> {
        None
    }

    fn soft_deletes(&self) -> bool {
        self.descriptor().soft_delete
    }
}
