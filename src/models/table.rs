use std::sync::Arc;

use rusqlite::types::Value as SqlValue;

use crate::core::{ModelDescriptor, RecordKey, SearchableRecord};
use crate::engines::SoftDeleteFilter;
use crate::error::Result;
use crate::index::schema::quote_ident;
use crate::storage::SqlTable;

use super::SearchableModel;

/// Records stored in an SQLite table.
#[derive(Debug, Clone)]
pub struct TableModel {
    descriptor: Arc<ModelDescriptor>,
    table: SqlTable,
}

impl TableModel {
    pub fn new(descriptor: ModelDescriptor, table: SqlTable) -> Self {
        Self {
            descriptor: descriptor.into_shared(),
            table,
        }
    }
}

impl SearchableModel for TableModel {
    fn descriptor(&self) -> &Arc<ModelDescriptor> {
        &self.descriptor
    }

    fn all_records(&self, filter: Option<SoftDeleteFilter>) -> Result<Vec<SearchableRecord>> {
        let sql = format!("SELECT * FROM {} ORDER BY rowid", quote_ident(&self.table.table));
        let rows = self.table.query(&sql, &[])?;
        Ok(self
            .hydrate(rows)?
            .into_iter()
            .filter(|record| filter.is_none_or(|f| f.admits(record)))
            .collect())
    }

    fn records_by_ids(&self, ids: &[RecordKey]) -> Result<Vec<SearchableRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT * FROM {} WHERE {} IN ({placeholders}) ORDER BY rowid",
            quote_ident(&self.table.table),
            quote_ident(&self.descriptor.key_name),
        );
        let params: Vec<SqlValue> = ids
            .iter()
            .map(|id| match id {
                RecordKey::Int(n) => SqlValue::Integer(*n),
                RecordKey::Str(s) => SqlValue::Text(s.clone()),
            })
            .collect();
        let rows = self.table.query(&sql, &params)?;
        self.hydrate(rows)
    }

    fn sql_table(&self) -> Result<Option<SqlTable>> {
        Ok(Some(self.table.clone()))
    }
}
