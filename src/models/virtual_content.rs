//! Theme content exposed as a searchable model.
//!
//! Content files are materialized into a [`VirtualIndex`] store so the
//! database engine can query them. Records are keyed by the slugged file
//! name; their attributes are loaded fresh from the enumerator.

use std::sync::Arc;

use serde_json::Value;

use crate::config::SearchConfig;
use crate::content::ContentEnumerator;
use crate::core::{
    Attributes, KeyType, ModelDescriptor, RecordKey, SearchableRecord, slugify_identifier,
};
use crate::engines::SoftDeleteFilter;
use crate::error::Result;
use crate::index::virtual_index::{KEY_COLUMN, PATH_COLUMN};
use crate::index::{ColumnType, IndexKey, IndexRegistry, IndexSource, VirtualIndex};
use crate::storage::SqlTable;

use super::SearchableModel;

/// How a content type is indexed.
#[derive(Debug, Clone)]
pub struct ContentModelOptions {
    /// Most important first.
    pub searchable: Vec<String>,
    /// Explicit column types; inferred from the first item when empty.
    pub schema: Vec<(String, ColumnType)>,
    pub include_variants: bool,
}

impl Default for ContentModelOptions {
    fn default() -> Self {
        Self {
            searchable: vec!["fileName".into(), "title".into(), "content".into()],
            schema: vec![
                ("fileName".into(), ColumnType::String),
                ("title".into(), ColumnType::String),
                ("content".into(), ColumnType::Text),
            ],
            include_variants: false,
        }
    }
}

pub struct VirtualContentModel {
    descriptor: Arc<ModelDescriptor>,
    enumerator: Arc<dyn ContentEnumerator>,
    theme: String,
    index: Arc<VirtualIndex>,
}

impl std::fmt::Debug for VirtualContentModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualContentModel")
            .field("type", &self.enumerator.type_name())
            .field("theme", &self.theme)
            .field("index", &self.index.identifier())
            .finish()
    }
}

impl VirtualContentModel {
    /// Register (or reuse) the index for this content type and theme.
    pub fn new(
        registry: &IndexRegistry,
        enumerator: Arc<dyn ContentEnumerator>,
        theme: impl Into<String>,
        options: ContentModelOptions,
    ) -> Self {
        let theme = theme.into();
        let type_name = enumerator.type_name().to_string();
        let descriptor = ModelDescriptor::new(type_name.clone(), type_name.clone())
            .with_key(KEY_COLUMN, KeyType::String)
            .searchable(options.searchable.clone())
            .into_shared();

        let key = IndexKey::new(type_name, theme.clone());
        let source = IndexSource {
            enumerator: Arc::clone(&enumerator),
            fields: options.searchable,
            schema: options.schema,
            include_variants: options.include_variants,
        };
        let index = registry.get_or_create(&key, |settings| {
            VirtualIndex::new(key.clone(), source, settings)
        });

        Self {
            descriptor,
            enumerator,
            theme,
            index,
        }
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn index(&self) -> &Arc<VirtualIndex> {
        &self.index
    }

    /// Load the content item behind a store row.
    fn record_for_row(&self, row: &Attributes) -> Result<Option<SearchableRecord>> {
        let path = row
            .get(PATH_COLUMN)
            .or_else(|| row.get(KEY_COLUMN))
            .and_then(Value::as_str);
        let Some(path) = path else {
            return Ok(None);
        };
        let Some(item) = self.enumerator.load(&self.theme, path)? else {
            return Ok(None);
        };
        let key = RecordKey::Str(slugify_identifier(&item.file_name));
        Ok(Some(SearchableRecord::new(key, item.attributes, Arc::clone(&self.descriptor))))
    }
}

impl SearchableModel for VirtualContentModel {
    fn descriptor(&self) -> &Arc<ModelDescriptor> {
        &self.descriptor
    }

    /// Prefix plus `slug(theme-type)`.
    fn searchable_as(&self, config: &SearchConfig) -> String {
        format!("{}{}", config.prefix, self.index.identifier())
    }

    /// The file name is always present and always slugged.
    fn to_searchable_array(&self, record: &SearchableRecord) -> Attributes {
        let mut projected = record.to_searchable_array();
        projected.insert(KEY_COLUMN.to_string(), Value::from(record.key().to_string()));
        projected
    }

    fn all_records(&self, _filter: Option<SoftDeleteFilter>) -> Result<Vec<SearchableRecord>> {
        self.hydrate(self.index.records()?)
    }

    fn records_by_ids(&self, ids: &[RecordKey]) -> Result<Vec<SearchableRecord>> {
        let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
        self.hydrate(self.index.find_by_ids(&ids)?)
    }

    fn sql_table(&self) -> Result<Option<SqlTable>> {
        Ok(Some(self.index.sql_table()?))
    }

    /// Rows whose file has disappeared since the last rebuild are skipped.
    fn hydrate(&self, rows: Vec<Attributes>) -> Result<Vec<SearchableRecord>> {
        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(record) = self.record_for_row(row)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn virtual_index(&self) -> Option<Arc<VirtualIndex>> {
        Some(Arc::clone(&self.index))
    }
}
