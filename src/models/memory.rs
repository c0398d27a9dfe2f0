use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::core::{Attributes, ModelDescriptor, RecordKey, SearchableRecord};
use crate::engines::SoftDeleteFilter;
use crate::error::Result;

use super::SearchableModel;

/// Records held in memory, in insertion order.
#[derive(Debug)]
pub struct MemoryModel {
    descriptor: Arc<ModelDescriptor>,
    rows: RwLock<Vec<Attributes>>,
}

impl MemoryModel {
    pub fn new(descriptor: ModelDescriptor) -> Self {
        Self {
            descriptor: descriptor.into_shared(),
            rows: RwLock::new(Vec::new()),
        }
    }

    /// Build from JSON objects; other values are ignored.
    pub fn from_rows<I>(descriptor: ModelDescriptor, rows: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let model = Self::new(descriptor);
        for row in rows {
            if let Value::Object(attributes) = row {
                model.insert(attributes);
            }
        }
        model
    }

    /// Insert a row, replacing any row with the same key. Rows without a key
    /// get the next integer key when the model auto-increments.
    pub fn insert(&self, mut attributes: Attributes) -> Option<RecordKey> {
        let key_name = &self.descriptor.key_name;
        let mut rows = self.rows.write();

        let key = match attributes.get(key_name).and_then(RecordKey::from_value) {
            Some(key) => key,
            None if self.descriptor.incrementing => {
                let next = rows
                    .iter()
                    .filter_map(|row| row.get(key_name).and_then(Value::as_i64))
                    .max()
                    .unwrap_or(0)
                    + 1;
                attributes.insert(key_name.clone(), Value::from(next));
                RecordKey::Int(next)
            }
            None => return None,
        };

        let existing = rows
            .iter()
            .position(|row| row.get(key_name).and_then(RecordKey::from_value).as_ref() == Some(&key));
        match existing {
            Some(pos) => rows[pos] = attributes,
            None => rows.push(attributes),
        }
        Some(key)
    }

    pub fn remove(&self, key: &RecordKey) -> bool {
        let key_name = &self.descriptor.key_name;
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|row| row.get(key_name).and_then(RecordKey::from_value).as_ref() != Some(key));
        rows.len() != before
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    fn records(&self) -> Vec<SearchableRecord> {
        self.rows
            .read()
            .iter()
            .filter_map(|row| SearchableRecord::from_attributes(row.clone(), Arc::clone(&self.descriptor)))
            .collect()
    }
}

impl SearchableModel for MemoryModel {
    fn descriptor(&self) -> &Arc<ModelDescriptor> {
        &self.descriptor
    }

    fn all_records(&self, filter: Option<SoftDeleteFilter>) -> Result<Vec<SearchableRecord>> {
        Ok(self
            .records()
            .into_iter()
            .filter(|record| filter.is_none_or(|f| f.admits(record)))
            .collect())
    }

    fn records_by_ids(&self, ids: &[RecordKey]) -> Result<Vec<SearchableRecord>> {
        Ok(self
            .records()
            .into_iter()
            .filter(|record| ids.contains(record.key()))
            .collect())
    }
}
