//! Process-wide map of materialized indexes.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::virtual_index::{IndexKey, IndexSettings, VirtualIndex};

/// Owns at most one [`VirtualIndex`] per key.
///
/// Creation happens under the map lock, so concurrent callers asking for
/// the same key share one index.
#[derive(Debug, Default)]
pub struct IndexRegistry {
    settings: IndexSettings,
    indexes: Mutex<HashMap<IndexKey, Arc<VirtualIndex>>>,
}

impl IndexRegistry {
    pub fn new(settings: IndexSettings) -> Self {
        Self {
            settings,
            indexes: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &IndexSettings {
        &self.settings
    }

    /// Existing index for `key`, or the one `create` builds.
    pub fn get_or_create<F>(&self, key: &IndexKey, create: F) -> Arc<VirtualIndex>
    where
        F: FnOnce(&IndexSettings) -> VirtualIndex,
    {
        let mut indexes = self.indexes.lock();
        if let Some(index) = indexes.get(key) {
            return Arc::clone(index);
        }
        let index = Arc::new(create(&self.settings));
        debug!(index = %index.identifier(), "registered materialized index");
        indexes.insert(key.clone(), Arc::clone(&index));
        index
    }

    pub fn get(&self, key: &IndexKey) -> Option<Arc<VirtualIndex>> {
        self.indexes.lock().get(key).cloned()
    }

    /// Mark every registered index stale.
    pub fn invalidate_all(&self) {
        for index in self.indexes.lock().values() {
            index.invalidate();
        }
    }

    pub fn remove(&self, key: &IndexKey) -> Option<Arc<VirtualIndex>> {
        self.indexes.lock().remove(key)
    }

    pub fn len(&self) -> usize {
        self.indexes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ThemeContent;
    use crate::index::IndexSource;

    fn source() -> IndexSource {
        IndexSource {
            enumerator: Arc::new(ThemeContent::new("themes", "pages")),
            fields: vec!["title".into()],
            schema: Vec::new(),
            include_variants: false,
        }
    }

    #[test]
    fn same_key_returns_same_index() {
        let registry = IndexRegistry::default();
        let key = IndexKey::new("pages", "demo");
        let first = registry.get_or_create(&key, |s| VirtualIndex::new(key.clone(), source(), s));
        let second = registry.get_or_create(&key, |_| unreachable!("already registered"));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn distinct_themes_get_distinct_indexes() {
        let registry = IndexRegistry::default();
        for theme in ["one", "two"] {
            let key = IndexKey::new("pages", theme);
            registry.get_or_create(&key, |s| VirtualIndex::new(key.clone(), source(), s));
        }
        assert_eq!(registry.len(), 2);

        registry.invalidate_all();
        let index = registry.get(&IndexKey::new("pages", "one")).unwrap();
        assert!(index.needs_update());

        assert!(registry.remove(&IndexKey::new("pages", "two")).is_some());
        assert_eq!(registry.len(), 1);
    }
}
