//! Filesystem-backed content.
//!
//! Theme objects (pages, partials, layouts, content files) have no query
//! engine of their own. A [`ContentEnumerator`] lists and loads them so the
//! materializer can copy them into a store.

pub mod theme;

use std::path::PathBuf;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::Attributes;
use crate::error::Result;

pub use theme::ThemeContent;

/// One content file and its parsed attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Path relative to the object directory, `/`-separated.
    pub file_name: String,
    pub attributes: Attributes,
}

impl ContentItem {
    pub fn new(file_name: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            file_name: file_name.into(),
            attributes,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// Lists and loads content items of one object type.
pub trait ContentEnumerator: Send + Sync {
    /// Object directory name, e.g. `pages` or `content/static`.
    fn type_name(&self) -> &str;

    /// Every item in `theme`. With `include_variants`, nested
    /// subdirectories are walked too.
    fn list_all(&self, theme: &str, include_variants: bool) -> Result<Vec<ContentItem>>;

    /// Load one item by its raw file name.
    fn load(&self, theme: &str, file_name: &str) -> Result<Option<ContentItem>>;

    /// File whose modification invalidates every materialized index of this
    /// type.
    fn definition_path(&self) -> Option<PathBuf> {
        None
    }

    /// Newest modification time among the type's content in `theme`.
    fn last_modified(&self, _theme: &str) -> Option<SystemTime> {
        None
    }
}
