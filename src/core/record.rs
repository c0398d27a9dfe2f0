//! Searchable records and the per-type descriptors that drive indexing
//! and ranking.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute map of a record. Insertion ordered.
pub type Attributes = Map<String, Value>;

/// Custom projection used by [`SearchableShape::Custom`].
pub type Extractor = Arc<dyn Fn(&SearchableRecord) -> Attributes + Send + Sync>;

/// Attribute that marks a record as soft-deleted when non-null.
pub const DELETED_AT: &str = "deleted_at";

/// Unique key of a record: an integer row id or a string key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordKey {
    Int(i64),
    Str(String),
}

impl RecordKey {
    /// Read a key out of an attribute value.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Int),
            Value::String(s) => Some(Self::Str(s.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(n) => Value::from(*n),
            Self::Str(s) => Value::from(s.clone()),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordKey {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for RecordKey {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for RecordKey {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Declared type of a model's primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    Int,
    String,
}

/// How a record type projects itself into an indexable map.
///
/// Resolved once when the [`ModelDescriptor`] is built.
#[derive(Clone)]
pub enum SearchableShape {
    /// A caller-supplied extraction function.
    Custom(Extractor),
    /// An ordered list of attribute names, most important first.
    FieldList(Vec<String>),
    /// Every attribute of the record.
    FullDump,
}

impl fmt::Debug for SearchableShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(_) => f.write_str("Custom(..)"),
            Self::FieldList(fields) => f.debug_tuple("FieldList").field(fields).finish(),
            Self::FullDump => f.write_str("FullDump"),
        }
    }
}

/// Static description of a searchable record type.
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    pub name: String,
    pub table: String,
    pub key_name: String,
    pub key_type: KeyType,
    pub incrementing: bool,
    pub soft_delete: bool,
    searchable: Vec<String>,
    shape: SearchableShape,
}

impl ModelDescriptor {
    /// Describe a record type with an auto-incrementing integer `id` key.
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            key_name: "id".to_string(),
            key_type: KeyType::Int,
            incrementing: true,
            soft_delete: false,
            searchable: Vec::new(),
            shape: SearchableShape::FullDump,
        }
    }

    /// Use a different primary key. String keys never auto-increment.
    #[must_use]
    pub fn with_key(mut self, name: impl Into<String>, key_type: KeyType) -> Self {
        self.key_name = name.into();
        self.key_type = key_type;
        self.incrementing = key_type == KeyType::Int;
        self
    }

    #[must_use]
    pub const fn incrementing(mut self, incrementing: bool) -> Self {
        self.incrementing = incrementing;
        self
    }

    /// Declare the searchable fields, most important first.
    #[must_use]
    pub fn searchable<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.searchable = fields.into_iter().map(Into::into).collect();
        self.resolve_shape();
        self
    }

    /// Supply a custom projection. Declared searchable fields still drive
    /// ranking.
    #[must_use]
    pub fn with_extractor<F>(mut self, extractor: F) -> Self
    where
        F: Fn(&SearchableRecord) -> Attributes + Send + Sync + 'static,
    {
        self.shape = SearchableShape::Custom(Arc::new(extractor));
        self
    }

    #[must_use]
    pub const fn soft_deletes(mut self) -> Self {
        self.soft_delete = true;
        self
    }

    /// A custom extractor, once set, wins over the field list.
    fn resolve_shape(&mut self) {
        if matches!(self.shape, SearchableShape::Custom(_)) {
            return;
        }
        self.shape = if self.searchable.is_empty() {
            SearchableShape::FullDump
        } else {
            SearchableShape::FieldList(self.searchable.clone())
        };
    }

    /// Ordered searchable fields used for ranking.
    pub fn searchable_fields(&self) -> &[String] {
        &self.searchable
    }

    pub const fn shape(&self) -> &SearchableShape {
        &self.shape
    }

    /// Wrap into the shared handle records hold.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

/// A content item as seen by the search layer.
///
/// Records are never mutated by search operations; the relevance score is a
/// transient annotation set while ranking.
#[derive(Debug, Clone)]
pub struct SearchableRecord {
    key: RecordKey,
    attributes: Attributes,
    model: Arc<ModelDescriptor>,
    relevance: Option<f64>,
}

impl SearchableRecord {
    pub const fn new(key: RecordKey, attributes: Attributes, model: Arc<ModelDescriptor>) -> Self {
        Self {
            key,
            attributes,
            model,
            relevance: None,
        }
    }

    /// Build a record whose key is read from the model's key attribute.
    pub fn from_attributes(attributes: Attributes, model: Arc<ModelDescriptor>) -> Option<Self> {
        let key = attributes
            .get(&model.key_name)
            .and_then(RecordKey::from_value)?;
        Some(Self::new(key, attributes, model))
    }

    pub const fn key(&self) -> &RecordKey {
        &self.key
    }

    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn model(&self) -> &ModelDescriptor {
        &self.model
    }

    pub const fn model_handle(&self) -> &Arc<ModelDescriptor> {
        &self.model
    }

    pub const fn relevance(&self) -> Option<f64> {
        self.relevance
    }

    pub(crate) const fn set_relevance(&mut self, relevance: f64) {
        self.relevance = Some(relevance);
    }

    /// Look up an attribute, following dot or bracket notation into nested
    /// objects.
    pub fn value(&self, field: &str) -> Option<&Value> {
        attribute_path(&self.attributes, field)
    }

    /// Text rendering of an attribute used for matching and scoring.
    pub fn text(&self, field: &str) -> String {
        self.value(field).map(value_text).unwrap_or_default()
    }

    /// Whether the record carries a non-null soft-delete marker.
    pub fn is_trashed(&self) -> bool {
        self.attributes
            .get(DELETED_AT)
            .is_some_and(|value| !value.is_null())
    }

    /// The indexable projection of this record, following the model's shape.
    pub fn to_searchable_array(&self) -> Attributes {
        match self.model.shape() {
            SearchableShape::Custom(extractor) => extractor(self),
            SearchableShape::FieldList(fields) => {
                let mut out = Attributes::new();
                for field in fields {
                    let path = normalize_path(field);
                    let value = self.value(&path).cloned().unwrap_or(Value::Null);
                    set_path(&mut out, &path, value);
                }
                out
            }
            SearchableShape::FullDump => self.attributes.clone(),
        }
    }
}

/// Render any JSON value as searchable text.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Look up `field` in an attribute map, following dot or bracket notation
/// into nested objects. An exact top-level key wins over a path.
pub fn attribute_path<'a>(attributes: &'a Attributes, field: &str) -> Option<&'a Value> {
    if let Some(value) = attributes.get(field) {
        return Some(value);
    }
    get_path(attributes, &normalize_path(field))
}

/// `meta[title][en]` -> `meta.title.en`
pub fn normalize_path(field: &str) -> String {
    field.replace('[', ".").replace(']', "")
}

fn get_path<'a>(attributes: &'a Attributes, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = attributes.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

fn set_path(target: &mut Attributes, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            target.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Attributes::new()));
            if !entry.is_object() {
                *entry = Value::Object(Attributes::new());
            }
            if let Value::Object(inner) = entry {
                set_path(inner, rest, value);
            }
        }
    }
}
