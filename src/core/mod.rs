//! Core record types and identifier helpers

pub mod record;
pub mod slug;

pub use record::{
    Attributes, DELETED_AT, Extractor, KeyType, ModelDescriptor, RecordKey, SearchableRecord,
    SearchableShape, attribute_path, normalize_path, value_text,
};
pub use slug::{slug, slugify_identifier};
