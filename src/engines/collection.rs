//! Linear in-memory scan over a model's records.

use crate::core::{Attributes, SearchableRecord, value_text};
use crate::error::Result;
use crate::models::SearchableModel;

use super::{Engine, QuerySpec};

/// Matches by scanning every record's searchable projection.
///
/// Matching is case-insensitive. A `%` in the query acts like the SQL `LIKE`
/// wildcard, so `quick% %fox` matches text where `quick` appears before
/// `fox`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionEngine;

impl Engine for CollectionEngine {
    fn name(&self) -> &'static str {
        "collection"
    }

    fn search(&self, model: &dyn SearchableModel, spec: &QuerySpec) -> Result<Vec<SearchableRecord>> {
        let matched: Vec<SearchableRecord> = model
            .all_records(spec.soft_delete)?
            .into_iter()
            .filter(|record| spec.admits(record))
            .filter(|record| matches_query(&model.to_searchable_array(record), &spec.query))
            .collect();
        Ok(spec.window(matched))
    }
}

/// Whether any value of a searchable projection matches `query`.
/// An empty query matches everything.
pub fn matches_query(values: &Attributes, query: &str) -> bool {
    let pattern = query.trim().to_lowercase();
    if pattern.is_empty() {
        return true;
    }
    values
        .values()
        .any(|value| like_match(&value_text(value).to_lowercase(), &pattern))
}

/// `%`-segmented containment: every non-empty segment must appear, in order.
fn like_match(haystack: &str, pattern: &str) -> bool {
    let mut rest = haystack;
    for segment in pattern.split('%').filter(|s| !s.is_empty()) {
        match rest.find(segment) {
            Some(pos) => rest = &rest[pos + segment.len()..],
            None => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ModelDescriptor;
    use crate::engines::SoftDeleteFilter;
    use crate::models::MemoryModel;
    use serde_json::json;

    fn model() -> MemoryModel {
        let descriptor = ModelDescriptor::new("Post", "posts")
            .searchable(["title", "body"])
            .soft_deletes();
        MemoryModel::from_rows(
            descriptor,
            [
                json!({ "id": 1, "title": "Quick brown fox", "body": "jumps" }),
                json!({ "id": 2, "title": "Lazy dog", "body": "sleeps" }),
                json!({ "id": 3, "title": "Fox news", "body": "old", "deleted_at": "2024-01-01" }),
            ],
        )
    }

    fn keys(records: &[SearchableRecord]) -> Vec<String> {
        records.iter().map(|r| r.key().to_string()).collect()
    }

    #[test]
    fn like_segments_match_in_order() {
        assert!(like_match("the quick brown fox", "quick% %fox"));
        assert!(!like_match("the fox is quick", "quick% %fox"));
        assert!(like_match("anything", "%"));
    }

    #[test]
    fn search_is_case_insensitive() {
        let spec = QuerySpec {
            soft_delete: Some(SoftDeleteFilter::Excluded),
            ..QuerySpec::new("FOX", "posts")
        };
        let found = CollectionEngine.search(&model(), &spec).unwrap();
        assert_eq!(keys(&found), vec!["1"]);
    }

    #[test]
    fn soft_delete_filters_apply() {
        let mut spec = QuerySpec::new("fox", "posts");
        spec.soft_delete = Some(SoftDeleteFilter::OnlyDeleted);
        assert_eq!(keys(&CollectionEngine.search(&model(), &spec).unwrap()), vec!["3"]);

        spec.soft_delete = Some(SoftDeleteFilter::Included);
        assert_eq!(keys(&CollectionEngine.search(&model(), &spec).unwrap()), vec!["1", "3"]);
    }

    #[test]
    fn empty_query_matches_all_with_window() {
        let spec = QuerySpec {
            limit: Some(1),
            offset: 1,
            ..QuerySpec::new("", "posts")
        };
        assert_eq!(keys(&CollectionEngine.search(&model(), &spec).unwrap()), vec!["2"]);
        assert_eq!(CollectionEngine.count(&model(), &spec).unwrap(), 3);
    }

    #[test]
    fn where_clauses_narrow_results() {
        let spec = QuerySpec {
            wheres: vec![("body".into(), json!("sleeps"))],
            ..QuerySpec::new("", "posts")
        };
        assert_eq!(keys(&CollectionEngine.search(&model(), &spec).unwrap()), vec!["2"]);
    }
}
