//! Weighted multi-field, multi-term relevance scoring.
//!
//! Fields declared earlier and terms appearing earlier dominate: field
//! weights are powers of two and a shared multiplier halves on every
//! (field, term) pair visited.

use std::cmp::Ordering;

use crate::core::SearchableRecord;

use super::tokenizer::split_words;

/// Field weights in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingMap {
    entries: Vec<(String, u64)>,
}

impl RankingMap {
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(field, weight)| (field.as_str(), *weight))
    }

    pub fn weight(&self, field: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, weight)| *weight)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the field weight map for an ordered searchable-field list.
///
/// The first of `k` fields weighs `2^(k-1)` and the last weighs `1`. Returns
/// `None` for an empty list. Weights saturate at `2^63`.
///
/// ```
/// use cms_search::search::ranking::build_ranking_map;
///
/// let map = build_ranking_map(&["title", "excerpt", "body"]).unwrap();
/// let weights: Vec<u64> = map.iter().map(|(_, w)| w).collect();
/// assert_eq!(weights, vec![4, 2, 1]);
/// ```
pub fn build_ranking_map<S: AsRef<str>>(fields: &[S]) -> Option<RankingMap> {
    if fields.is_empty() {
        return None;
    }

    let last = fields.len() - 1;
    let entries = fields
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let exponent = (last - idx).min(63) as u32;
            (field.as_ref().to_string(), 1u64 << exponent)
        })
        .collect();

    Some(RankingMap { entries })
}

/// Score a record against ordered query terms.
///
/// Records whose type declares no searchable fields always score zero.
pub fn score<S: AsRef<str>>(record: &SearchableRecord, terms: &[S]) -> f64 {
    let Some(map) = build_ranking_map(record.model().searchable_fields()) else {
        return 0.0;
    };

    let lowered: Vec<String> = terms.iter().map(|t| t.as_ref().to_lowercase()).collect();

    let mut relevance = 0.0;
    let mut multiplier = 2.0_f64;
    for (field, weight) in map.iter() {
        let haystack = record.text(field).to_lowercase();
        for term in &lowered {
            multiplier /= 2.0;
            if term.is_empty() {
                continue;
            }
            let occurrences = haystack.matches(term.as_str()).count();
            relevance += occurrences as f64 * weight as f64 * multiplier;
        }
    }
    relevance
}

/// Computes a relevance score for a record given the raw query.
pub trait RelevanceScorer {
    fn score(&self, record: &SearchableRecord, query: &str) -> f64;
}

impl<F> RelevanceScorer for F
where
    F: Fn(&SearchableRecord, &str) -> f64,
{
    fn score(&self, record: &SearchableRecord, query: &str) -> f64 {
        self(record, query)
    }
}

/// The built-in scorer: simple word split, then [`score`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultScorer;

impl RelevanceScorer for DefaultScorer {
    fn score(&self, record: &SearchableRecord, query: &str) -> f64 {
        score(record, &split_words(query))
    }
}

/// Annotate every record with its relevance and stable-sort descending.
///
/// Records with equal scores keep the order they arrived in.
pub fn rank_records(
    mut records: Vec<SearchableRecord>,
    query: &str,
    scorer: &dyn RelevanceScorer,
) -> Vec<SearchableRecord> {
    for record in &mut records {
        let relevance = scorer.score(record, query);
        record.set_relevance(relevance);
    }
    records.sort_by(|a, b| descending(a.relevance(), b.relevance()));
    records
}

fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    b.unwrap_or(0.0).total_cmp(&a.unwrap_or(0.0))
}
