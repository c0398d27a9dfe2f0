use std::sync::Arc;

use proptest::prelude::*;
use serde_json::{Map, Value};

use cms_search::core::{ModelDescriptor, RecordKey, SearchableRecord};
use cms_search::search::ranking::{build_ranking_map, score};

fn record(fields: &[&str], values: &[(&str, &str)]) -> SearchableRecord {
    let descriptor = ModelDescriptor::new("Doc", "docs").searchable(fields.iter().copied());
    let mut attributes = Map::new();
    for (name, value) in values {
        attributes.insert((*name).to_string(), Value::from(*value));
    }
    SearchableRecord::new(RecordKey::Int(1), attributes, Arc::new(descriptor))
}

proptest! {
    #[test]
    fn weights_halve_down_the_field_list(fields in prop::collection::vec("[a-z]{1,8}", 1..40)) {
        let map = build_ranking_map(&fields).unwrap();
        let weights: Vec<u64> = map.iter().map(|(_, w)| w).collect();

        prop_assert_eq!(weights.len(), fields.len());
        prop_assert_eq!(weights[0], 1u64 << (fields.len() - 1));
        prop_assert_eq!(*weights.last().unwrap(), 1);
        for pair in weights.windows(2) {
            prop_assert!(pair[0] > pair[1]);
        }
    }

    #[test]
    fn no_searchable_fields_scores_zero(
        terms in prop::collection::vec("[a-z]{1,6}", 0..5),
        text in "[a-z ]{0,40}",
    ) {
        let rec = record(&[], &[("title", text.as_str())]);
        prop_assert_eq!(score(&rec, &terms), 0.0);
    }

    #[test]
    fn primary_field_match_beats_secondary(term in "[a-z]{3,8}", count in 1usize..5) {
        let text = vec![term.as_str(); count].join(" ");
        let primary = record(&["title", "body"], &[("title", text.as_str()), ("body", "")]);
        let secondary = record(&["title", "body"], &[("title", ""), ("body", text.as_str())]);
        let terms = [term.clone()];
        prop_assert!(score(&primary, &terms) > score(&secondary, &terms));
    }

    #[test]
    fn earlier_term_beats_later_term(
        first in "[a-h]{4,6}",
        second in "[p-z]{4,6}",
        count in 1usize..4,
    ) {
        let fields = ["title", "body"];
        let first_text = vec![first.as_str(); count].join(" ");
        let second_text = vec![second.as_str(); count].join(" ");
        let with_first = record(&fields, &[("title", first_text.as_str())]);
        let with_second = record(&fields, &[("title", second_text.as_str())]);
        let terms = [first.clone(), second.clone()];
        prop_assert!(score(&with_first, &terms) > score(&with_second, &terms));
    }

    #[test]
    fn scores_are_never_negative(
        terms in prop::collection::vec("[a-z]{0,4}", 0..4),
        title in "[a-z ]{0,30}",
        body in "[a-z ]{0,30}",
    ) {
        let rec = record(&["title", "body"], &[("title", title.as_str()), ("body", body.as_str())]);
        prop_assert!(score(&rec, &terms) >= 0.0);
    }
}
