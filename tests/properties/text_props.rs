use proptest::prelude::*;

use cms_search::core::slugify_identifier;
use cms_search::search::tokenizer::{split_words, tokenize};

proptest! {
    #[test]
    fn slugs_are_safe_identifiers(raw in r"[A-Za-z0-9 ._/\\@-]{0,40}") {
        let slugged = slugify_identifier(&raw);
        prop_assert!(slugged
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        prop_assert!(!slugged.starts_with('-'));
        prop_assert!(!slugged.ends_with('-'));
        prop_assert!(!slugged.contains("--"));
    }

    #[test]
    fn slugging_is_idempotent(raw in r"[A-Za-z0-9 ._/-]{0,40}") {
        let once = slugify_identifier(&raw);
        prop_assert_eq!(slugify_identifier(&once), once);
    }

    #[test]
    fn tokens_are_clean(raw in r"[A-Za-z0-9 .,!?%-]{0,60}") {
        for term in tokenize(&raw) {
            prop_assert!(!term.is_empty());
            prop_assert!(term.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn split_words_keeps_every_word(words in prop::collection::vec("[a-z]{1,8}", 0..8)) {
        let joined = words.join("  ");
        prop_assert_eq!(split_words(&joined), words);
    }
}
