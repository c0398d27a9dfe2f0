//! Property-based tests for ranking, tokenizing and identifiers.

mod ranking_props;
mod text_props;
