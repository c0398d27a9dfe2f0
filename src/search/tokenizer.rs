//! Query tokenizers.
//!
//! Two pipelines exist and they are not interchangeable:
//!
//! - [`tokenize`]: the fuzzy pipeline. Lowercase, drop `%`, split on spaces
//!   and hyphens, strip punctuation, remove stop words, Porter-stem.
//! - [`split_words`]: the scoring pipeline. Lowercase and split only, so
//!   terms line up with what an engine matched against the raw query.

use std::sync::LazyLock;

use regex::Regex;

use super::stemmer;

/// Standard English stop words.
pub const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for",
    "with", "about", "against", "between", "into", "through", "during", "before", "after",
    "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
    "again", "further", "then", "once", "here", "there", "when", "where", "why", "how", "all",
    "any", "both", "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not",
    "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will", "just", "don",
    "should", "now",
];

static WORD_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-]+").expect("valid separator pattern"));

static SPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" +").expect("valid space pattern"));

/// Check if a (lowercase) word is a stop word.
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Tokenize a raw query into cleaned, stemmed search terms.
///
/// Order follows the input. An empty result means the query has no
/// effective terms and must not be sent to an engine.
///
/// ```
/// use cms_search::search::tokenizer::tokenize;
///
/// let terms = tokenize("The Quick-Brown Fox runs.");
/// assert_eq!(terms, vec!["quick", "brown", "fox", "run"]);
/// ```
pub fn tokenize(raw: &str) -> Vec<String> {
    let lowered = raw.to_lowercase().replace('%', " ");

    WORD_SEPARATORS
        .split(&lowered)
        .map(|word| {
            word.chars()
                .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
                .collect::<String>()
        })
        .filter(|word| !word.is_empty() && !is_stop_word(word))
        .map(|word| stemmer::stem(&word))
        .filter(|word| !word.is_empty())
        .collect()
}

/// Split a raw query into lowercase words for relevance scoring.
///
/// No stemming and no stop-word removal; only leading and trailing
/// punctuation is trimmed from each word.
///
/// ```
/// use cms_search::search::tokenizer::split_words;
///
/// assert_eq!(split_words("The  fox%runs!"), vec!["the", "fox", "runs"]);
/// ```
pub fn split_words(raw: &str) -> Vec<String> {
    let lowered = raw.to_lowercase().replace('%', " ");
    let collapsed = SPACE_RUNS.replace_all(&lowered, " ");

    collapsed
        .split(' ')
        .map(|word| word.trim_matches(|c: char| c.is_ascii_punctuation()))
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join tokenized terms so `LIKE`-style engines match them in order but not
/// necessarily adjacent.
///
/// ```
/// use cms_search::search::tokenizer::to_wildcard_query;
///
/// let terms = vec!["quick".to_string(), "fox".to_string()];
/// assert_eq!(to_wildcard_query(&terms), "quick% %fox");
/// ```
pub fn to_wildcard_query(terms: &[String]) -> String {
    terms.join("% %").trim().to_string()
}
