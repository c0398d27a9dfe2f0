//! Slug helpers for index names and record identifiers.
//!
//! Some engines reject dotted or slashed identifiers, so every boundary that
//! writes, reads or looks up a filename-derived key goes through
//! [`slugify_identifier`].

use unicode_normalization::UnicodeNormalization;

/// Convert arbitrary text into a lowercase, hyphen-separated ASCII slug.
///
/// Accented letters are folded to ASCII, `_` becomes a separator, `@`
/// becomes `-at-`, other punctuation is dropped and separator runs collapse.
///
/// ```
/// use cms_search::core::slug::slug;
///
/// assert_eq!(slug("Demo Theme_Pages"), "demo-theme-pages");
/// assert_eq!(slug("Crème Brûlée"), "creme-brulee");
/// ```
pub fn slug(input: &str) -> String {
    let folded: String = input
        .nfkd()
        .filter(char::is_ascii)
        .collect::<String>()
        .replace('_', "-")
        .replace('@', "-at-")
        .to_ascii_lowercase();

    let mut out = String::with_capacity(folded.len());
    let mut pending_separator = false;
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('-');
            }
            pending_separator = false;
            out.push(c);
        } else if c == '-' || c.is_ascii_whitespace() {
            pending_separator = true;
        }
    }
    out
}

/// Slug a raw identifier (usually a content file name) so it is safe to use
/// as a key on every engine.
///
/// Dots and path separators become hyphens before slugging, so
/// `about.us.md` turns into `about-us-md`. Applying it to an already
/// slugged value returns the value unchanged.
pub fn slugify_identifier(raw: &str) -> String {
    slug(&raw.replace(['.', '/', '\\'], "-"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_collapses_separators() {
        assert_eq!(slug("  Hello -- World  "), "hello-world");
        assert_eq!(slug("a_b__c"), "a-b-c");
    }

    #[test]
    fn slug_drops_punctuation() {
        assert_eq!(slug("What's new?"), "whats-new");
        assert_eq!(slug("mail@example"), "mail-at-example");
    }

    #[test]
    fn slug_of_empty_is_empty() {
        assert_eq!(slug(""), "");
        assert_eq!(slug("!!!"), "");
    }

    #[test]
    fn identifier_replaces_dots_and_slashes() {
        assert_eq!(slugify_identifier("about.us.md"), "about-us-md");
        assert_eq!(slugify_identifier("blog/post.htm"), "blog-post-htm");
        assert_eq!(slugify_identifier("Blog\\Index.HTM"), "blog-index-htm");
    }

    #[test]
    fn identifier_is_idempotent() {
        let once = slugify_identifier("team/About.Us.htm");
        assert_eq!(slugify_identifier(&once), once);
    }
}
