//! Porter stemmer.
//!
//! Implements Martin Porter's 1980 suffix-stripping algorithm as published in
//! his reference C implementation, including its two departures from the
//! paper (`-bli` -> `-ble` and `-logi` -> `-log` in step 2). Input is expected
//! to be lowercase ASCII; anything else is returned unchanged.

/// Reduce a lowercase word to its Porter stem.
///
/// ```
/// use cms_search::search::stemmer::stem;
///
/// assert_eq!(stem("running"), "run");
/// assert_eq!(stem("relational"), "relat");
/// ```
pub fn stem(word: &str) -> String {
    if word.len() <= 2 || !word.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()) {
        return word.to_string();
    }

    let mut w = word.as_bytes().to_vec();
    step1ab(&mut w);
    if w.len() > 1 {
        step1c(&mut w);
        step2(&mut w);
        step3(&mut w);
        step4(&mut w);
        step5(&mut w);
    }

    // Only ASCII bytes were ever written.
    String::from_utf8(w).unwrap_or_else(|_| word.to_string())
}

fn is_consonant(w: &[u8], i: usize) -> bool {
    match w[i] {
        b'a' | b'e' | b'i' | b'o' | b'u' => false,
        b'y' => i == 0 || !is_consonant(w, i - 1),
        _ => true,
    }
}

/// Number of vowel-consonant sequences: `[C](VC)^m[V]`.
fn measure(w: &[u8]) -> usize {
    let n = w.len();
    let mut i = 0;
    while i < n && is_consonant(w, i) {
        i += 1;
    }
    let mut m = 0;
    loop {
        while i < n && !is_consonant(w, i) {
            i += 1;
        }
        if i >= n {
            return m;
        }
        while i < n && is_consonant(w, i) {
            i += 1;
        }
        m += 1;
    }
}

fn has_vowel(w: &[u8]) -> bool {
    (0..w.len()).any(|i| !is_consonant(w, i))
}

fn ends_double_consonant(w: &[u8]) -> bool {
    let n = w.len();
    n >= 2 && w[n - 1] == w[n - 2] && is_consonant(w, n - 1)
}

/// Consonant-vowel-consonant ending where the last consonant is not w, x or y.
fn ends_cvc(w: &[u8]) -> bool {
    let n = w.len();
    n >= 3
        && is_consonant(w, n - 3)
        && !is_consonant(w, n - 2)
        && is_consonant(w, n - 1)
        && !matches!(w[n - 1], b'w' | b'x' | b'y')
}

fn stem_len(w: &[u8], suffix: &str) -> Option<usize> {
    w.ends_with(suffix.as_bytes())
        .then(|| w.len() - suffix.len())
}

fn set_to(w: &mut Vec<u8>, stem: usize, replacement: &str) {
    w.truncate(stem);
    w.extend_from_slice(replacement.as_bytes());
}

/// Apply the first rule whose suffix matches, if the stem's measure exceeds
/// `min_measure`. Later rules are not tried once a suffix has matched.
fn apply_rules(w: &mut Vec<u8>, rules: &[(&str, &str)], min_measure: usize) {
    for (suffix, replacement) in rules {
        if let Some(stem) = stem_len(w, suffix) {
            if measure(&w[..stem]) > min_measure {
                set_to(w, stem, replacement);
            }
            return;
        }
    }
}

fn step1ab(w: &mut Vec<u8>) {
    if w.last() == Some(&b's') {
        if let Some(stem) = stem_len(w, "sses") {
            set_to(w, stem, "ss");
        } else if let Some(stem) = stem_len(w, "ies") {
            set_to(w, stem, "i");
        } else if w.len() >= 2 && w[w.len() - 2] != b's' {
            w.pop();
        }
    }

    if let Some(stem) = stem_len(w, "eed") {
        if measure(&w[..stem]) > 0 {
            w.pop();
        }
        return;
    }

    let stem = match stem_len(w, "ed").or_else(|| stem_len(w, "ing")) {
        Some(stem) if has_vowel(&w[..stem]) => stem,
        _ => return,
    };
    w.truncate(stem);

    if let Some(stem) = stem_len(w, "at") {
        set_to(w, stem, "ate");
    } else if let Some(stem) = stem_len(w, "bl") {
        set_to(w, stem, "ble");
    } else if let Some(stem) = stem_len(w, "iz") {
        set_to(w, stem, "ize");
    } else if ends_double_consonant(w) {
        if !matches!(w[w.len() - 1], b'l' | b's' | b'z') {
            w.pop();
        }
    } else if measure(w) == 1 && ends_cvc(w) {
        w.push(b'e');
    }
}

fn step1c(w: &mut [u8]) {
    if let Some(stem) = stem_len(w, "y") {
        if has_vowel(&w[..stem]) {
            w[stem] = b'i';
        }
    }
}

const STEP2_RULES: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("bli", "ble"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
    ("logi", "log"),
];

fn step2(w: &mut Vec<u8>) {
    apply_rules(w, STEP2_RULES, 0);
}

const STEP3_RULES: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

fn step3(w: &mut Vec<u8>) {
    apply_rules(w, STEP3_RULES, 0);
}

const STEP4_SUFFIXES: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion", "ou",
    "ism", "ate", "iti", "ous", "ive", "ize",
];

fn step4(w: &mut Vec<u8>) {
    for suffix in STEP4_SUFFIXES {
        let Some(stem) = stem_len(w, suffix) else {
            continue;
        };
        // -ion only counts after s or t; otherwise keep looking.
        if *suffix == "ion" && (stem == 0 || !matches!(w[stem - 1], b's' | b't')) {
            continue;
        }
        if measure(&w[..stem]) > 1 {
            w.truncate(stem);
        }
        return;
    }
}

fn step5(w: &mut Vec<u8>) {
    if w.last() == Some(&b'e') {
        let stem = w.len() - 1;
        let m = measure(&w[..stem]);
        if m > 1 || (m == 1 && !ends_cvc(&w[..stem])) {
            w.pop();
        }
    }
    if w.last() == Some(&b'l') && ends_double_consonant(w) && measure(w) > 1 {
        w.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(pairs: &[(&str, &str)]) {
        for (word, expected) in pairs {
            assert_eq!(stem(word), *expected, "stem({word})");
        }
    }

    #[test]
    fn test_plurals_and_participles() {
        check(&[
            ("caresses", "caress"),
            ("ponies", "poni"),
            ("ties", "ti"),
            ("caress", "caress"),
            ("cats", "cat"),
            ("runs", "run"),
            ("feed", "feed"),
            ("agreed", "agre"),
            ("plastered", "plaster"),
            ("motoring", "motor"),
            ("sing", "sing"),
            ("running", "run"),
            ("hopping", "hop"),
            ("falling", "fall"),
            ("hissing", "hiss"),
            ("fizzed", "fizz"),
            ("sized", "size"),
            ("filing", "file"),
            ("failing", "fail"),
        ]);
    }

    #[test]
    fn test_y_to_i() {
        check(&[("happy", "happi"), ("sky", "sky")]);
    }

    #[test]
    fn test_derivational_suffixes() {
        check(&[
            ("relational", "relat"),
            ("conditional", "condit"),
            ("rational", "ration"),
            ("generalization", "gener"),
            ("hopefulness", "hope"),
            ("goodness", "good"),
            ("electrical", "electr"),
            ("adjustment", "adjust"),
            ("replacement", "replac"),
            ("effective", "effect"),
            ("adoption", "adopt"),
            ("communism", "commun"),
            ("controlling", "control"),
            ("roll", "roll"),
        ]);
    }

    #[test]
    fn test_short_and_non_ascii_words_are_untouched() {
        check(&[("a", "a"), ("is", "is"), ("café", "café"), ("Runs", "Runs")]);
    }

    #[test]
    fn test_digits_pass_through() {
        assert_eq!(stem("2024"), "2024");
        assert_eq!(stem("mp3s"), "mp3");
    }

    #[test]
    fn test_measure() {
        assert_eq!(measure(b"tr"), 0);
        assert_eq!(measure(b"ee"), 0);
        assert_eq!(measure(b"tree"), 0);
        assert_eq!(measure(b"trouble"), 1);
        assert_eq!(measure(b"oats"), 1);
        assert_eq!(measure(b"troubles"), 2);
        assert_eq!(measure(b"private"), 2);
    }
}
