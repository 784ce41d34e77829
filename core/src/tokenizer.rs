use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;

lazy_static! {
    /// ASCII-only token pattern: no Unicode letter classes, no stopword
    /// list — idf pruning at query time is what filters common words,
    /// not a fixed stopword set.
    static ref RE: Regex = Regex::new(r"[A-Za-z0-9@#*&']{2,}").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Tokenize, lower-case, and stem `text`, in order of appearance.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    RE.find_iter(&lowered)
        .map(|m| STEMMER.stem(m.as_str()).to_string())
        .collect()
}

/// Tokenize and deduplicate, preserving first-occurrence order. Used for
/// query terms, where multiplicity should not boost scoring.
pub fn tokenize_unique(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(text)
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Running, runner's run!");
        assert!(t.iter().any(|w| w == "run"));
    }

    #[test]
    fn minimum_length_and_allowed_punctuation() {
        // "e" and standalone "a" fall below the length-2 minimum; "a@b"
        // and "#tag" qualify via the permitted punctuation classes.
        let toks = tokenize("e-mail a@b #tag a");
        assert_eq!(toks, vec!["mail", "a@b", "#tag"]);
    }

    #[test]
    fn dedup_preserves_first_occurrence_order() {
        let toks = tokenize_unique("world there world hello there");
        assert_eq!(toks, vec!["world", "there", "hello"]);
    }
}
