//! Keyword extraction
//!
//! Deterministic tokenizer shared by matching and strength analysis.

use std::collections::BTreeSet;
use unicode_normalization::UnicodeNormalization;

/// Tokens shorter than this are ignored
pub const MIN_TOKEN_CHARS: usize = 3;

/// Words that carry no identifying information, sorted for binary search
const STOPWORDS: &[&str] = &[
    "about", "after", "all", "and", "any", "are", "around", "been", "before", "but", "can",
    "color", "colour", "did", "does", "for", "found", "from", "had", "has", "have",
    "her", "his", "how", "inside", "into", "item", "its", "lost", "many", "near", "not",
    "one", "our", "she", "some", "that", "the", "their", "there", "they", "this", "was",
    "were", "what", "when", "where", "which", "who", "with", "you", "your",
];

fn is_stopword(token: &str) -> bool {
    STOPWORDS.binary_search(&token).is_ok()
}

/// Extract the normalized keyword set of a text
///
/// NFKC-normalizes and lowercases, splits on anything that is not
/// alphanumeric, then drops short tokens and stopwords.
pub fn extract_keywords(text: &str) -> BTreeSet<String> {
    let normalized: String = text.nfkc().collect::<String>().to_lowercase();
    normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS && !is_stopword(token))
        .map(str::to_owned)
        .collect()
}

/// Keywords present in both sets
pub fn shared_keywords<'a>(a: &'a BTreeSet<String>, b: &'a BTreeSet<String>) -> Vec<&'a str> {
    a.intersection(b).map(String::as_str).collect()
}

/// Jaccard similarity of two keyword sets, 0.0 when both are empty
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}
