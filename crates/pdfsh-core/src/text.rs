//! Term extraction shared by the comparison engine and the offline backend.

use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use regex::Regex;

/// Words ignored when ranking terms.
///
/// Besides common English filler this also covers the vocabulary of analysis
/// reports themselves, so that two reports do not look similar merely because
/// both say "keywords" and "summary".
const STOPWORDS: &[&str] = &[
    "about", "also", "analysis", "appears", "approximately", "based", "been", "between",
    "calls", "comprehensive", "contains", "content", "could", "dates", "document", "each",
    "emails", "entities", "external", "extracted", "found", "frequently", "from", "have",
    "into", "keywords", "locally", "more", "most", "names", "none", "occurrences", "only",
    "organizations", "other", "over", "performed", "potential", "provided", "related",
    "represent", "sentences", "should", "some", "such", "summary", "than", "that", "their",
    "there", "these", "they", "this", "those", "through", "topics", "under", "urls", "used",
    "various", "very", "were", "what", "when", "where", "which", "while", "will", "with",
    "without", "would", "your",
];

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b[a-zA-Z]{4,}\b").expect("static regex is valid"))
}

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.binary_search(&word).is_ok()
}

/// Lowercased words of four or more letters, stopwords removed.
pub fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    word_pattern()
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| !is_stopword(w))
}

/// Word counts ordered by descending frequency, ties broken alphabetically.
pub fn ranked_terms(text: &str) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for word in words(text) {
        *counts.entry(word).or_default() += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|(a_word, a_count), (b_word, b_count)| {
        b_count.cmp(a_count).then_with(|| a_word.cmp(b_word))
    });
    ranked
}

/// The `limit` most frequent terms of `text`.
pub fn top_terms(text: &str, limit: usize) -> BTreeSet<String> {
    ranked_terms(text)
        .into_iter()
        .take(limit)
        .map(|(word, _)| word)
        .collect()
}

/// Every distinct term of `text`.
pub fn vocabulary(text: &str) -> BTreeSet<String> {
    words(text).collect()
}

/// Jaccard similarity of two term sets as a percentage in `0.0..=100.0`.
pub fn jaccard_percent(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    shared as f64 / union as f64 * 100.0
}
