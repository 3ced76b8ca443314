//! LocalBackend - offline heuristic analysis, no network access.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use async_trait::async_trait;
use pdfsh_core::analysis::{AnalysisBackend, AnalysisType};
use pdfsh_core::error::BackendError;
use pdfsh_core::text;
use regex::Regex;

const KEY_SENTENCES: usize = 3;
const KEYWORD_LIMIT: usize = 10;
const MAX_URLS: usize = 3;
const MAX_DATES: usize = 5;
const MAX_NAMES: usize = 10;

const CODE_INDICATORS: &[&str] = &["function", "class", "import", "def", "var", "const", "return"];
const TECH_TERMS: &[&str] = &["API", "database", "server", "client", "algorithm", "framework"];

struct EntityPatterns {
    email: Regex,
    url: Regex,
    date: Regex,
    capitalized: Regex,
}

fn patterns() -> &'static EntityPatterns {
    static PATTERNS: OnceLock<EntityPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| EntityPatterns {
        email: Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
            .expect("static regex is valid"),
        url: Regex::new(r#"https?://[^\s<>"')\]]+"#).expect("static regex is valid"),
        date: Regex::new(r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b|\b\d{4}[/-]\d{1,2}[/-]\d{1,2}\b")
            .expect("static regex is valid"),
        capitalized: Regex::new(r"\b[A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)*\b")
            .expect("static regex is valid"),
    })
}

/// Heuristic analysis computed from the text alone.
#[derive(Debug, Clone, Default)]
pub struct LocalBackend;

impl LocalBackend {
    pub fn new() -> Self {
        Self
    }

    fn summary(text: &str) -> String {
        let word_count = text.split_whitespace().count();
        let sentences: Vec<String> = text
            .split('.')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .take(KEY_SENTENCES)
            .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
            .collect();
        format!(
            "Document Summary:\n\nThis document contains approximately {word_count} words.\n\nKey sentences:\n{}",
            bullet_list(&sentences)
        )
    }

    fn keywords(text: &str) -> String {
        let ranked: Vec<String> = text::ranked_terms(text)
            .into_iter()
            .take(KEYWORD_LIMIT)
            .map(|(word, count)| format!("{word} ({count} occurrences)"))
            .collect();
        format!(
            "Keywords extracted:\n\n{}\n\nThese keywords represent the most frequently used terms in the document.",
            bullet_list(&ranked)
        )
    }

    fn entities(text: &str) -> String {
        let p = patterns();
        let emails = unique(p.email.find_iter(text).map(|m| m.as_str()), usize::MAX);
        let urls = unique(p.url.find_iter(text).map(|m| m.as_str()), MAX_URLS);
        let dates = unique(p.date.find_iter(text).map(|m| m.as_str()), MAX_DATES);
        let names: BTreeSet<&str> = p
            .capitalized
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|phrase| phrase.split_whitespace().count() <= 3)
            .collect();
        let names: Vec<&str> = names.into_iter().take(MAX_NAMES).collect();

        format!(
            "Entities found:\n\nEmails: {}\nURLs: {}\nDates: {}\nPotential names/organizations: {}",
            or_none(&emails),
            or_none(&urls),
            or_none(&dates),
            or_none(&names)
        )
    }

    fn technical(text: &str) -> String {
        let lower = text.to_lowercase();
        let found = |terms: &[&'static str]| -> Vec<&'static str> {
            terms
                .iter()
                .copied()
                .filter(|term| lower.contains(&term.to_lowercase()))
                .collect()
        };
        let indicators = found(CODE_INDICATORS);
        let tech = found(TECH_TERMS);
        let kind = if indicators.is_empty() && tech.is_empty() {
            "Non-technical document"
        } else {
            "Technical documentation"
        };

        format!(
            "Technical Analysis:\n\nProgramming indicators found: {}\nTechnical terms found: {}\n\nDocument type: {kind}",
            or_none(&indicators),
            or_none(&tech)
        )
    }

    fn comprehensive(text: &str) -> String {
        format!(
            "Comprehensive Analysis:\n\n{}\n\n{}\n\n{}",
            Self::summary(text),
            Self::keywords(text),
            Self::entities(text)
        )
    }
}

#[async_trait]
impl AnalysisBackend for LocalBackend {
    fn name(&self) -> &str {
        "local"
    }

    async fn analyze(&self, text: &str, analysis_type: AnalysisType) -> Result<String, BackendError> {
        tracing::debug!("[LocalBackend] Running {} analysis", analysis_type);
        Ok(match analysis_type {
            AnalysisType::Summary => Self::summary(text),
            AnalysisType::Keywords => Self::keywords(text),
            AnalysisType::Entities => Self::entities(text),
            AnalysisType::Technical => Self::technical(text),
            AnalysisType::Comprehensive => Self::comprehensive(text),
        })
    }
}

fn unique<'a>(items: impl Iterator<Item = &'a str>, limit: usize) -> Vec<&'a str> {
    let mut seen = BTreeSet::new();
    items.filter(|item| seen.insert(*item)).take(limit).collect()
}

fn or_none<S: AsRef<str>>(items: &[S]) -> String {
    if items.is_empty() {
        "None found".to_string()
    } else {
        items.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ")
    }
}

fn bullet_list<S: AsRef<str>>(items: &[S]) -> String {
    if items.is_empty() {
        return "- (none)".to_string();
    }
    items
        .iter()
        .map(|item| format!("- {}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}
