//! Task input parser for quick capture.
//!
//! # Responsibility
//! - Detect urgency keywords and temporal tags in free-form input.
//! - Strip a single trailing bare urgency flag so "Buy milk high" captures
//!   as "Buy milk" with high urgency.
//!
//! # Invariants
//! - Keyword matches respect word boundaries; "highway" is not an urgency.
//! - Detection is case-insensitive and never fails; unparsed input passes
//!   through unchanged.

use crate::model::task::Urgency;
use once_cell::sync::Lazy;
use regex::Regex;

static HIGH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(urgent|high priority|high)\b").expect("valid high regex"));
static MEDIUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(medium priority|medium)\b").expect("valid medium regex"));
static LOW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(low priority|low)\b").expect("valid low regex"));
static TRAILING_FLAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+(high|medium|low|urgent)$").expect("valid flag regex"));
static TEMPORAL_RES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    ["today", "tomorrow", "tonight"]
        .into_iter()
        .map(|keyword| {
            let pattern = Regex::new(&format!(r"(?i)\b{keyword}\b")).expect("valid temporal regex");
            (keyword, pattern)
        })
        .collect()
});

/// Structured result of parsing one line of task input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedTaskInput {
    /// Input with a trailing urgency flag stripped, otherwise unchanged.
    pub clean_text: String,
    /// Detected urgency, `None` when no keyword matched.
    pub urgency: Option<Urgency>,
    /// Temporal keywords found in the text, in fixed keyword order.
    pub tags: Vec<String>,
}

/// Parses raw task input into clean text, urgency, and temporal tags.
pub fn parse_task_input(text: &str) -> ParsedTaskInput {
    let mut urgency = if HIGH_RE.is_match(text) {
        Some(Urgency::High)
    } else if MEDIUM_RE.is_match(text) {
        Some(Urgency::Medium)
    } else if LOW_RE.is_match(text) {
        Some(Urgency::Low)
    } else {
        None
    };

    let tags = TEMPORAL_RES
        .iter()
        .filter(|(_, pattern)| pattern.is_match(text))
        .map(|(keyword, _)| (*keyword).to_string())
        .collect();

    let mut clean_text = text.to_string();
    if let Some(found) = TRAILING_FLAG_RE.find(text) {
        clean_text.truncate(found.start());
        let flag = found.as_str().trim().to_ascii_lowercase();
        urgency = Some(match flag.as_str() {
            "urgent" | "high" => Urgency::High,
            "medium" => Urgency::Medium,
            _ => Urgency::Low,
        });
    }

    ParsedTaskInput {
        clean_text,
        urgency,
        tags,
    }
}
