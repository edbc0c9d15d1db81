//! Short human-readable labels for bills.
//!
//! Official titles are long and full of boilerplate ("An Act relating to
//! ..."). The label keeps the first few meaningful words and adds a topical
//! suffix so cards and search results read naturally.

use regex::Regex;
use std::sync::OnceLock;

/// Label used when a bill has neither a title nor a number
pub const UNKNOWN_BILL: &str = "Unknown Bill";

const MAX_KEYWORDS: usize = 3;
const MAX_FALLBACK_LEN: usize = 30;
const MAX_LABEL_LEN: usize = 40;
const ELLIPSIS: &str = "...";

const STOP_WORDS: &[&str] = &[
    "the", "and", "or", "of", "to", "for", "in", "on", "at", "by", "with", "from", "a", "an",
];

/// Domain terms kept regardless of length or stop-word status
const IMPORTANT_TERMS: &[&str] = &[
    "ai",
    "appropriations",
    "budget",
    "child",
    "children",
    "crime",
    "disaster",
    "education",
    "election",
    "emergency",
    "energy",
    "environment",
    "health",
    "housing",
    "insurance",
    "labor",
    "medical",
    "police",
    "safety",
    "school",
    "tax",
    "transportation",
    "veterans",
    "voting",
    "water",
];

/// Words that already make a label read like a bill name
const NAME_WORDS: &[&str] = &["act", "bill", "program", "system"];

/// Suffixes chosen by the first keyword group found in the label
const TOPICAL_SUFFIXES: &[(&[&str], &str)] = &[
    (&["safety", "emergency", "disaster"], " Safety Act"),
    (&["education", "school"], " Education Act"),
    (&["tax", "budget", "appropriations"], " Budget Bill"),
    (&["health", "medical"], " Health Act"),
];

const DEFAULT_SUFFIX: &str = " Act";

fn leading_boilerplate() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)^\s*(?:an\s+act|relating\s+to|concerning|regarding|amending|creating",
            r"|establishing|providing\s+for)\b[\s,:]*",
        ))
        .expect("leading boilerplate pattern is valid")
    })
}

fn trailing_boilerplate() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\s*(?:;\s*(?:and\s+)?providing\s+penalties\.?|\.)\s*$")
            .expect("trailing boilerplate pattern is valid")
    })
}

/// Derive a short label for a bill.
///
/// Never returns an empty string: without a usable title the bill number is
/// used, and without that [`UNKNOWN_BILL`].
pub fn meaningful_name(title: Option<&str>, bill_number: Option<&str>) -> String {
    if let Some(label) = title.and_then(label_from_title) {
        return label;
    }

    match bill_number.map(str::trim) {
        Some(number) if !number.is_empty() => number.to_string(),
        _ => UNKNOWN_BILL.to_string(),
    }
}

fn label_from_title(title: &str) -> Option<String> {
    let cleaned = strip_boilerplate(title);
    if !cleaned.chars().any(char::is_alphanumeric) {
        return None;
    }

    let keywords: Vec<&str> = cleaned
        .split_whitespace()
        .map(trim_punctuation)
        .filter(|token| is_keyword(token))
        .take(MAX_KEYWORDS)
        .collect();

    let base = if keywords.is_empty() {
        let head = cleaned
            .split_whitespace()
            .take(MAX_KEYWORDS)
            .collect::<Vec<_>>()
            .join(" ");
        truncate(&head, MAX_FALLBACK_LEN)
    } else {
        keywords.join(" ")
    };

    let mut label = title_case(&base);
    if !has_name_word(&label) {
        label.push_str(topical_suffix(&label));
    }

    Some(truncate(&label, MAX_LABEL_LEN))
}

/// Remove leading and trailing legislative boilerplate
pub fn strip_boilerplate(title: &str) -> String {
    let mut text = title.trim().to_string();

    loop {
        let stripped = leading_boilerplate().replace(&text, "").into_owned();
        if stripped == text {
            break;
        }
        text = stripped;
    }

    loop {
        let stripped = trailing_boilerplate().replace(&text, "").into_owned();
        if stripped == text {
            break;
        }
        text = stripped;
    }

    text.trim().to_string()
}

fn trim_punctuation(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphanumeric())
}

fn is_keyword(token: &str) -> bool {
    let lower = token.to_lowercase();
    if IMPORTANT_TERMS.contains(&lower.as_str()) {
        return true;
    }
    lower.chars().count() > 2 && !STOP_WORDS.contains(&lower.as_str())
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn has_name_word(label: &str) -> bool {
    label
        .split_whitespace()
        .map(|w| trim_punctuation(w).to_lowercase())
        .any(|w| NAME_WORDS.contains(&w.as_str()))
}

fn topical_suffix(label: &str) -> &'static str {
    let lower = label.to_lowercase();
    TOPICAL_SUFFIXES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, suffix)| *suffix)
        .unwrap_or(DEFAULT_SUFFIX)
}

fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let keep = max_len.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}
