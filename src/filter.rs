use crate::error::Error;
use crate::types::{Bill, BillStatus, SharedBill};
use serde_json::Value;
use std::collections::BTreeSet;
use std::str::FromStr;

/// Multi-value facets that can be selected alongside free text and status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    Topics,
    Sponsors,
}

impl FromStr for Facet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "topic" | "topics" => Ok(Facet::Topics),
            "sponsor" | "sponsors" => Ok(Facet::Sponsors),
            other => Err(Error::UnknownFacet(other.to_string())),
        }
    }
}

/// Filter trait for deciding whether a bill stays in the result set
pub trait BillFilter {
    fn should_keep(&self, bill: &Bill) -> bool;
}

/// The complete set of active filters.
///
/// A value type: every change builds a new state, so two states with the same
/// effective selections always compare (and serialize) equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterState {
    search: String,
    topics: BTreeSet<String>,
    sponsors: BTreeSet<String>,
    status: Option<BillStatus>,
}

impl FilterState {
    /// The state that matches every bill
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, raw: &str) -> Self {
        self.search = normalize_query(raw);
        self
    }

    pub fn with_facet<I, S>(mut self, facet: Facet, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let selected = selection(values);
        match facet {
            Facet::Topics => self.topics = selected,
            Facet::Sponsors => self.sponsors = selected,
        }
        self
    }

    pub fn with_topics<I, S>(self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.with_facet(Facet::Topics, topics)
    }

    pub fn with_sponsors<I, S>(self, sponsors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.with_facet(Facet::Sponsors, sponsors)
    }

    pub fn with_status(mut self, status: Option<BillStatus>) -> Self {
        self.status = status;
        self
    }

    /// Normalized free-text query (trimmed, lower-cased, single-spaced)
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn topics(&self) -> &BTreeSet<String> {
        &self.topics
    }

    pub fn sponsors(&self) -> &BTreeSet<String> {
        &self.sponsors
    }

    pub fn status(&self) -> Option<&BillStatus> {
        self.status.as_ref()
    }

    pub fn facet(&self, facet: Facet) -> &BTreeSet<String> {
        match facet {
            Facet::Topics => &self.topics,
            Facet::Sponsors => &self.sponsors,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_empty()
            && self.topics.is_empty()
            && self.sponsors.is_empty()
            && self.status.is_none()
    }

    /// Individual query terms; a bill must contain all of them
    pub fn search_terms(&self) -> impl Iterator<Item = &str> {
        self.search.split_whitespace()
    }

    /// Deterministic serialization used as the cache key. Facet values come
    /// out of sorted sets, so selection order never matters.
    pub fn canonical_key(&self) -> String {
        let strings = |set: &BTreeSet<String>| {
            Value::Array(set.iter().cloned().map(Value::String).collect())
        };

        let mut map = serde_json::Map::new();
        map.insert("search".to_string(), Value::String(self.search.clone()));
        map.insert("topics".to_string(), strings(&self.topics));
        map.insert("sponsors".to_string(), strings(&self.sponsors));
        map.insert(
            "status".to_string(),
            self.status
                .as_ref()
                .map(|s| Value::String(s.as_str().to_string()))
                .unwrap_or(Value::Null),
        );

        Value::Object(map).to_string()
    }

    /// Check a bill against every active facet
    pub fn matches(&self, bill: &Bill) -> bool {
        self.text_matches(bill)
            && self.topics_match(bill)
            && self.sponsors_match(bill)
            && self.status_matches(bill)
    }

    fn text_matches(&self, bill: &Bill) -> bool {
        self.search_terms()
            .all(|term| bill.search_corpus.contains(term))
    }

    fn topics_match(&self, bill: &Bill) -> bool {
        self.topics.is_empty() || bill.topics.iter().any(|t| self.topics.contains(t))
    }

    fn sponsors_match(&self, bill: &Bill) -> bool {
        self.sponsors.is_empty() || bill.sponsor_names().any(|name| self.sponsors.contains(name))
    }

    fn status_matches(&self, bill: &Bill) -> bool {
        match &self.status {
            Some(status) => &bill.status == status,
            None => true,
        }
    }
}

impl BillFilter for FilterState {
    fn should_keep(&self, bill: &Bill) -> bool {
        self.matches(bill)
    }
}

/// Bills kept by `filter`, in their original order
pub fn retain_matching<F>(bills: &[SharedBill], filter: &F) -> Vec<SharedBill>
where
    F: BillFilter + ?Sized,
{
    bills
        .iter()
        .filter(|bill| filter.should_keep(bill))
        .cloned()
        .collect()
}

/// Trim, lower-case and collapse inner whitespace of a raw query
pub fn normalize_query(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn selection<I, S>(values: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|v| v.as_ref().trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
