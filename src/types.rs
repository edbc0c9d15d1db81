use crate::names;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Bills are shared between the collection, cached results and rendered views
pub type SharedBill = Arc<Bill>;

/// A legislative bill, normalized at ingestion and immutable afterwards
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bill {
    pub id: String,
    pub bill_number: String,
    pub short_title: String,
    pub full_title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub status: BillStatus,
    pub sponsors: Vec<Sponsor>,
    pub topics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Short human-readable label derived from the title
    pub meaningful_name: String,
    /// Lower-cased text matched by free-text queries
    #[serde(skip)]
    pub search_corpus: String,
}

/// Plain bill fields before the derived label and search text are computed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillRecord {
    pub id: String,
    pub bill_number: String,
    pub short_title: String,
    pub full_title: String,
    pub abstract_text: String,
    pub status: BillStatus,
    pub sponsors: Vec<Sponsor>,
    pub topics: Vec<String>,
    pub url: Option<String>,
}

impl Bill {
    /// Finish a record: derive its meaningful name and search corpus
    pub fn new(record: BillRecord) -> Self {
        let title = if record.short_title.trim().is_empty() {
            record.full_title.as_str()
        } else {
            record.short_title.as_str()
        };
        let meaningful_name = names::meaningful_name(Some(title), Some(&record.bill_number));

        let mut corpus = vec![
            record.bill_number.as_str(),
            record.short_title.as_str(),
            record.full_title.as_str(),
            record.abstract_text.as_str(),
            meaningful_name.as_str(),
        ];
        corpus.extend(record.sponsors.iter().map(|s| s.name.as_str()));
        let search_corpus = corpus.join(" ").to_lowercase();

        Self {
            id: record.id,
            bill_number: record.bill_number,
            short_title: record.short_title,
            full_title: record.full_title,
            abstract_text: record.abstract_text,
            status: record.status,
            sponsors: record.sponsors,
            topics: record.topics,
            url: record.url,
            meaningful_name,
            search_corpus,
        }
    }

    /// Display names of all sponsors, in order
    pub fn sponsor_names(&self) -> impl Iterator<Item = &str> {
        self.sponsors.iter().map(|s| s.name.as_str())
    }
}

/// A bill sponsor. Sources may send a bare name or a full record; both end up
/// here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sponsor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl Sponsor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            district: None,
            photo: None,
        }
    }
}

/// Bill status. Unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BillStatus {
    Filed,
    InCommittee,
    Passed,
    Vetoed,
    Signed,
    Other(String),
}

impl BillStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BillStatus::Filed => "Filed",
            BillStatus::InCommittee => "In Committee",
            BillStatus::Passed => "Passed",
            BillStatus::Vetoed => "Vetoed",
            BillStatus::Signed => "Signed",
            BillStatus::Other(s) => s,
        }
    }
}

impl From<&str> for BillStatus {
    fn from(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "filed" => BillStatus::Filed,
            "in committee" | "in_committee" | "incommittee" => BillStatus::InCommittee,
            "passed" => BillStatus::Passed,
            "vetoed" => BillStatus::Vetoed,
            "signed" => BillStatus::Signed,
            _ => BillStatus::Other(trimmed.to_string()),
        }
    }
}

impl Default for BillStatus {
    fn default() -> Self {
        BillStatus::Other(String::new())
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BillStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BillStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(BillStatus::from(s.as_str()))
    }
}
