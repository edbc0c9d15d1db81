//! Loading the bill list and normalizing it into [`Bill`] values.
//!
//! Backends are loose about shapes: sponsors may be bare names or records,
//! arrays may be missing or null, and the list itself may be wrapped in an
//! envelope object. Everything is coerced here so the engine only ever sees
//! well-formed bills.

use crate::error::{Error, Result};
use crate::types::{Bill, BillRecord, BillStatus, Sponsor};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

const ENVELOPE_KEYS: &[&str] = &["bills", "data", "results"];

const ID_KEYS: &[&str] = &["id", "bill_id", "billId"];
const NUMBER_KEYS: &[&str] = &["billNumber", "bill_number", "identifier", "number"];
const SHORT_TITLE_KEYS: &[&str] = &["shortTitle", "short_title", "title"];
const FULL_TITLE_KEYS: &[&str] = &["fullTitle", "full_title", "longTitle", "long_title"];
const ABSTRACT_KEYS: &[&str] = &["abstract", "description", "summary"];
const STATUS_KEYS: &[&str] = &["status", "stage"];
const TOPIC_KEYS: &[&str] = &["topics", "subjects", "subject"];
const URL_KEYS: &[&str] = &["url", "officialUrl", "official_url", "link"];

const SPONSOR_NAME_KEYS: &[&str] = &[
    "name",
    "fullName",
    "full_name",
    "displayName",
    "display_name",
];
const SPONSOR_DISTRICT_KEYS: &[&str] = &["district"];
const SPONSOR_PHOTO_KEYS: &[&str] = &["photo", "photoUrl", "photo_url", "image"];

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the session's bill list comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillSource {
    File(PathBuf),
    Url(String),
}

impl BillSource {
    /// Fetch and normalize the bill list
    pub async fn load(&self) -> Result<Vec<Bill>> {
        let bills = match self {
            BillSource::File(path) => load_bills_from_file(path).await?,
            BillSource::Url(url) => fetch_bills(url).await?,
        };
        info!(source = %self, bills = bills.len(), "bill list loaded");
        Ok(bills)
    }

    /// Like [`BillSource::load`], but a failed fetch is logged and reported
    /// as an empty collection.
    pub async fn load_or_empty(&self) -> Vec<Bill> {
        match self.load().await {
            Ok(bills) => bills,
            Err(e) => {
                error!(source = %self, error = %e, "failed to load bill list");
                Vec::new()
            }
        }
    }
}

impl std::fmt::Display for BillSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BillSource::File(path) => write!(f, "{}", path.display()),
            BillSource::Url(url) => f.write_str(url),
        }
    }
}

/// Read a JSON bill list from disk
pub async fn load_bills_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Bill>> {
    let contents = tokio::fs::read_to_string(path.as_ref()).await?;
    let value: Value = serde_json::from_str(&contents)?;
    Ok(bills_from_value(&value))
}

/// Fetch a JSON bill list from the bill list endpoint.
/// The blocking client runs on tokio's blocking pool.
pub async fn fetch_bills(url: &str) -> Result<Vec<Bill>> {
    let url = url.to_string();
    let value = tokio::task::spawn_blocking(move || -> Result<Value> {
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()?;
        let response = client.get(&url).send()?.error_for_status()?;
        Ok(response.json::<Value>()?)
    })
    .await
    .map_err(|e| Error::Source(format!("Task join error: {}", e)))??;

    Ok(bills_from_value(&value))
}

/// Normalize a decoded bill list. Accepts a bare array or an object wrapping
/// the array under `bills`, `data` or `results`. Malformed records are
/// skipped.
pub fn bills_from_value(value: &Value) -> Vec<Bill> {
    let records: &[Value] = match value {
        Value::Array(records) => records.as_slice(),
        Value::Object(map) => match ENVELOPE_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
        {
            Some(records) => records.as_slice(),
            None => {
                warn!("bill list object has no bills/data/results array");
                &[]
            }
        },
        _ => {
            warn!("bill list is neither an array nor an object");
            &[]
        }
    };

    records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let bill = bill_from_value(record);
            if bill.is_none() {
                warn!(index, "skipping malformed bill record");
            }
            bill
        })
        .collect()
}

/// Normalize one bill record. Returns `None` for non-objects and for records
/// with nothing to identify or display.
pub fn bill_from_value(value: &Value) -> Option<Bill> {
    let map = value.as_object()?;

    let bill_number = text_field(map, NUMBER_KEYS).unwrap_or_default();
    let short_title = text_field(map, SHORT_TITLE_KEYS).unwrap_or_default();
    let full_title = text_field(map, FULL_TITLE_KEYS).unwrap_or_default();
    let id = text_field(map, ID_KEYS).unwrap_or_else(|| bill_number.clone());

    if id.is_empty() && bill_number.is_empty() && short_title.is_empty() && full_title.is_empty() {
        return None;
    }

    let status = text_field(map, STATUS_KEYS)
        .map(|s| BillStatus::from(s.as_str()))
        .unwrap_or_default();

    let sponsors = array_field(map, &["sponsors"])
        .map(|items| items.iter().filter_map(sponsor_from_value).collect())
        .unwrap_or_default();

    let topics = array_field(map, TOPIC_KEYS)
        .map(|items| items.iter().filter_map(topic_from_value).collect())
        .unwrap_or_default();

    Some(Bill::new(BillRecord {
        id,
        bill_number,
        short_title,
        full_title,
        abstract_text: text_field(map, ABSTRACT_KEYS).unwrap_or_default(),
        status,
        sponsors,
        topics,
        url: text_field(map, URL_KEYS),
    }))
}

/// A sponsor may be a bare name or an object with name, district and photo
fn sponsor_from_value(value: &Value) -> Option<Sponsor> {
    match value {
        Value::String(name) => non_empty(name).map(Sponsor::named),
        Value::Object(map) => Some(Sponsor {
            name: text_field(map, SPONSOR_NAME_KEYS)?,
            district: text_field(map, SPONSOR_DISTRICT_KEYS),
            photo: text_field(map, SPONSOR_PHOTO_KEYS),
        }),
        _ => None,
    }
}

fn topic_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(topic) => non_empty(topic),
        Value::Object(map) => text_field(map, &["name", "label"]),
        _ => None,
    }
}

/// First non-empty string (or number) among `keys`
fn text_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match map.get(*key)? {
        Value::String(s) => non_empty(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// First array among `keys`; any other type counts as absent
fn array_field<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Vec<Value>> {
    keys.iter().find_map(|key| map.get(*key).and_then(Value::as_array))
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
