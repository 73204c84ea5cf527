//! Google Books volume list parsing.
//!
//! The API answers with an object holding an optional `items` array; each item
//! carries a `volumeInfo` object with an optional `authors` array and a
//! `title`. Parsing is deliberately lenient about authors and strict about
//! titles: a volume without a title is a fault, which by default discards the
//! whole response (see [`MalformedItemPolicy`]).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{BookRecord, UNKNOWN_AUTHOR};

/// What to do when a single volume in the response is malformed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedItemPolicy {
    /// Drop the entire response
    #[default]
    AbortBatch,
    /// Drop just the faulty volume and keep the rest
    SkipItem,
}

/// Reasons a response body yields no books
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("response body is empty")]
    Blank,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("response has no `items` array")]
    MissingItems,

    #[error("item {index}: {reason}")]
    Item { index: usize, reason: String },
}

/// Parse a response body into books, returning `None` when there is nothing to show
///
/// `None` covers a missing or blank body, invalid JSON, a body without an
/// `items` array, and any malformed volume. A well-formed body whose `items`
/// array is empty yields `Some(vec![])`.
pub fn parse(raw: Option<&str>) -> Option<Vec<BookRecord>> {
    try_parse(raw, MalformedItemPolicy::AbortBatch).ok()
}

/// Parse a response body into books, reporting why nothing could be extracted
pub fn try_parse(
    raw: Option<&str>,
    policy: MalformedItemPolicy,
) -> Result<Vec<BookRecord>, ParseError> {
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Err(ParseError::Blank),
    };

    let root: Value =
        serde_json::from_str(raw).map_err(|e| ParseError::InvalidJson(e.to_string()))?;
    let root = root.as_object().ok_or(ParseError::NotAnObject)?;
    let items = root
        .get("items")
        .and_then(Value::as_array)
        .ok_or(ParseError::MissingItems)?;

    let mut books = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match parse_item(item) {
            Ok(book) => books.push(book),
            Err(reason) => match policy {
                MalformedItemPolicy::AbortBatch => {
                    return Err(ParseError::Item { index, reason });
                }
                MalformedItemPolicy::SkipItem => {
                    tracing::warn!("Skipping malformed volume at index {}: {}", index, reason);
                }
            },
        }
    }

    Ok(books)
}

fn parse_item(item: &Value) -> Result<BookRecord, String> {
    let info = item
        .get("volumeInfo")
        .and_then(Value::as_object)
        .ok_or_else(|| "missing `volumeInfo` object".to_string())?;

    let title = info
        .get("title")
        .and_then(read_string)
        .ok_or_else(|| "missing `title`".to_string())?;

    Ok(BookRecord::new(read_authors(info), title))
}

fn read_authors(info: &Map<String, Value>) -> Vec<String> {
    match info.get("authors").and_then(Value::as_array) {
        Some(authors) if !authors.is_empty() => authors
            .iter()
            .map(|a| read_string(a).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()))
            .collect(),
        _ => vec![UNKNOWN_AUTHOR.to_string()],
    }
}

/// Read a scalar as text; null and structured values do not count
fn read_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
