//! Quote record and the rules that decide when two records are the same

use crate::core::error::{QuoteError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Joins the two halves of a dedupe key. Not expected inside quote text.
const KEY_SEPARATOR: char = '\u{1F}';

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub text: String,
    pub category: String,
}

impl QuoteRecord {
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }

    /// Identity used by import and sync merges.
    pub fn dedupe_key(&self) -> String {
        format!(
            "{}{}{}",
            self.text.trim(),
            KEY_SEPARATOR,
            self.category.trim()
        )
    }

    pub fn is_valid(&self) -> bool {
        !self.text.trim().is_empty() && !self.category.trim().is_empty()
    }

    /// Converts an arbitrary JSON value into a record, if it passes the
    /// validity check. Unknown members are ignored.
    pub fn from_candidate(candidate: &Value) -> Option<Self> {
        let text = candidate.get("text")?.as_str()?;
        let category = candidate.get("category")?.as_str()?;
        let record = Self::new(text, category);
        record.is_valid().then_some(record)
    }
}

/// The set shown when storage is empty or corrupt.
pub fn default_quotes() -> Vec<QuoteRecord> {
    vec![
        QuoteRecord::new(
            "Success is not final; failure is not fatal.",
            "Motivation",
        ),
        QuoteRecord::new(
            "Imagination is more important than knowledge.",
            "Inspiration",
        ),
        QuoteRecord::new(
            "Life is what happens when you’re busy making other plans.",
            "Life",
        ),
    ]
}

/// Parses a user supplied blob into a candidate list. Anything that is not a
/// JSON array is rejected as an invalid format.
pub fn parse_candidates(text: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| QuoteError::InvalidFormat(format!("not valid JSON ({e})")))?;
    if !value.is_array() {
        return Err(QuoteError::InvalidFormat(
            "expected a JSON array of quotes".to_string(),
        ));
    }
    Ok(value)
}

/// Strict check used on persisted data: every element must be a valid record.
pub fn parse_persisted(text: &str) -> Option<Vec<QuoteRecord>> {
    let items: Vec<Value> = serde_json::from_str(text).ok()?;
    items.iter().map(QuoteRecord::from_candidate).collect()
}
