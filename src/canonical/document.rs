use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::matcher::CanonicalColumn;
use crate::types::{CanonicalKey, ContentHash};

/// A normalized cell.
///
/// Decimals serialize as strings so the fixed scale survives
/// (`"1250.00"`, never `1250.0`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CanonicalValue {
    Money(#[serde(with = "rust_decimal::serde::str")] Decimal),
    Quantity(#[serde(with = "rust_decimal::serde::str")] Decimal),
    Text(String),
}

/// One data row. Every column key is present; blank cells are `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Zero-based row index in the source sheet.
    pub source_row: usize,
    pub values: BTreeMap<CanonicalKey, Option<CanonicalValue>>,
}

impl CanonicalRecord {
    pub fn get(&self, key: &str) -> Option<&CanonicalValue> {
        self.values.get(key).and_then(Option::as_ref)
    }
}

/// The unit that gets hashed: header map plus records in source row order.
///
/// Keys are sorted by construction (`BTreeMap`); records keep row order
/// because BOQ line sequence is meaningful. Nothing time-dependent is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalDocument {
    pub columns: BTreeMap<CanonicalKey, CanonicalColumn>,
    pub records: Vec<CanonicalRecord>,
}

impl CanonicalDocument {
    /// Compact JSON; the exact bytes the content hash is computed over.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn content_hash(&self) -> Result<ContentHash, serde_json::Error> {
        Ok(ContentHash::from_bytes(&self.canonical_bytes()?))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    pub fn column(&self, key: &str) -> Option<&CanonicalColumn> {
        self.columns.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(CanonicalKey::as_str)
    }
}
