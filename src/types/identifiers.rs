use std::borrow::Borrow;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Stable ASCII identifier of a canonical column.
///
/// Only `[a-z0-9_]` is allowed, never empty, never with leading or trailing
/// underscores. Ordering is plain byte ordering, which is what output
/// serialization sorts by.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalKey(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("Canonical key must not be empty")]
    Empty,
    #[error("Canonical key contains invalid character {ch:?}: {key}")]
    InvalidChar { key: String, ch: char },
    #[error("Canonical key must not start or end with '_': {0}")]
    DanglingUnderscore(String),
}

impl CanonicalKey {
    pub fn new(key: impl Into<String>) -> Result<Self, KeyError> {
        let key = key.into();
        if key.is_empty() {
            return Err(KeyError::Empty);
        }
        if let Some(ch) = key
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_'))
        {
            return Err(KeyError::InvalidChar { key, ch });
        }
        if key.starts_with('_') || key.ends_with('_') {
            return Err(KeyError::DanglingUnderscore(key));
        }
        Ok(CanonicalKey(key))
    }

    /// `col_{n}` for the 0-based column `index`, used when a label folds to
    /// nothing.
    pub fn positional(index: usize) -> Self {
        CanonicalKey(format!("col_{}", index + 1))
    }

    /// `thanh_tien` + 2 → `thanh_tien_2`.
    pub fn suffixed(&self, n: usize) -> Self {
        CanonicalKey(format!("{}_{n}", self.0))
    }

    /// Concatenates two keys with `_`.
    pub fn join(&self, child: &CanonicalKey) -> Self {
        CanonicalKey(format!("{}_{}", self.0, child.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CanonicalKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CanonicalKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CanonicalKey::new(value)
    }
}

impl From<CanonicalKey> for String {
    fn from(key: CanonicalKey) -> Self {
        key.0
    }
}

impl std::fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content hash: `sha256:<lowercase hex>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn from_bytes(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);

        let hash = hasher.finalize();
        let hex = hex::encode(hash);

        ContentHash(format!("sha256:{hex}"))
    }

    /// Hash of the compact JSON serialization of `value`.
    ///
    /// Only meaningful for types whose serialization is order-stable
    /// (structs, `Vec`, `BTreeMap`); never feed a `HashMap` through here.
    pub fn of_json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        let bytes = serde_json::to_vec(value)?;
        Ok(Self::from_bytes(&bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
