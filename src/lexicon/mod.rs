//! Read-only vocabularies: the canonical column dictionary, the footer
//! phrases, and the similarity function used to compare against them.
//!
//! A [`Lexicon`] is constructed once (built-in or from TOML) and shared by
//! reference across every pipeline invocation. Nothing here has interior
//! mutability.

pub mod dictionary;
pub mod footer;
pub mod similarity;

use serde::Deserialize;
use thiserror::Error;

pub use dictionary::{CanonicalDictionary, DictionaryEntry, EntrySpec, ValueKind};
pub use footer::{FooterLexicon, FooterPhrase};
pub use similarity::{JaroWinkler, Similarity};

use crate::types::KeyError;

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("Lexicon parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid canonical key {key:?}: {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: KeyError,
    },
    #[error("Duplicate canonical key: {0}")]
    DuplicateKey(String),
    #[error("Canonical key {0} declares no aliases")]
    NoAliases(String),
    #[error("Canonical key {0} has an alias that folds to nothing")]
    BlankAlias(String),
    #[error("Footer phrase folds to nothing: {0:?}")]
    BlankFooterPhrase(String),
    #[error("Dictionary must declare at least one column")]
    EmptyDictionary,
}

#[derive(Debug, Clone)]
pub struct Lexicon {
    pub dictionary: CanonicalDictionary,
    pub footer: FooterLexicon,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LexiconSpec {
    columns: Vec<EntrySpec>,
    #[serde(default)]
    footer: Option<Vec<String>>,
}

impl Lexicon {
    pub fn qs_default() -> Self {
        Self {
            dictionary: CanonicalDictionary::qs_default(),
            footer: FooterLexicon::qs_default(),
        }
    }

    /// Loads a custom vocabulary:
    ///
    /// ```toml
    /// footer = ["Tổng cộng", "Ký tên"]   # optional, built-in set otherwise
    ///
    /// [[columns]]
    /// key = "thanh_tien"
    /// kind = "money"
    /// aliases = ["Thành tiền", "Amount"]
    /// ```
    pub fn from_toml_str(input: &str) -> Result<Self, LexiconError> {
        let spec: LexiconSpec = toml::from_str(input)?;
        let dictionary = CanonicalDictionary::new(spec.columns)?;
        let footer = match spec.footer {
            Some(phrases) => FooterLexicon::new(phrases)?,
            None => FooterLexicon::qs_default(),
        };
        Ok(Self { dictionary, footer })
    }
}
