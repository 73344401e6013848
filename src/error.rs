use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::grid::SpanId;
use crate::lexicon::LexiconError;
use crate::text::TextAnomaly;
use crate::types::CanonicalKey;

/// Hard errors: processing of the sheet stops and no document is produced.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("No header found within the first {window} rows (best keyword density {best_density:.2})")]
    NoHeaderFound { window: usize, best_density: f64 },

    #[error("Sheet has {actual} {dimension}, limit is {limit}")]
    SizeLimitExceeded {
        dimension: Dimension,
        actual: usize,
        limit: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ConfigError> for PipelineError {
    fn from(e: ConfigError) -> Self {
        PipelineError::InvalidConfig(e.to_string())
    }
}

impl From<LexiconError> for PipelineError {
    fn from(e: LexiconError) -> Self {
        PipelineError::InvalidConfig(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Rows,
    Columns,
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rows => write!(f, "rows"),
            Self::Columns => write!(f, "columns"),
        }
    }
}

/// Conditions that do not invalidate the document but must not go unseen.
/// Attached to a successful [`crate::PipelineOutput`] in detection order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineWarning {
    /// Two source columns resolved to the same key; the later one was
    /// suffixed instead of dropped.
    AmbiguousMapping {
        column: usize,
        label: String,
        wanted: CanonicalKey,
        assigned: CanonicalKey,
    },
    /// Label matched nothing in the dictionary; the key is derived from the
    /// label text and carries confidence 0.
    PassthroughColumn {
        column: usize,
        label: String,
        key: CanonicalKey,
    },
    /// Two merge regions cover the same cell. The span with the smallest
    /// anchor row owns it.
    MergeConflict {
        row: usize,
        column: usize,
        winner: SpanId,
        loser: SpanId,
    },
    /// A money or quantity cell that is not a number; kept as text.
    NonNumericValue {
        row: usize,
        key: CanonicalKey,
        text: String,
    },
    EncodingAnomaly {
        row: usize,
        column: usize,
        anomaly: TextAnomaly,
    },
}

impl PipelineWarning {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AmbiguousMapping { .. } => "ambiguous_mapping",
            Self::PassthroughColumn { .. } => "passthrough_column",
            Self::MergeConflict { .. } => "merge_conflict",
            Self::NonNumericValue { .. } => "non_numeric_value",
            Self::EncodingAnomaly { .. } => "encoding_anomaly",
        }
    }
}
