use serde::{Deserialize, Serialize};

use crate::grid::SpanId;
use crate::types::{CanonicalKey, ContentHash};

/// One step of a pipeline invocation.
///
/// Events carry no timestamps or durations so that two runs over the same
/// input produce byte-identical logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    GridLoaded {
        rows: usize,
        columns: usize,
        spans: usize,
        input_hash: ContentHash,
    },
    MergeConflict {
        row: usize,
        column: usize,
        winner: SpanId,
        loser: SpanId,
    },
    HeaderSelected {
        row: usize,
        keyword_density: f64,
        tied_candidates: usize,
    },
    SubHeaderConsumed {
        first: usize,
        through: usize,
    },
    ColumnMapped {
        key: CanonicalKey,
        origin_columns: Vec<usize>,
        confidence: f64,
    },
    FooterExcluded {
        row: usize,
        phrase: String,
    },
    RecordsEmitted {
        records: usize,
        warnings: usize,
    },
    Completed {
        content_hash: ContentHash,
    },
}

/// Ordered event log of a single invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunLog {
    events: Vec<RunEvent>,
}

impl RunLog {
    pub fn push(&mut self, event: RunEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[RunEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn hash(&self) -> Result<ContentHash, serde_json::Error> {
        ContentHash::of_json(self)
    }
}
