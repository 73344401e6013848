//! Fuzzy Header Matcher: header labels → canonical columns.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::PipelineWarning;
use crate::grid::ColumnLabel;
use crate::lexicon::{CanonicalDictionary, DictionaryEntry, Similarity, ValueKind};
use crate::text::{fold, normalize_text, slug};
use crate::types::CanonicalKey;

/// A resolved semantic column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalColumn {
    pub key: CanonicalKey,
    pub kind: ValueKind,
    /// Similarity of the winning alias, rounded to 4 places. 0 for
    /// passthrough columns.
    pub confidence: f64,
    /// Label parts as written in the sheet: `[label]`, or `[parent, child]`
    /// for a column under a merged header span.
    pub source_labels: Vec<String>,
    pub origin_columns: Vec<usize>,
}

impl CanonicalColumn {
    pub fn is_recognized(&self) -> bool {
        self.confidence > 0.0
    }
}

/// Columns in source order plus the warnings raised while resolving them.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMap {
    pub columns: Vec<CanonicalColumn>,
    pub warnings: Vec<PipelineWarning>,
}

/// Best alias hit for a label.
#[derive(Debug, Clone, Copy)]
pub struct AliasMatch<'d> {
    pub entry: &'d DictionaryEntry,
    pub score: f64,
}

pub struct HeaderMatcher<'a, S> {
    dictionary: &'a CanonicalDictionary,
    similarity: &'a S,
    threshold: f64,
}

impl<'a, S> HeaderMatcher<'a, S>
where
    S: Similarity,
{
    pub fn new(dictionary: &'a CanonicalDictionary, similarity: &'a S, threshold: f64) -> Self {
        Self {
            dictionary,
            similarity,
            threshold,
        }
    }

    /// Highest-scoring entry at or above the threshold.
    ///
    /// Entries are visited in declaration order and a later entry only
    /// replaces the current best with a strictly higher score, so ties go to
    /// the entry declared first.
    pub fn best_match(&self, label: &str) -> Option<AliasMatch<'a>> {
        let folded = fold(label);
        if folded.is_empty() {
            return None;
        }

        let mut best: Option<AliasMatch<'a>> = None;
        for entry in self.dictionary.entries() {
            for alias in entry.folded_aliases() {
                let score = self.similarity.similarity(&folded, alias);
                if score < self.threshold {
                    continue;
                }
                if best.map_or(true, |b| score > b.score) {
                    best = Some(AliasMatch { entry, score });
                }
            }
        }
        best
    }

    pub fn resolve(&self, labels: &[ColumnLabel]) -> ColumnMap {
        let mut used: BTreeSet<CanonicalKey> = BTreeSet::new();
        let mut columns = Vec::with_capacity(labels.len());
        let mut warnings = Vec::new();

        for label in labels {
            let shown = normalize_text(&label.text).text;
            let (wanted, kind, confidence, source_labels) = match &label.composite {
                Some(composite) => {
                    let child = slug(&composite.child)
                        .unwrap_or_else(|| CanonicalKey::positional(label.column));
                    let parent = normalize_text(&composite.parent).text;
                    let child_text = normalize_text(&composite.child).text;
                    match self.best_match(&composite.parent) {
                        Some(hit) => (
                            hit.entry.key.join(&child),
                            hit.entry.kind,
                            hit.score,
                            vec![parent, child_text],
                        ),
                        None => {
                            let parent_key = slug(&composite.parent)
                                .unwrap_or_else(|| CanonicalKey::positional(label.column));
                            (
                                parent_key.join(&child),
                                ValueKind::Text,
                                0.0,
                                vec![parent, child_text],
                            )
                        }
                    }
                }
                None => match self.best_match(&label.text) {
                    Some(hit) => (
                        hit.entry.key.clone(),
                        hit.entry.kind,
                        hit.score,
                        vec![shown.clone()],
                    ),
                    None => (
                        slug(&label.text).unwrap_or_else(|| CanonicalKey::positional(label.column)),
                        ValueKind::Text,
                        0.0,
                        vec![shown.clone()],
                    ),
                },
            };

            let key = if used.contains(&wanted) {
                let assigned = (2..)
                    .map(|n| wanted.suffixed(n))
                    .find(|candidate| !used.contains(candidate))
                    .unwrap_or_else(|| wanted.clone());
                warn!(
                    "HeaderMatcher: column={} label='{}' maps to taken key {}; assigned {}",
                    label.column, shown, wanted, assigned
                );
                warnings.push(PipelineWarning::AmbiguousMapping {
                    column: label.column,
                    label: shown.clone(),
                    wanted: wanted.clone(),
                    assigned: assigned.clone(),
                });
                assigned
            } else {
                wanted
            };

            if confidence == 0.0 {
                warnings.push(PipelineWarning::PassthroughColumn {
                    column: label.column,
                    label: shown.clone(),
                    key: key.clone(),
                });
            }

            debug!(
                "HeaderMatcher: column={} '{}' -> {} ({:?}, confidence={:.4})",
                label.column, shown, key, kind, confidence
            );

            used.insert(key.clone());
            columns.push(CanonicalColumn {
                key,
                kind,
                confidence: round_confidence(confidence),
                source_labels,
                origin_columns: vec![label.column],
            });
        }

        ColumnMap { columns, warnings }
    }
}

pub(crate) fn round_confidence(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}
