//! Row Classifier: scores rows and selects the header.

pub mod density;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{HeaderTieBreak, PipelineConfig};
use crate::error::PipelineError;
use crate::grid::PropagatedRow;
use crate::lexicon::{CanonicalDictionary, Similarity};
pub use density::{is_keyword, score_row, RowScore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowRole {
    /// Preamble above the header: titles, project name, dates.
    Metadata,
    /// The selected header row.
    HeaderCandidate,
    /// Sub-header text beneath a merged header span.
    SubHeader,
    Data,
    Footer,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowClassification {
    pub row: usize,
    pub role: RowRole,
    pub keyword_density: f64,
    pub numeric_density: f64,
    /// Numeric density exceeded the penalty threshold.
    pub numeric_penalty: bool,
}

/// Outcome of header selection over the header window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderSelection {
    pub header_row: usize,
    pub keyword_density: f64,
    /// Number of candidates that shared the winning density.
    pub tied_candidates: usize,
}

/// Header row plus the rows beneath it consumed as sub-header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLayout {
    pub header_row: usize,
    pub sub_header_through: Option<usize>,
}

impl HeaderLayout {
    /// Last row belonging to the header block.
    pub fn last_row(&self) -> usize {
        self.sub_header_through.unwrap_or(self.header_row)
    }

    /// Final role of a row once the header is known.
    ///
    /// Precedence: header block, preamble, blank, footer, data. Rows above
    /// the header never become data, numeric or not.
    ///
    /// The numeric penalty only bars a row from header selection. Once the
    /// header is fixed, a numeric-heavy row above it is still `Metadata`;
    /// this ordering is a tunable heuristic, pinned by
    /// `numeric_row_above_header_is_metadata`.
    pub fn role(&self, score: &RowScore, is_footer: bool) -> RowRole {
        if score.row == self.header_row {
            RowRole::HeaderCandidate
        } else if score.row > self.header_row && score.row <= self.last_row() {
            RowRole::SubHeader
        } else if score.row < self.header_row {
            RowRole::Metadata
        } else if score.non_blank == 0 {
            RowRole::Blank
        } else if is_footer {
            RowRole::Footer
        } else {
            RowRole::Data
        }
    }
}

pub struct RowClassifier<'a, S> {
    config: &'a PipelineConfig,
    dictionary: &'a CanonicalDictionary,
    similarity: &'a S,
}

impl<'a, S> RowClassifier<'a, S>
where
    S: Similarity,
{
    pub fn new(config: &'a PipelineConfig, dictionary: &'a CanonicalDictionary, similarity: &'a S) -> Self {
        Self {
            config,
            dictionary,
            similarity,
        }
    }

    /// Full score, keyword density included. Used inside the header window.
    pub fn score(&self, row: &PropagatedRow) -> RowScore {
        score_row(
            row,
            self.dictionary,
            self.similarity,
            self.config.similarity_threshold,
            true,
        )
    }

    /// Numeric density only. Rows past the window are never header
    /// candidates, so their keyword density is not computed.
    pub fn score_numeric(&self, row: &PropagatedRow) -> RowScore {
        score_row(
            row,
            self.dictionary,
            self.similarity,
            self.config.similarity_threshold,
            false,
        )
    }

    pub fn is_numeric_penalized(&self, score: &RowScore) -> bool {
        score.non_blank > 0 && score.numeric_density() > self.config.numeric_penalty
    }

    pub fn is_header_candidate(&self, score: &RowScore) -> bool {
        score.keyword_scored
            && score.non_blank >= self.config.min_header_cells
            && !self.is_numeric_penalized(score)
            && score.keyword_density() > self.config.min_keyword_density
    }

    /// Picks the header among the window's scores.
    ///
    /// The maximum keyword density among eligible candidates wins; equal
    /// densities are resolved by [`HeaderTieBreak`]. Rows at or past
    /// `header_window` are ignored even if present in `scores`.
    pub fn select_header(&self, scores: &[RowScore]) -> Result<HeaderSelection, PipelineError> {
        let window = self.config.header_window;
        let in_window = scores.iter().filter(|s| s.row < window);

        let mut best: Option<&RowScore> = None;
        let mut tied = 0;
        for score in in_window.clone().filter(|s| self.is_header_candidate(s)) {
            let Some(current) = best else {
                best = Some(score);
                tied = 1;
                continue;
            };
            match score.cmp_keyword_density(current) {
                Ordering::Greater => {
                    best = Some(score);
                    tied = 1;
                }
                Ordering::Equal => {
                    tied += 1;
                    if self.prefers(score, current) {
                        best = Some(score);
                    }
                }
                Ordering::Less => {}
            }
        }

        match best {
            Some(score) => {
                debug!(
                    "RowClassifier: header row={} keyword_density={:.4} tied_candidates={}",
                    score.row,
                    score.keyword_density(),
                    tied
                );
                Ok(HeaderSelection {
                    header_row: score.row,
                    keyword_density: score.keyword_density(),
                    tied_candidates: tied,
                })
            }
            None => {
                let best_density = in_window
                    .map(RowScore::keyword_density)
                    .fold(0.0_f64, f64::max);
                Err(PipelineError::NoHeaderFound {
                    window,
                    best_density,
                })
            }
        }
    }

    fn prefers(&self, challenger: &RowScore, incumbent: &RowScore) -> bool {
        match self.config.header_tie_break {
            HeaderTieBreak::PreferLater => challenger.row > incumbent.row,
            HeaderTieBreak::PreferEarlier => challenger.row < incumbent.row,
        }
    }

    pub fn classification(&self, score: &RowScore, role: RowRole) -> RowClassification {
        RowClassification {
            row: score.row,
            role,
            keyword_density: score.keyword_density(),
            numeric_density: score.numeric_density(),
            numeric_penalty: self.is_numeric_penalized(score),
        }
    }
}
