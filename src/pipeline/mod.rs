//! Orchestration of one sheet through every stage, strictly forward:
//! load, propagate, classify, match, filter footers, canonicalize.

pub mod run_log;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use run_log::{RunEvent, RunLog};

use crate::canonical::{CanonicalDocument, Canonicalizer};
use crate::classify::{HeaderLayout, RowClassification, RowClassifier, RowRole, RowScore};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineWarning};
use crate::footer::FooterFilter;
use crate::grid::{GridLoader, MergePropagator, SheetData};
use crate::lexicon::{JaroWinkler, Lexicon, Similarity};
use crate::matcher::{round_confidence, ColumnMap, HeaderMatcher};
use crate::types::ContentHash;

/// Everything a successful invocation produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub input_hash: ContentHash,
    /// Hash of [`CanonicalDocument::canonical_bytes`].
    pub content_hash: ContentHash,
    pub document: CanonicalDocument,
    pub header_row: usize,
    /// One entry per grid row, in row order.
    pub classifications: Vec<RowClassification>,
    pub warnings: Vec<PipelineWarning>,
    pub run_log: RunLog,
}

/// Configured pipeline. Immutable once built; `run` may be called from any
/// number of threads at once.
#[derive(Debug, Clone)]
pub struct Pipeline<S = JaroWinkler> {
    config: PipelineConfig,
    lexicon: Lexicon,
    similarity: S,
}

impl Pipeline<JaroWinkler> {
    pub fn new(config: PipelineConfig, lexicon: Lexicon) -> Result<Self, PipelineError> {
        Self::with_similarity(config, lexicon, JaroWinkler)
    }

    /// Default thresholds with the built-in Vietnamese QS vocabulary.
    pub fn qs_default() -> Self {
        Self {
            config: PipelineConfig::default(),
            lexicon: Lexicon::qs_default(),
            similarity: JaroWinkler,
        }
    }
}

impl<S> Pipeline<S>
where
    S: Similarity,
{
    pub fn with_similarity(
        config: PipelineConfig,
        lexicon: Lexicon,
        similarity: S,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            config,
            lexicon,
            similarity,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn run(&self, sheet: &SheetData) -> Result<PipelineOutput, PipelineError> {
        let mut run_log = RunLog::default();
        let mut warnings = Vec::new();

        // 1. Load
        let grid = GridLoader::new(&self.config).load(sheet)?;
        run_log.push(RunEvent::GridLoaded {
            rows: grid.height(),
            columns: grid.width(),
            spans: grid.spans().len(),
            input_hash: grid.input_hash().clone(),
        });

        // 2. Propagate
        let propagator = MergePropagator::new(&grid);
        for overlap in grid.overlaps() {
            warnings.push(PipelineWarning::MergeConflict {
                row: overlap.row,
                column: overlap.col,
                winner: overlap.winner,
                loser: overlap.loser,
            });
            run_log.push(RunEvent::MergeConflict {
                row: overlap.row,
                column: overlap.col,
                winner: overlap.winner,
                loser: overlap.loser,
            });
        }

        // 3. Score the header window and select the header
        let classifier =
            RowClassifier::new(&self.config, &self.lexicon.dictionary, &self.similarity);
        let window_end = self.config.header_window.min(propagator.height());
        let window_scores: Vec<RowScore> = (0..window_end)
            .map(|r| classifier.score(&propagator.row(r)))
            .collect();

        let selection = match classifier.select_header(&window_scores) {
            Ok(selection) => selection,
            Err(e) => {
                warn!("Pipeline: sheet={} {}", grid.name().unwrap_or("-"), e);
                return Err(e);
            }
        };
        run_log.push(RunEvent::HeaderSelected {
            row: selection.header_row,
            keyword_density: round_confidence(selection.keyword_density),
            tied_candidates: selection.tied_candidates,
        });

        // 4. Resolve header labels to canonical columns
        let header = propagator.header_labels(selection.header_row);
        let layout = HeaderLayout {
            header_row: selection.header_row,
            sub_header_through: header.sub_header_through,
        };
        if let Some(through) = header.sub_header_through {
            run_log.push(RunEvent::SubHeaderConsumed {
                first: selection.header_row + 1,
                through,
            });
        }

        let matcher = HeaderMatcher::new(
            &self.lexicon.dictionary,
            &self.similarity,
            self.config.similarity_threshold,
        );
        let ColumnMap {
            columns,
            warnings: mapping_warnings,
        } = matcher.resolve(&header.labels);
        for column in &columns {
            run_log.push(RunEvent::ColumnMapped {
                key: column.key.clone(),
                origin_columns: column.origin_columns.clone(),
                confidence: column.confidence,
            });
        }
        warnings.extend(mapping_warnings);

        // 5. Stream rows: classify, drop footers, canonicalize data
        let footer = FooterFilter::new(&self.lexicon.footer);
        let mut canonicalizer = Canonicalizer::new(&columns, &self.config);
        let mut classifications = Vec::with_capacity(propagator.height());

        for row in propagator.rows() {
            let score = match window_scores.get(row.index) {
                Some(score) => *score,
                None => classifier.score_numeric(&row),
            };
            let phrase = if row.index > layout.last_row() {
                footer.matches(&row)
            } else {
                None
            };

            let role = layout.role(&score, phrase.is_some());
            match (role, phrase) {
                (RowRole::Data, _) => canonicalizer.push_row(&row),
                (RowRole::Footer, Some(phrase)) => {
                    debug!(
                        "FooterFilter: row={} excluded by '{}'",
                        row.index, phrase.phrase
                    );
                    run_log.push(RunEvent::FooterExcluded {
                        row: row.index,
                        phrase: phrase.phrase.clone(),
                    });
                }
                _ => {}
            }
            classifications.push(classifier.classification(&score, role));
        }

        // 6. Finish and hash
        let (document, canonical_warnings) = canonicalizer.finish();
        warnings.extend(canonical_warnings);
        let content_hash = document.content_hash()?;

        run_log.push(RunEvent::RecordsEmitted {
            records: document.records.len(),
            warnings: warnings.len(),
        });
        run_log.push(RunEvent::Completed {
            content_hash: content_hash.clone(),
        });

        info!(
            "Pipeline: sheet={} header_row={} columns={} records={} warnings={} content_hash={}",
            grid.name().unwrap_or("-"),
            selection.header_row,
            document.columns.len(),
            document.records.len(),
            warnings.len(),
            content_hash
        );

        Ok(PipelineOutput {
            input_hash: grid.input_hash().clone(),
            content_hash,
            document,
            header_row: selection.header_row,
            classifications,
            warnings,
            run_log,
        })
    }
}
