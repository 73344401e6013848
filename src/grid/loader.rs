use tracing::debug;

use super::cell::{Cell, CellValue, MergeSpan, SheetData, SpanId, SpanOverlap};
use crate::config::PipelineConfig;
use crate::error::{Dimension, PipelineError};
use crate::types::ContentHash;

/// Rectangular, immutable cell matrix with merge metadata.
///
/// Owned by a single pipeline invocation and dropped once the document has
/// been canonicalized.
#[derive(Debug, Clone)]
pub struct RawGrid {
    name: Option<String>,
    width: usize,
    rows: Vec<Vec<Cell>>,
    spans: Vec<MergeSpan>,
    overlaps: Vec<SpanOverlap>,
    input_hash: ContentHash,
}

impl RawGrid {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Spans sorted by anchor (row, then column); `SpanId(n)` is `spans()[n]`.
    pub fn spans(&self) -> &[MergeSpan] {
        &self.spans
    }

    pub fn span(&self, id: SpanId) -> Option<&MergeSpan> {
        self.spans.get(id.0 as usize)
    }

    pub fn overlaps(&self) -> &[SpanOverlap] {
        &self.overlaps
    }

    pub fn input_hash(&self) -> &ContentHash {
        &self.input_hash
    }
}

pub struct GridLoader<'a> {
    config: &'a PipelineConfig,
}

impl<'a> GridLoader<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Normalizes a reader sheet into a [`RawGrid`].
    ///
    /// Rows are padded to a common width; trailing columns blank in every
    /// row are dropped unless a merge region reaches into them.
    pub fn load(&self, sheet: &SheetData) -> Result<RawGrid, PipelineError> {
        let height = sheet.rows.len();
        if height == 0 {
            return Err(PipelineError::UnsupportedFormat("sheet has no rows".into()));
        }
        if height > self.config.max_rows {
            return Err(PipelineError::SizeLimitExceeded {
                dimension: Dimension::Rows,
                actual: height,
                limit: self.config.max_rows,
            });
        }

        // 1. Validate values and measure the used extent
        let mut used_width = 0;
        for (r, row) in sheet.rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if let CellValue::Number(n) = value {
                    if !n.is_finite() {
                        return Err(PipelineError::UnsupportedFormat(format!(
                            "non-finite number at row {r}, column {c}"
                        )));
                    }
                }
                if !value.is_blank() {
                    used_width = used_width.max(c + 1);
                }
            }
        }

        // 2. Validate merge regions; columns they reach are padded like ragged rows
        let mut regions = sheet.merges.clone();
        for region in &regions {
            if region.first_row > region.last_row || region.first_col > region.last_col {
                return Err(PipelineError::UnsupportedFormat(format!(
                    "inverted merge region {region:?}"
                )));
            }
            if region.last_row >= height {
                return Err(PipelineError::UnsupportedFormat(format!(
                    "merge region {region:?} lies below the last of {height} rows"
                )));
            }
            used_width = used_width.max(region.last_col.saturating_add(1));
        }

        if used_width == 0 {
            return Err(PipelineError::UnsupportedFormat(
                "sheet has no non-blank cells".into(),
            ));
        }
        if used_width > self.config.max_columns {
            return Err(PipelineError::SizeLimitExceeded {
                dimension: Dimension::Columns,
                actual: used_width,
                limit: self.config.max_columns,
            });
        }

        // 3. Order spans by anchor so ids and ownership are input-order independent
        regions.sort();
        let spans: Vec<MergeSpan> = regions
            .into_iter()
            .enumerate()
            .map(|(i, region)| MergeSpan {
                id: SpanId(i as u32),
                region,
            })
            .collect();

        // 4. Assign ownership; the first claimant (smallest anchor) wins
        let mut owner: Vec<Vec<Option<SpanId>>> = vec![vec![None; used_width]; height];
        let mut overlaps = Vec::new();
        for span in &spans {
            for r in span.region.first_row..=span.region.last_row {
                for c in span.region.first_col..=span.region.last_col {
                    match owner[r][c] {
                        Some(winner) => overlaps.push(SpanOverlap {
                            row: r,
                            col: c,
                            winner,
                            loser: span.id,
                        }),
                        None => owner[r][c] = Some(span.id),
                    }
                }
            }
        }

        // 5. Materialize the rectangle
        let rows: Vec<Vec<Cell>> = owner
            .into_iter()
            .enumerate()
            .map(|(r, owners)| {
                let source = &sheet.rows[r];
                owners
                    .into_iter()
                    .enumerate()
                    .map(|(c, span)| Cell {
                        row: r,
                        col: c,
                        value: source.get(c).cloned().unwrap_or_default(),
                        span,
                    })
                    .collect()
            })
            .collect();

        let input_hash = sheet.input_hash()?;

        debug!(
            "GridLoader: loaded rows={} columns={} spans={} overlaps={}",
            height,
            used_width,
            spans.len(),
            overlaps.len()
        );

        Ok(RawGrid {
            name: sheet.name.clone(),
            width: used_width,
            rows,
            spans,
            overlaps,
            input_hash,
        })
    }
}
