use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::cell::{CellValue, MergeSpan, SpanId};
use super::loader::RawGrid;

/// En dash joining a merged parent label and its child label.
pub const LABEL_SEPARATOR: &str = " – ";

/// One row after merge propagation. A fresh value; the grid is untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct PropagatedRow {
    pub index: usize,
    pub cells: Vec<CellValue>,
    /// `true` where a cell continues the merge span of the cell to its left.
    pub repeated: Vec<bool>,
}

impl PropagatedRow {
    pub fn non_blank(&self) -> impl Iterator<Item = (usize, &CellValue)> {
        self.cells.iter().enumerate().filter(|(_, v)| !v.is_blank())
    }

    /// Non-blank cells with every horizontal run of one merge span counted
    /// once, at its leftmost column.
    pub fn distinct_non_blank(&self) -> impl Iterator<Item = (usize, &CellValue)> {
        self.non_blank()
            .filter(|(c, _)| !self.repeated.get(*c).copied().unwrap_or(false))
    }
}

/// Parent/child split of a label produced by a horizontal merge span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeLabel {
    pub parent: String,
    pub child: String,
    /// `child` is a 1-based position inside the span rather than text from
    /// a sub-header row.
    pub positional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLabel {
    pub column: usize,
    /// Display text; `"{parent} – {child}"` for composite labels.
    pub text: String,
    pub composite: Option<CompositeLabel>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLabels {
    pub labels: Vec<ColumnLabel>,
    /// Last row consumed as sub-header text beneath a merged header span.
    /// Rows between the header and this one are part of the header block.
    pub sub_header_through: Option<usize>,
}

/// Lazy view of a [`RawGrid`] with every merged cell showing its anchor value.
///
/// Rows are produced one at a time so a large sheet is never copied whole.
pub struct MergePropagator<'g> {
    grid: &'g RawGrid,
}

impl<'g> MergePropagator<'g> {
    pub fn new(grid: &'g RawGrid) -> Self {
        for overlap in grid.overlaps() {
            warn!(
                "MergePropagator: spans {} and {} both cover row={} col={}; {} keeps it",
                overlap.winner, overlap.loser, overlap.row, overlap.col, overlap.winner
            );
        }
        Self { grid }
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// Value displayed at `(row, col)`. Covered cells show the anchor's raw
    /// value; all other cells show their own.
    pub fn value(&self, row: usize, col: usize) -> CellValue {
        let Some(cell) = self.grid.cell(row, col) else {
            return CellValue::Empty;
        };
        match cell.span.and_then(|id| self.grid.span(id)) {
            Some(span) => {
                let (ar, ac) = span.anchor();
                self.grid
                    .cell(ar, ac)
                    .map(|anchor| anchor.value.clone())
                    .unwrap_or_default()
            }
            None => cell.value.clone(),
        }
    }

    pub fn row(&self, row: usize) -> PropagatedRow {
        let mut cells = Vec::with_capacity(self.width());
        let mut repeated = Vec::with_capacity(self.width());
        let mut previous: Option<SpanId> = None;
        for c in 0..self.width() {
            let span = self.grid.cell(row, c).and_then(|cell| cell.span);
            repeated.push(span.is_some() && span == previous);
            previous = span;
            cells.push(self.value(row, c));
        }
        PropagatedRow {
            index: row,
            cells,
            repeated,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = PropagatedRow> + '_ {
        (0..self.height()).map(move |r| self.row(r))
    }

    /// Column labels of the selected header row.
    ///
    /// A cell under a span wider than one column becomes
    /// `"{anchor} – {child}"`. `child` comes from the row directly beneath
    /// the span when that row qualifies as a sub-header for the whole span;
    /// otherwise it is the 1-based position inside the span.
    pub fn header_labels(&self, header_row: usize) -> HeaderLabels {
        let mut sub_header_through: Option<usize> = None;
        let mut resolved: BTreeMap<SpanId, Option<(usize, Vec<String>)>> = BTreeMap::new();
        let mut labels = Vec::with_capacity(self.width());

        for col in 0..self.width() {
            let own_text = display_text(&self.value(header_row, col));
            let span = self
                .grid
                .cell(header_row, col)
                .and_then(|cell| cell.span)
                .and_then(|id| self.grid.span(id))
                .filter(|span| span.width() > 1);

            let Some(span) = span else {
                labels.push(ColumnLabel {
                    column: col,
                    text: own_text,
                    composite: None,
                });
                continue;
            };

            let offset = col - span.region.first_col;
            let sub = resolved
                .entry(span.id)
                .or_insert_with(|| self.sub_labels(span));
            let (child, positional) = match sub {
                Some((below, texts)) => {
                    sub_header_through = Some(sub_header_through.map_or(*below, |r| r.max(*below)));
                    (texts[offset].clone(), false)
                }
                None => ((offset + 1).to_string(), true),
            };

            if own_text.is_empty() {
                // Blank merged parent: the child alone is the label.
                labels.push(ColumnLabel {
                    column: col,
                    text: if positional { String::new() } else { child },
                    composite: None,
                });
                continue;
            }

            labels.push(ColumnLabel {
                column: col,
                text: format!("{own_text}{LABEL_SEPARATOR}{child}"),
                composite: Some(CompositeLabel {
                    parent: own_text,
                    child,
                    positional,
                }),
            });
        }

        HeaderLabels {
            labels,
            sub_header_through,
        }
    }

    /// Child labels for every column of `span`, taken from the row beneath it.
    ///
    /// That row qualifies only when it holds no numeric cell anywhere and
    /// distinct non-blank text under each of the span's columns. A first data
    /// row sitting under a wide label never qualifies, so it is never
    /// swallowed into the header.
    fn sub_labels(&self, span: &MergeSpan) -> Option<(usize, Vec<String>)> {
        let below = span.region.last_row + 1;
        if below >= self.height() {
            return None;
        }
        let row = self.row(below);
        if row.cells.iter().any(CellValue::is_numeric) {
            return None;
        }

        let texts: Vec<String> = (span.region.first_col..=span.region.last_col)
            .map(|c| display_text(&row.cells[c]))
            .collect();
        if texts.iter().any(String::is_empty) {
            return None;
        }
        let distinct: BTreeSet<&String> = texts.iter().collect();
        if distinct.len() != texts.len() {
            return None;
        }

        Some((below, texts))
    }
}

fn display_text(value: &CellValue) -> String {
    value.display().map(|t| t.into_owned()).unwrap_or_default()
}
