use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::text::{collapse_whitespace, decimal_from_f64, parse_decimal};
use crate::types::ContentHash;

/// Raw value as delivered by the host spreadsheet reader.
///
/// JSON form is untagged: `null`, booleans, numbers and strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Parseable as a number: numeric cells, or text that
    /// [`parse_decimal`] accepts.
    pub fn is_numeric(&self) -> bool {
        match self {
            CellValue::Number(_) => true,
            CellValue::Text(s) => parse_decimal(s).is_some(),
            _ => false,
        }
    }

    /// Display text used for label and keyword comparison. `None` when blank.
    pub fn display(&self) -> Option<Cow<'_, str>> {
        match self {
            CellValue::Empty => None,
            CellValue::Bool(true) => Some(Cow::Borrowed("TRUE")),
            CellValue::Bool(false) => Some(Cow::Borrowed("FALSE")),
            CellValue::Number(n) => Some(Cow::Owned(
                decimal_from_f64(*n)
                    .map(|d| d.normalize().to_string())
                    .unwrap_or_else(|| n.to_string()),
            )),
            CellValue::Text(s) => {
                let collapsed = collapse_whitespace(s);
                if collapsed.is_empty() {
                    None
                } else {
                    Some(Cow::Owned(collapsed))
                }
            }
        }
    }
}

/// Identifier of a merge span, assigned in sorted anchor order by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpanId(pub u32);

impl std::fmt::Display for SpanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Merge region as reported by the host reader. Zero-based, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MergeRegion {
    pub first_row: usize,
    pub first_col: usize,
    pub last_row: usize,
    pub last_col: usize,
}

impl MergeRegion {
    pub fn new(first_row: usize, first_col: usize, last_row: usize, last_col: usize) -> Self {
        Self {
            first_row,
            first_col,
            last_row,
            last_col,
        }
    }
}

/// A validated merge region inside a [`super::RawGrid`]. The anchor is the
/// top-left cell; its value is what every covered cell displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSpan {
    pub id: SpanId,
    pub region: MergeRegion,
}

impl MergeSpan {
    pub fn anchor(&self) -> (usize, usize) {
        (self.region.first_row, self.region.first_col)
    }

    pub fn width(&self) -> usize {
        self.region.last_col - self.region.first_col + 1
    }

    pub fn height(&self) -> usize {
        self.region.last_row - self.region.first_row + 1
    }

    pub fn covers(&self, row: usize, col: usize) -> bool {
        (self.region.first_row..=self.region.last_row).contains(&row)
            && (self.region.first_col..=self.region.last_col).contains(&col)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub value: CellValue,
    /// Span owning this cell, if any.
    pub span: Option<SpanId>,
}

/// Two spans claimed the same cell. `winner` has the smaller anchor row
/// (then column) and owns the cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanOverlap {
    pub row: usize,
    pub col: usize,
    pub winner: SpanId,
    pub loser: SpanId,
}

/// Materialized sheet handed over by the external spreadsheet reader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetData {
    #[serde(default)]
    pub name: Option<String>,
    pub rows: Vec<Vec<CellValue>>,
    #[serde(default)]
    pub merges: Vec<MergeRegion>,
}

impl SheetData {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: None,
            rows,
            merges: Vec::new(),
        }
    }

    pub fn with_merges(mut self, merges: Vec<MergeRegion>) -> Self {
        self.merges = merges;
        self
    }

    pub fn from_json_str(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    /// Hash of the input exactly as received, before any trimming.
    pub fn input_hash(&self) -> Result<ContentHash, serde_json::Error> {
        ContentHash::of_json(self)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}
