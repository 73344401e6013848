use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use super::document::{CanonicalDocument, CanonicalRecord, CanonicalValue};
use crate::config::PipelineConfig;
use crate::error::PipelineWarning;
use crate::grid::{CellValue, PropagatedRow};
use crate::lexicon::ValueKind;
use crate::matcher::CanonicalColumn;
use crate::text::{decimal_from_f64, fixed_point, normalize_text, parse_decimal};

/// Streams data rows into [`CanonicalRecord`]s.
///
/// Holds the records built so far and nothing else; each pushed row is
/// normalized and released.
pub struct Canonicalizer<'a> {
    columns: &'a [CanonicalColumn],
    config: &'a PipelineConfig,
    records: Vec<CanonicalRecord>,
    warnings: Vec<PipelineWarning>,
}

impl<'a> Canonicalizer<'a> {
    pub fn new(columns: &'a [CanonicalColumn], config: &'a PipelineConfig) -> Self {
        Self {
            columns,
            config,
            records: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: &PropagatedRow) {
        let mut values = BTreeMap::new();
        for column in self.columns {
            let (origin, raw) = first_non_blank(row, &column.origin_columns);
            let value = self.normalize(raw, column, row.index, origin);
            values.insert(column.key.clone(), value);
        }
        self.records.push(CanonicalRecord {
            source_row: row.index,
            values,
        });
    }

    pub fn finish(self) -> (CanonicalDocument, Vec<PipelineWarning>) {
        let columns = self
            .columns
            .iter()
            .map(|c| (c.key.clone(), c.clone()))
            .collect();

        debug!(
            "Canonicalizer: records={} columns={} warnings={}",
            self.records.len(),
            self.columns.len(),
            self.warnings.len()
        );

        (
            CanonicalDocument {
                columns,
                records: self.records,
            },
            self.warnings,
        )
    }

    fn normalize(
        &mut self,
        raw: &CellValue,
        column: &CanonicalColumn,
        row: usize,
        origin: usize,
    ) -> Option<CanonicalValue> {
        let precision = match column.kind {
            ValueKind::Money => Some(self.config.money_precision),
            ValueKind::Quantity => Some(self.config.quantity_precision),
            ValueKind::Text => None,
        };

        let text = match raw {
            CellValue::Empty => return None,
            CellValue::Number(n) => match decimal_from_f64(*n) {
                Some(decimal) => {
                    return Some(match precision {
                        Some(dp) => numeric_value(column.kind, fixed_point(decimal, dp)),
                        None => CanonicalValue::Text(decimal.normalize().to_string()),
                    });
                }
                // Beyond Decimal's range: keep the digits, flag below.
                None => n.to_string(),
            },
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Text(s) => {
                let normalized = normalize_text(s);
                if let Some(anomaly) = normalized.anomaly {
                    self.warnings.push(PipelineWarning::EncodingAnomaly {
                        row,
                        column: origin,
                        anomaly,
                    });
                }
                normalized.text
            }
        };

        if text.is_empty() {
            return None;
        }

        let Some(dp) = precision else {
            return Some(CanonicalValue::Text(text));
        };

        match parse_decimal(&text) {
            Some(decimal) => Some(numeric_value(column.kind, fixed_point(decimal, dp))),
            None => {
                self.warnings.push(PipelineWarning::NonNumericValue {
                    row,
                    key: column.key.clone(),
                    text: text.clone(),
                });
                Some(CanonicalValue::Text(text))
            }
        }
    }
}

fn numeric_value(kind: ValueKind, value: Decimal) -> CanonicalValue {
    match kind {
        ValueKind::Money => CanonicalValue::Money(value),
        _ => CanonicalValue::Quantity(value),
    }
}

/// First non-blank cell among a column's origins, or the first origin.
fn first_non_blank<'r>(row: &'r PropagatedRow, origins: &[usize]) -> (usize, &'r CellValue) {
    static EMPTY: CellValue = CellValue::Empty;
    origins
        .iter()
        .filter_map(|&c| row.cells.get(c).map(|v| (c, v)))
        .find(|(_, v)| !v.is_blank())
        .or_else(|| origins.first().map(|&c| (c, row.cells.get(c).unwrap_or(&EMPTY))))
        .unwrap_or((0, &EMPTY))
}
