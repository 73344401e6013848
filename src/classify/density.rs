use std::cmp::Ordering;

use crate::grid::PropagatedRow;
use crate::lexicon::{CanonicalDictionary, Similarity};
use crate::text::fold;

/// Raw counts behind a row's densities.
///
/// Densities are kept as counts so that comparisons between rows are exact
/// rational comparisons, not float comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowScore {
    pub row: usize,
    pub non_blank: usize,
    pub keyword_hits: usize,
    pub numeric_hits: usize,
    /// `false` for rows past the header window; `keyword_hits` is then 0.
    pub keyword_scored: bool,
}

impl RowScore {
    pub fn keyword_density(&self) -> f64 {
        ratio(self.keyword_hits, self.non_blank)
    }

    pub fn numeric_density(&self) -> f64 {
        ratio(self.numeric_hits, self.non_blank)
    }

    /// `self.keyword_density()` compared with `other.keyword_density()`,
    /// computed by cross-multiplication.
    pub fn cmp_keyword_density(&self, other: &RowScore) -> Ordering {
        let lhs = self.keyword_hits as u128 * other.non_blank.max(1) as u128;
        let rhs = other.keyword_hits as u128 * self.non_blank.max(1) as u128;
        lhs.cmp(&rhs)
    }
}

fn ratio(hits: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

/// Counts non-blank, numeric and (optionally) keyword cells of a row.
///
/// A merge span covering several columns of the row counts as one cell.
pub fn score_row<S: Similarity>(
    row: &PropagatedRow,
    dictionary: &CanonicalDictionary,
    similarity: &S,
    threshold: f64,
    with_keywords: bool,
) -> RowScore {
    let mut non_blank = 0;
    let mut keyword_hits = 0;
    let mut numeric_hits = 0;

    for (_, value) in row.distinct_non_blank() {
        non_blank += 1;
        if value.is_numeric() {
            numeric_hits += 1;
            continue;
        }
        if with_keywords {
            if let Some(text) = value.display() {
                if is_keyword(&fold(&text), dictionary, similarity, threshold) {
                    keyword_hits += 1;
                }
            }
        }
    }

    RowScore {
        row: row.index,
        non_blank,
        keyword_hits,
        numeric_hits,
        keyword_scored: with_keywords,
    }
}

pub fn is_keyword<S: Similarity>(
    folded: &str,
    dictionary: &CanonicalDictionary,
    similarity: &S,
    threshold: f64,
) -> bool {
    !folded.is_empty()
        && dictionary
            .keywords()
            .iter()
            .any(|keyword| similarity.similarity(folded, keyword) >= threshold)
}
