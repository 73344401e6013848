//! Footer Filter: drops totals, signature blocks and notes wherever they
//! appear after the header, not only at the end of the sheet.

use crate::grid::PropagatedRow;
use crate::lexicon::{FooterLexicon, FooterPhrase};
use crate::text::fold_tokens;

pub struct FooterFilter<'a> {
    lexicon: &'a FooterLexicon,
}

impl<'a> FooterFilter<'a> {
    pub fn new(lexicon: &'a FooterLexicon) -> Self {
        Self { lexicon }
    }

    /// First footer phrase found in `row`, in lexicon order.
    ///
    /// Matching is case- and diacritic-insensitive over folded tokens:
    /// - a multi-word phrase ("Tổng cộng") matches anywhere in the row's
    ///   token stream, across cell boundaries;
    /// - a single-word phrase ("Cộng") only matches as the first token of a
    ///   cell, so "Chi phí nhân công" is not a footer.
    pub fn matches(&self, row: &PropagatedRow) -> Option<&'a FooterPhrase> {
        let cells: Vec<Vec<String>> = row
            .non_blank()
            .filter_map(|(_, value)| value.display().map(|text| fold_tokens(&text)))
            .filter(|tokens| !tokens.is_empty())
            .collect();
        if cells.is_empty() {
            return None;
        }
        let stream: Vec<&String> = cells.iter().flatten().collect();

        self.lexicon.phrases().iter().find(|phrase| {
            let tokens = phrase.tokens();
            if tokens.len() == 1 {
                cells.iter().any(|cell| cell[0] == tokens[0])
            } else {
                stream
                    .windows(tokens.len())
                    .any(|window| window.iter().zip(tokens).all(|(a, b)| *a == b))
            }
        })
    }
}
