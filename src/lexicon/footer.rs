use super::LexiconError;
use crate::text::fold_tokens;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterPhrase {
    pub phrase: String,
    tokens: Vec<String>,
}

impl FooterPhrase {
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

/// Fixed set of phrases marking signature blocks, totals and notes.
#[derive(Debug, Clone)]
pub struct FooterLexicon {
    phrases: Vec<FooterPhrase>,
}

impl FooterLexicon {
    pub fn new(phrases: Vec<String>) -> Result<Self, LexiconError> {
        let mut folded = Vec::with_capacity(phrases.len());
        for phrase in phrases {
            let tokens = fold_tokens(&phrase);
            if tokens.is_empty() {
                return Err(LexiconError::BlankFooterPhrase(phrase));
            }
            folded.push(FooterPhrase { phrase, tokens });
        }
        Ok(Self { phrases: folded })
    }

    pub fn phrases(&self) -> &[FooterPhrase] {
        &self.phrases
    }

    pub fn qs_default() -> Self {
        let phrases = [
            "Tổng cộng",
            "Cộng",
            "Ký tên",
            "Ghi chú",
            "Xác nhận",
            "Người lập",
            "Đại diện",
        ];
        match Self::new(phrases.iter().map(|p| p.to_string()).collect()) {
            Ok(lexicon) => lexicon,
            Err(e) => unreachable!("built-in footer lexicon is invalid: {e}"),
        }
    }
}
