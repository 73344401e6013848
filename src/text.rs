//! Text and number normalization shared by every stage.
//!
//! Nothing here consults the process locale: folding goes through
//! `deunicode`, composition through NFC, and numbers are parsed by explicit
//! separator rules into `rust_decimal::Decimal`.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::types::CanonicalKey;

/// Comparison form of a label: diacritics stripped, lowercase ASCII,
/// every run of non-alphanumerics collapsed to one space.
///
/// `"Thành tiền"`, `"thanh_tien"` and `"THANH TIEN"` all fold to
/// `"thanh tien"`.
pub fn fold(text: &str) -> String {
    fold_tokens(text).join(" ")
}

pub fn fold_tokens(text: &str) -> Vec<String> {
    let ascii = deunicode::deunicode(text).to_ascii_lowercase();
    ascii
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Derives a key from free text: `"Kỳ trước"` → `ky_truoc`.
/// Returns `None` when nothing alphanumeric survives folding.
pub fn slug(text: &str) -> Option<CanonicalKey> {
    let tokens = fold_tokens(text);
    if tokens.is_empty() {
        return None;
    }
    CanonicalKey::new(tokens.join("_")).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAnomaly {
    /// A C0/C1 control character was replaced by a space.
    ControlCharacter,
    /// U+FFFD was present: the host reader already lost the original byte.
    ReplacementCharacter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub text: String,
    pub anomaly: Option<TextAnomaly>,
}

/// NFC, trimmed, internal whitespace collapsed to single spaces.
pub fn normalize_text(raw: &str) -> NormalizedText {
    let mut anomaly = None;
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c == char::REPLACEMENT_CHARACTER {
                anomaly.get_or_insert(TextAnomaly::ReplacementCharacter);
                c
            } else if c.is_control() && !c.is_whitespace() {
                anomaly.get_or_insert(TextAnomaly::ControlCharacter);
                ' '
            } else {
                c
            }
        })
        .collect();

    let composed: String = cleaned.nfc().collect();

    NormalizedText {
        text: collapse_whitespace(&composed),
        anomaly,
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeparatorRole {
    Grouping(char),
    Decimal(char),
}

/// Parses a spreadsheet number written with either `.` or `,` as decimal
/// separator.
///
/// Rules:
/// - optional sign, or accounting parentheses for negatives
/// - spaces, NBSP and narrow NBSP are ignored
/// - both separators present: the last one is the decimal separator
/// - one separator appearing several times: grouping
/// - one separator appearing once: grouping if exactly three digits follow
///   and at least one precedes, decimal otherwise
/// - grouped integer parts must be `d{1,3}(sep d{3})*`
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    let (parenthesized, body) = match trimmed.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner.trim()),
        None => (false, trimmed),
    };
    let (signed_negative, body) = match body.as_bytes().first() {
        Some(b'-') => (true, &body[1..]),
        Some(b'+') => (false, &body[1..]),
        _ => (false, body),
    };
    if parenthesized && signed_negative {
        return None;
    }
    let negative = parenthesized || signed_negative;

    let compact: String = body
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}'))
        .collect();
    if !compact.chars().any(|c| c.is_ascii_digit())
        || !compact.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
    {
        return None;
    }

    let dots = compact.matches('.').count();
    let commas = compact.matches(',').count();
    let roles: Vec<SeparatorRole> = match (dots, commas) {
        (0, 0) => Vec::new(),
        (_, 0) => vec![single_kind_role('.', dots, &compact)],
        (0, _) => vec![single_kind_role(',', commas, &compact)],
        _ => {
            let last_dot = compact.rfind('.')?;
            let last_comma = compact.rfind(',')?;
            let (decimal, grouping) = if last_dot > last_comma { ('.', ',') } else { (',', '.') };
            vec![SeparatorRole::Decimal(decimal), SeparatorRole::Grouping(grouping)]
        }
    };

    let mut decimal_sep = None;
    let mut grouping_sep = None;
    for role in roles {
        match role {
            SeparatorRole::Decimal(c) => decimal_sep = Some(c),
            SeparatorRole::Grouping(c) => grouping_sep = Some(c),
        }
    }

    let (int_part, frac_part) = match decimal_sep {
        Some(sep) => {
            if compact.matches(sep).count() != 1 {
                return None;
            }
            let (int_part, frac_part) = compact.split_once(sep)?;
            (int_part, Some(frac_part))
        }
        None => (compact.as_str(), None),
    };

    if let Some(frac) = frac_part {
        if frac.is_empty() || !frac.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
    }

    let digits: String = match grouping_sep {
        Some(sep) => {
            let groups: Vec<&str> = int_part.split(sep).collect();
            let first_ok = (1..=3).contains(&groups[0].len());
            let rest_ok = groups[1..].iter().all(|g| g.len() == 3);
            if !first_ok || !rest_ok {
                return None;
            }
            groups.concat()
        }
        None => int_part.to_string(),
    };
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let mut normalized = String::with_capacity(digits.len() + 4);
    if negative {
        normalized.push('-');
    }
    normalized.push_str(if digits.is_empty() { "0" } else { &digits });
    if let Some(frac) = frac_part {
        normalized.push('.');
        normalized.push_str(frac);
    }

    Decimal::from_str(&normalized).ok()
}

fn single_kind_role(sep: char, count: usize, compact: &str) -> SeparatorRole {
    if count > 1 {
        return SeparatorRole::Grouping(sep);
    }
    match compact.find(sep) {
        Some(pos) if pos > 0 && compact.len() - pos - 1 == 3 => SeparatorRole::Grouping(sep),
        _ => SeparatorRole::Decimal(sep),
    }
}

/// Converts a reader-supplied float through its shortest round-trip decimal
/// text, so `0.1` becomes exactly `0.1`.
pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string()).ok()
}

/// Fixed-point form with exactly `dp` fractional digits.
pub fn fixed_point(value: Decimal, dp: u32) -> Decimal {
    let mut fixed = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    fixed.rescale(dp);
    if fixed.is_zero() {
        fixed.set_sign_positive(true);
    }
    fixed
}
