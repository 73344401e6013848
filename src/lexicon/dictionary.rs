use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::LexiconError;
use crate::text::fold;
use crate::types::CanonicalKey;

/// How a column's cells are normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Fixed-point with the configured money precision.
    Money,
    /// Fixed-point with the configured quantity precision.
    Quantity,
    Text,
}

/// Declarative form of one dictionary entry, as written in TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySpec {
    pub key: String,
    pub kind: ValueKind,
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DictionaryEntry {
    pub key: CanonicalKey,
    pub kind: ValueKind,
    pub aliases: Vec<String>,
    /// `aliases` folded once at construction, same order.
    folded: Vec<String>,
}

impl DictionaryEntry {
    pub fn folded_aliases(&self) -> &[String] {
        &self.folded
    }
}

/// Ordered alias table: semantic key → known spellings.
///
/// Declaration order is significant. It is the tie-break when two entries
/// score equally against a label, so the table is a `Vec`, never a hash map.
#[derive(Debug, Clone)]
pub struct CanonicalDictionary {
    entries: Vec<DictionaryEntry>,
    keywords: Vec<String>,
}

impl CanonicalDictionary {
    pub fn new(specs: Vec<EntrySpec>) -> Result<Self, LexiconError> {
        let mut seen = BTreeSet::new();
        let mut entries = Vec::with_capacity(specs.len());

        for spec in specs {
            let key = CanonicalKey::new(spec.key.clone())
                .map_err(|source| LexiconError::InvalidKey { key: spec.key.clone(), source })?;
            if !seen.insert(key.clone()) {
                return Err(LexiconError::DuplicateKey(spec.key));
            }
            if spec.aliases.is_empty() {
                return Err(LexiconError::NoAliases(spec.key));
            }

            let mut folded = Vec::with_capacity(spec.aliases.len());
            for alias in &spec.aliases {
                let f = fold(alias);
                if f.is_empty() {
                    return Err(LexiconError::BlankAlias(spec.key));
                }
                folded.push(f);
            }

            entries.push(DictionaryEntry {
                key,
                kind: spec.kind,
                aliases: spec.aliases,
                folded,
            });
        }

        if entries.is_empty() {
            return Err(LexiconError::EmptyDictionary);
        }

        // Sorted and deduplicated so keyword scanning order never depends on
        // how the table was declared.
        let keywords = entries
            .iter()
            .flat_map(|e| e.folded.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Ok(Self { entries, keywords })
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    pub fn get(&self, key: &CanonicalKey) -> Option<&DictionaryEntry> {
        self.entries.iter().find(|e| &e.key == key)
    }

    /// Every folded alias, sorted, deduplicated. Used for keyword density.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Vietnamese quantity-survey / BOQ column vocabulary.
    pub fn qs_default() -> Self {
        let spec = |key: &str, kind: ValueKind, aliases: &[&str]| EntrySpec {
            key: key.to_string(),
            kind,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        };

        let specs = vec![
            spec("stt", ValueKind::Text, &["STT", "TT", "Số thứ tự", "Số TT"]),
            spec(
                "ma_hieu",
                ValueKind::Text,
                &["Mã hiệu", "Mã số", "Mã hiệu đơn giá", "Mã công việc", "Mã định mức"],
            ),
            spec(
                "hang_muc",
                ValueKind::Text,
                &[
                    "Hạng mục",
                    "Nội dung công việc",
                    "Nội dung",
                    "Tên công việc",
                    "Diễn giải",
                    "Mô tả",
                    "Tên vật tư",
                ],
            ),
            spec("don_vi", ValueKind::Text, &["Đơn vị", "ĐVT", "Đơn vị tính"]),
            spec(
                "khoi_luong",
                ValueKind::Quantity,
                &["Khối lượng", "KL", "Số lượng", "Khối lượng thực hiện"],
            ),
            spec(
                "khoi_luong_tinh_toan",
                ValueKind::Quantity,
                &["Khối lượng tính toán", "KL tính toán", "Khối lượng dự toán", "KL dự toán"],
            ),
            spec(
                "khoi_luong_thuc_te",
                ValueKind::Quantity,
                &["Khối lượng thực tế", "KL thực tế", "Đo lường thực tế"],
            ),
            spec("don_gia", ValueKind::Money, &["Đơn giá", "Đơn giá (VNĐ)"]),
            spec(
                "thanh_tien",
                ValueKind::Money,
                &["Thành tiền", "thanh tien", "THANH_TIEN", "Thành tiền (VNĐ)", "Giá trị"],
            ),
            spec("trang_thai", ValueKind::Text, &["Trạng thái", "Tình trạng", "Status"]),
            spec("ghi_chu", ValueKind::Text, &["Ghi chú", "Note"]),
        ];

        match Self::new(specs) {
            Ok(dictionary) => dictionary,
            Err(e) => unreachable!("built-in dictionary is invalid: {e}"),
        }
    }
}
