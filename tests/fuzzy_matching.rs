use qs_canon::canonical::CanonicalValue;
use qs_canon::grid::{CellValue, ColumnLabel, SheetData};
use qs_canon::lexicon::{CanonicalDictionary, JaroWinkler, ValueKind};
use qs_canon::matcher::HeaderMatcher;
use qs_canon::types::CanonicalKey;
use qs_canon::{Pipeline, PipelineWarning};

fn label(column: usize, text: &str) -> ColumnLabel {
    ColumnLabel {
        column,
        text: text.to_string(),
        composite: None,
    }
}

fn key(s: &str) -> CanonicalKey {
    CanonicalKey::new(s).unwrap()
}

fn best_key(dictionary: &CanonicalDictionary, text: &str) -> Option<String> {
    HeaderMatcher::new(dictionary, &JaroWinkler, 0.85)
        .best_match(text)
        .map(|hit| hit.entry.key.to_string())
}

#[test]
fn spelling_variants_resolve_to_one_key() {
    let dictionary = CanonicalDictionary::qs_default();

    for variant in ["Thành tiền", "thanh_tien", "THANH TIEN", "THÀNH TIỀN", "Thành tiền (VNĐ)"] {
        assert_eq!(best_key(&dictionary, variant).as_deref(), Some("thanh_tien"), "{variant}");
    }
    assert_eq!(best_key(&dictionary, "ĐVT").as_deref(), Some("don_vi"));
    assert_eq!(best_key(&dictionary, "Số TT").as_deref(), Some("stt"));
}

#[test]
fn exact_alias_beats_earlier_fuzzy_hit() {
    // "don gia" is a fuzzy hit for the earlier "don vi" entry too
    let dictionary = CanonicalDictionary::qs_default();
    let matcher = HeaderMatcher::new(&dictionary, &JaroWinkler, 0.85);

    let hit = matcher.best_match("Đơn giá").unwrap();
    assert_eq!(hit.entry.key.as_str(), "don_gia");
    assert_eq!(hit.score, 1.0);
}

#[test]
fn typo_matches_with_reduced_confidence() {
    let dictionary = CanonicalDictionary::qs_default();
    let map = HeaderMatcher::new(&dictionary, &JaroWinkler, 0.85).resolve(&[label(0, "Thanh tienn")]);

    let column = &map.columns[0];
    assert_eq!(column.key.as_str(), "thanh_tien");
    assert_eq!(column.kind, ValueKind::Money);
    assert!(column.confidence > 0.85 && column.confidence < 1.0);
    assert!(map.warnings.is_empty());
}

#[test]
fn unknown_label_passes_through_with_zero_confidence() {
    let dictionary = CanonicalDictionary::qs_default();
    let map = HeaderMatcher::new(&dictionary, &JaroWinkler, 0.85)
        .resolve(&[label(0, "zzz_unknown_col"), label(1, "   ")]);

    assert_eq!(map.columns[0].key.as_str(), "zzz_unknown_col");
    assert_eq!(map.columns[0].confidence, 0.0);
    assert_eq!(map.columns[0].kind, ValueKind::Text);
    assert!(!map.columns[0].is_recognized());

    assert_eq!(map.columns[1].key.as_str(), "col_2");
    assert_eq!(
        map.warnings,
        vec![
            PipelineWarning::PassthroughColumn {
                column: 0,
                label: "zzz_unknown_col".to_string(),
                key: key("zzz_unknown_col"),
            },
            PipelineWarning::PassthroughColumn {
                column: 1,
                label: String::new(),
                key: key("col_2"),
            },
        ]
    );
}

#[test]
fn duplicate_targets_are_suffixed_and_reported() {
    let sheet = SheetData::new(vec![
        vec!["STT".into(), "thanh_tien".into(), "Thành tiền".into(), "zzz_unknown_col".into()],
        vec![1.0.into(), 1000.0.into(), "2.500".into(), "x".into()],
    ]);

    let output = Pipeline::qs_default().run(&sheet).unwrap();

    let keys: Vec<&str> = output.document.keys().collect();
    assert_eq!(keys, vec!["stt", "thanh_tien", "thanh_tien_2", "zzz_unknown_col"]);

    let second = output.document.column("thanh_tien_2").unwrap();
    assert_eq!(second.kind, ValueKind::Money);
    assert_eq!(second.origin_columns, vec![2]);

    assert_eq!(
        output.warnings,
        vec![
            PipelineWarning::AmbiguousMapping {
                column: 2,
                label: "Thành tiền".to_string(),
                wanted: key("thanh_tien"),
                assigned: key("thanh_tien_2"),
            },
            PipelineWarning::PassthroughColumn {
                column: 3,
                label: "zzz_unknown_col".to_string(),
                key: key("zzz_unknown_col"),
            },
        ]
    );

    let record = &output.document.records[0];
    assert_eq!(record.get("thanh_tien"), Some(&CanonicalValue::Money("1000.00".parse().unwrap())));
    assert_eq!(record.get("thanh_tien_2"), Some(&CanonicalValue::Money("2500.00".parse().unwrap())));
    assert_eq!(record.get("zzz_unknown_col"), Some(&CanonicalValue::Text("x".to_string())));
}

#[test]
fn non_numeric_money_cell_is_kept_as_text_with_warning() {
    let sheet = SheetData::new(vec![
        vec!["Hạng mục".into(), "Thành tiền".into()],
        vec!["Đào móng".into(), "theo dự toán".into()],
    ]);

    let output = Pipeline::qs_default().run(&sheet).unwrap();

    let record = &output.document.records[0];
    assert_eq!(
        record.get("thanh_tien"),
        Some(&CanonicalValue::Text("theo dự toán".to_string()))
    );
    assert_eq!(
        output.warnings,
        vec![PipelineWarning::NonNumericValue {
            row: 1,
            key: key("thanh_tien"),
            text: "theo dự toán".to_string(),
        }]
    );
}

#[test]
fn encoding_anomaly_is_flagged_not_fatal() {
    let sheet = SheetData::new(vec![
        vec!["Hạng mục".into(), "Đơn vị".into()],
        vec![CellValue::from("Đào\u{0007}móng"), "m3".into()],
    ]);

    let output = Pipeline::qs_default().run(&sheet).unwrap();

    assert_eq!(
        output.document.records[0].get("hang_muc"),
        Some(&CanonicalValue::Text("Đào móng".to_string()))
    );
    assert_eq!(output.warnings.len(), 1);
    assert_eq!(output.warnings[0].kind(), "encoding_anomaly");
}
