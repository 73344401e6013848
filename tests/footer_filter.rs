use qs_canon::classify::RowRole;
use qs_canon::footer::FooterFilter;
use qs_canon::grid::{CellValue, PropagatedRow, SheetData};
use qs_canon::lexicon::{FooterLexicon, Lexicon};
use qs_canon::pipeline::RunEvent;
use qs_canon::Pipeline;

fn row(cells: &[&str]) -> Vec<CellValue> {
    cells
        .iter()
        .map(|s| if s.is_empty() { CellValue::Empty } else { CellValue::from(*s) })
        .collect()
}

fn propagated(cells: &[&str]) -> PropagatedRow {
    PropagatedRow {
        index: 0,
        cells: row(cells),
        repeated: vec![false; cells.len()],
    }
}

fn matched_phrase(lexicon: &FooterLexicon, cells: &[&str]) -> Option<String> {
    FooterFilter::new(lexicon)
        .matches(&propagated(cells))
        .map(|p| p.phrase.clone())
}

fn cluttered_sheet() -> SheetData {
    SheetData::new(vec![
        row(&["Ghi chú: số liệu tạm tính"]),
        row(&["STT", "Hạng mục", "Đơn vị", "Khối lượng"]),
        vec![1.0.into(), "Chi phí nhân công".into(), "ngày công".into(), 8.0.into()],
        row(&["", "Tổng cộng phần móng", "", ""]),
        vec![2.0.into(), "Vật liệu".into(), "m3".into(), 3.0.into()],
        row(&["", "Người lập", "", "Xác nhận"]),
        vec!["Cộng".into(), CellValue::Empty, CellValue::Empty, 11.0.into()],
    ])
}

#[test]
fn mid_sheet_totals_are_excluded() {
    let output = Pipeline::qs_default().run(&cluttered_sheet()).unwrap();

    let roles: Vec<RowRole> = output.classifications.iter().map(|c| c.role).collect();
    assert_eq!(
        roles,
        vec![
            RowRole::Metadata,
            RowRole::HeaderCandidate,
            RowRole::Data,
            RowRole::Footer,
            RowRole::Data,
            RowRole::Footer,
            RowRole::Footer,
        ]
    );

    let rows: Vec<usize> = output.document.records.iter().map(|r| r.source_row).collect();
    assert_eq!(rows, vec![2, 4]);
}

#[test]
fn footer_exclusions_are_logged_with_phrase() {
    let output = Pipeline::qs_default().run(&cluttered_sheet()).unwrap();

    let excluded: Vec<(usize, String)> = output
        .run_log
        .events()
        .iter()
        .filter_map(|event| match event {
            RunEvent::FooterExcluded { row, phrase } => Some((*row, phrase.clone())),
            _ => None,
        })
        .collect();

    assert_eq!(
        excluded,
        vec![
            (3, "Tổng cộng".to_string()),
            (5, "Xác nhận".to_string()),
            (6, "Cộng".to_string()),
        ]
    );
}

#[test]
fn labor_cost_line_is_kept() {
    let lexicon = FooterLexicon::qs_default();

    assert_eq!(matched_phrase(&lexicon, &["Chi phí nhân công"]), None);
    assert_eq!(matched_phrase(&lexicon, &["1", "Nhân công bậc 3,5/7", "công"]), Some("Cộng".to_string()));
    assert_eq!(matched_phrase(&lexicon, &["Cộng"]), Some("Cộng".to_string()));
}

#[test]
fn matching_ignores_case_and_diacritics() {
    let lexicon = FooterLexicon::qs_default();

    assert_eq!(matched_phrase(&lexicon, &["TỔNG CỘNG"]), Some("Tổng cộng".to_string()));
    assert_eq!(matched_phrase(&lexicon, &["tong cong"]), Some("Tổng cộng".to_string()));
    assert_eq!(matched_phrase(&lexicon, &["", "Ký tên", ""]), Some("Ký tên".to_string()));
}

#[test]
fn multi_word_phrase_may_span_cells() {
    let lexicon = FooterLexicon::qs_default();
    assert_eq!(
        matched_phrase(&lexicon, &["Người", "lập"]),
        Some("Người lập".to_string())
    );
}

#[test]
fn custom_footer_phrases_replace_defaults() {
    let lexicon = Lexicon::from_toml_str(
        r#"
footer = ["Subtotal"]

[[columns]]
key = "item"
kind = "text"
aliases = ["Item"]
"#,
    )
    .unwrap();

    assert_eq!(matched_phrase(&lexicon.footer, &["Subtotal", "100"]), Some("Subtotal".to_string()));
    assert_eq!(matched_phrase(&lexicon.footer, &["Tổng cộng"]), None);
}
