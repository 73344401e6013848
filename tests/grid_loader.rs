use qs_canon::config::PipelineConfig;
use qs_canon::error::Dimension;
use qs_canon::grid::{CellValue, GridLoader, MergePropagator, MergeRegion, SheetData};
use qs_canon::PipelineError;

fn cell(s: &str) -> CellValue {
    if s.is_empty() {
        CellValue::Empty
    } else {
        CellValue::from(s)
    }
}

fn load(sheet: &SheetData) -> Result<qs_canon::grid::RawGrid, PipelineError> {
    GridLoader::new(&PipelineConfig::default()).load(sheet)
}

#[test]
fn ragged_rows_are_padded_and_trailing_blanks_trimmed() {
    let sheet = SheetData::new(vec![
        vec![cell("Hạng mục"), cell("Đơn vị"), cell(""), cell("  ")],
        vec![cell("Đào móng")],
        vec![cell("Lấp đất"), cell("m3"), cell(""), cell(""), cell("")],
    ]);

    let grid = load(&sheet).unwrap();

    assert_eq!(grid.height(), 3);
    assert_eq!(grid.width(), 2);
    assert_eq!(grid.cell(1, 1).unwrap().value, CellValue::Empty);
    assert!(grid.cell(0, 2).is_none());
}

#[test]
fn merge_region_keeps_blank_columns_it_reaches() {
    let sheet = SheetData::new(vec![
        vec![cell("Khối lượng"), cell(""), cell("")],
        vec![1.0.into()],
    ])
    .with_merges(vec![MergeRegion::new(0, 0, 0, 2)]);

    let grid = load(&sheet).unwrap();

    assert_eq!(grid.width(), 3);
    assert_eq!(grid.spans().len(), 1);
    assert_eq!(grid.cell(0, 2).unwrap().span, Some(grid.spans()[0].id));
}

#[test]
fn empty_sheets_are_unsupported() {
    assert!(matches!(
        load(&SheetData::new(vec![])),
        Err(PipelineError::UnsupportedFormat(_))
    ));
    assert!(matches!(
        load(&SheetData::new(vec![vec![cell(""), cell(" ")], vec![]])),
        Err(PipelineError::UnsupportedFormat(_))
    ));
}

#[test]
fn invalid_merges_are_unsupported() {
    let rows = vec![vec![cell("a"), cell("b")], vec![cell("c"), cell("d")]];

    let inverted = SheetData::new(rows.clone()).with_merges(vec![MergeRegion::new(1, 0, 0, 0)]);
    assert!(matches!(load(&inverted), Err(PipelineError::UnsupportedFormat(_))));

    let outside = SheetData::new(rows).with_merges(vec![MergeRegion::new(0, 0, 5, 1)]);
    assert!(matches!(load(&outside), Err(PipelineError::UnsupportedFormat(_))));
}

#[test]
fn non_finite_numbers_are_unsupported() {
    let sheet = SheetData::new(vec![vec![cell("Khối lượng"), CellValue::Number(f64::NAN)]]);
    assert!(matches!(load(&sheet), Err(PipelineError::UnsupportedFormat(_))));
}

#[test]
fn size_limits_are_enforced() {
    let config = PipelineConfig {
        max_rows: 2,
        max_columns: 3,
        ..PipelineConfig::default()
    };
    let loader = GridLoader::new(&config);

    let tall = SheetData::new(vec![vec![cell("a")]; 3]);
    match loader.load(&tall) {
        Err(PipelineError::SizeLimitExceeded {
            dimension,
            actual,
            limit,
        }) => {
            assert_eq!(dimension, Dimension::Rows);
            assert_eq!(actual, 3);
            assert_eq!(limit, 2);
        }
        other => panic!("Expected SizeLimitExceeded, got {other:?}"),
    }

    let wide = SheetData::new(vec![vec![cell("a"), cell("b"), cell("c"), cell("d")]]);
    assert!(matches!(
        loader.load(&wide),
        Err(PipelineError::SizeLimitExceeded {
            dimension: Dimension::Columns,
            actual: 4,
            limit: 3,
        })
    ));

    // Trailing blank columns do not count against the limit
    let padded = SheetData::new(vec![vec![cell("a"), cell("b"), cell(""), cell(""), cell("")]]);
    assert_eq!(loader.load(&padded).unwrap().width(), 2);
}

#[test]
fn sheet_json_uses_plain_cell_values() {
    let sheet = SheetData::from_json_str(
        r#"{
            "name": "Bảng 1",
            "rows": [["Hạng mục", "Khối lượng"], ["Đào móng", 12.5], [null, true]],
            "merges": [{"first_row": 1, "first_col": 0, "last_row": 2, "last_col": 0}]
        }"#,
    )
    .unwrap();

    assert_eq!(sheet.rows[1][1], CellValue::Number(12.5));
    assert_eq!(sheet.rows[2][0], CellValue::Empty);
    assert_eq!(sheet.rows[2][1], CellValue::Bool(true));

    let grid = load(&sheet).unwrap();
    assert_eq!(grid.name(), Some("Bảng 1"));
    assert_eq!(grid.input_hash(), &sheet.input_hash().unwrap());
}

#[test]
fn merge_past_the_widest_row_pads_the_sheet() {
    let sheet = SheetData::new(vec![
        vec![cell("STT"), cell("Hạng mục"), cell("Ghi chú")],
        vec![1.0.into(), cell("Đào đất")],
    ])
    .with_merges(vec![MergeRegion::new(0, 2, 0, 3)]);

    let grid = load(&sheet).unwrap();

    assert_eq!(grid.width(), 4);
    assert_eq!(grid.cell(0, 3).unwrap().value, CellValue::Empty);
    assert_eq!(grid.cell(0, 3).unwrap().span, Some(grid.spans()[0].id));
    assert_eq!(grid.cell(1, 3).unwrap().value, CellValue::Empty);
    assert_eq!(MergePropagator::new(&grid).value(0, 3), cell("Ghi chú"));
}

#[test]
fn merge_wider_than_the_column_limit_is_rejected() {
    let sheet = SheetData::new(vec![vec![cell("Khối lượng")]])
        .with_merges(vec![MergeRegion::new(0, 0, 0, usize::MAX)]);

    assert!(matches!(
        load(&sheet),
        Err(PipelineError::SizeLimitExceeded {
            dimension: Dimension::Columns,
            ..
        })
    ));
}
