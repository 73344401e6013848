use qs_canon::config::{ConfigError, HeaderTieBreak, PipelineConfig};
use qs_canon::grid::SheetData;
use qs_canon::lexicon::{Lexicon, LexiconError, ValueKind};
use qs_canon::{Pipeline, PipelineError};

#[test]
fn defaults_match_documented_thresholds() {
    let config = PipelineConfig::default();

    assert_eq!(config.similarity_threshold, 0.85);
    assert_eq!(config.header_window, 50);
    assert_eq!(config.min_keyword_density, 0.30);
    assert_eq!(config.numeric_penalty, 0.70);
    assert_eq!(config.min_header_cells, 2);
    assert_eq!(config.money_precision, 2);
    assert_eq!(config.quantity_precision, 4);
    assert_eq!(config.header_tie_break, HeaderTieBreak::PreferLater);
    assert!(config.validate().is_ok());
}

#[test]
fn partial_toml_keeps_remaining_defaults() {
    let config = PipelineConfig::from_toml_str(
        r#"
similarity_threshold = 0.9
header_window = 20
header_tie_break = "prefer_earlier"
"#,
    )
    .unwrap();

    assert_eq!(config.similarity_threshold, 0.9);
    assert_eq!(config.header_window, 20);
    assert_eq!(config.header_tie_break, HeaderTieBreak::PreferEarlier);
    assert_eq!(config.money_precision, 2);
}

#[test]
fn unknown_and_out_of_range_fields_are_rejected() {
    assert!(matches!(
        PipelineConfig::from_toml_str("similarity = 0.9"),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        PipelineConfig::from_toml_str("numeric_penalty = 1.5"),
        Err(ConfigError::OutOfUnitRange { field: "numeric_penalty", .. })
    ));
    assert!(matches!(
        PipelineConfig::from_toml_str("header_window = 0"),
        Err(ConfigError::EmptyWindow)
    ));
    assert!(matches!(
        PipelineConfig::from_toml_str("money_precision = 40"),
        Err(ConfigError::PrecisionTooLarge { field: "money_precision", .. })
    ));
    assert!(matches!(
        PipelineConfig::from_toml_str("max_rows = 0"),
        Err(ConfigError::ZeroLimit { field: "max_rows" })
    ));
}

#[test]
fn pipeline_rejects_invalid_config() {
    let config = PipelineConfig {
        similarity_threshold: -0.1,
        ..PipelineConfig::default()
    };
    let err = Pipeline::new(config, Lexicon::qs_default()).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidConfig(_)));
    assert!(err.to_string().contains("similarity_threshold"));
}

#[test]
fn custom_lexicon_drives_matching() {
    let lexicon = Lexicon::from_toml_str(
        r#"
[[columns]]
key = "item"
kind = "text"
aliases = ["Item", "Description"]

[[columns]]
key = "amount"
kind = "money"
aliases = ["Amount", "Total price"]
"#,
    )
    .unwrap();

    assert_eq!(lexicon.dictionary.entries().len(), 2);
    assert_eq!(lexicon.dictionary.entries()[1].kind, ValueKind::Money);
    // No footer list given: built-in phrases stay
    assert!(!lexicon.footer.phrases().is_empty());

    let pipeline = Pipeline::new(PipelineConfig::default(), lexicon).unwrap();
    let sheet = SheetData::new(vec![
        vec!["Description".into(), "Amount".into()],
        vec!["Excavation".into(), "1,250.5".into()],
    ]);
    let output = pipeline.run(&sheet).unwrap();

    let keys: Vec<&str> = output.document.keys().collect();
    assert_eq!(keys, vec!["amount", "item"]);
    let json = serde_json::to_value(&output.document.records[0]).unwrap();
    assert_eq!(json["values"]["amount"]["value"], "1250.50");
}

#[test]
fn invalid_lexicons_are_rejected() {
    let duplicate = r#"
[[columns]]
key = "item"
kind = "text"
aliases = ["Item"]

[[columns]]
key = "item"
kind = "text"
aliases = ["Thing"]
"#;
    assert!(matches!(
        Lexicon::from_toml_str(duplicate),
        Err(LexiconError::DuplicateKey(_))
    ));

    let bad_key = r#"
[[columns]]
key = "Thành tiền"
kind = "money"
aliases = ["Thành tiền"]
"#;
    assert!(matches!(
        Lexicon::from_toml_str(bad_key),
        Err(LexiconError::InvalidKey { .. })
    ));

    let no_aliases = r#"
[[columns]]
key = "item"
kind = "text"
aliases = []
"#;
    assert!(matches!(
        Lexicon::from_toml_str(no_aliases),
        Err(LexiconError::NoAliases(_))
    ));

    assert!(matches!(
        Lexicon::from_toml_str("columns = []"),
        Err(LexiconError::EmptyDictionary)
    ));
}
