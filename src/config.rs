use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{field} must be within [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f64 },
    #[error("header_window must be at least 1")]
    EmptyWindow,
    #[error("{field} must be at most {max}, got {value}")]
    PrecisionTooLarge { field: &'static str, value: u32, max: u32 },
    #[error("{field} must be at least 1")]
    ZeroLimit { field: &'static str },
}

/// Which row wins when two header candidates share the maximum keyword
/// density.
///
/// Default `PreferLater`: the candidate closest to the data wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderTieBreak {
    #[default]
    PreferLater,
    PreferEarlier,
}

/// Every tunable input of a pipeline invocation.
///
/// Built once at startup (defaults, or a TOML file) and passed explicitly into
/// each [`crate::Pipeline`]; never read from ambient global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Minimum Jaro-Winkler similarity for a keyword or alias match.
    pub similarity_threshold: f64,
    /// Rows scanned for header candidates; rows past it are never headers.
    pub header_window: usize,
    /// A header candidate's keyword density must strictly exceed this.
    pub min_keyword_density: f64,
    /// Rows whose numeric density strictly exceeds this are never headers.
    pub numeric_penalty: f64,
    /// Rows with fewer non-blank cells are never headers. Keeps a lone
    /// preamble line such as "Hạng mục: Nhà A" from scoring a perfect density.
    pub min_header_cells: usize,
    pub money_precision: u32,
    pub quantity_precision: u32,
    pub max_rows: usize,
    pub max_columns: usize,
    pub header_tie_break: HeaderTieBreak,
}

/// Largest scale `rust_decimal` can represent.
pub const MAX_PRECISION: u32 = 28;

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.85,
            header_window: 50,
            min_keyword_density: 0.30,
            numeric_penalty: 0.70,
            min_header_cells: 2,
            money_precision: 2,
            quantity_precision: 4,
            max_rows: 1_048_576,
            max_columns: 16_384,
            header_tie_break: HeaderTieBreak::PreferLater,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("similarity_threshold", self.similarity_threshold),
            ("min_keyword_density", self.min_keyword_density),
            ("numeric_penalty", self.numeric_penalty),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfUnitRange { field, value });
            }
        }

        if self.header_window == 0 {
            return Err(ConfigError::EmptyWindow);
        }

        for (field, value) in [
            ("money_precision", self.money_precision),
            ("quantity_precision", self.quantity_precision),
        ] {
            if value > MAX_PRECISION {
                return Err(ConfigError::PrecisionTooLarge {
                    field,
                    value,
                    max: MAX_PRECISION,
                });
            }
        }

        if self.min_header_cells == 0 {
            return Err(ConfigError::ZeroLimit { field: "min_header_cells" });
        }
        if self.max_rows == 0 {
            return Err(ConfigError::ZeroLimit { field: "max_rows" });
        }
        if self.max_columns == 0 {
            return Err(ConfigError::ZeroLimit { field: "max_columns" });
        }

        Ok(())
    }
}
