//! Configuration for the analysis pipeline.
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration file.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::util::safe_read_to_string;
use crate::error::{NhanesError, Result};
use crate::reader::DEFAULT_DELIMITER;

/// Environment variable naming a JSON configuration file
pub const CONFIG_ENV_VAR: &str = "NHANES_CONFIG";

/// One input table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceConfig {
    /// Short name, used as the suffix for colliding columns
    pub name: String,
    /// Path of the CSV or Parquet file
    pub path: PathBuf,
    /// Field delimiter for text files
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_delimiter() -> char {
    char::from(DEFAULT_DELIMITER)
}

impl SourceConfig {
    #[must_use]
    pub fn new(name: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            path: path.into(),
            delimiter: default_delimiter(),
        }
    }

    /// Delimiter as a byte; non-ASCII delimiters are rejected
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                NhanesError::config_error(format!(
                    "delimiter {:?} of source '{}' is not a single ASCII character",
                    self.delimiter, self.name
                ))
            })
    }
}

/// Configuration for a pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Input tables; the first one is the primary (demographic) table
    pub sources: Vec<SourceConfig>,
    /// Directory the charts are written to
    pub output_dir: PathBuf,
    /// Continuous variables summarized as mean and standard deviation
    pub continuous_variables: Vec<String>,
    /// Categorical variables summarized as counts and percentages
    pub categorical_variables: Vec<String>,
    /// Categorical variables whose level cross-product defines the strata
    pub stratify_by: Vec<String>,
    /// Optional path of a JSON report
    pub report_path: Option<PathBuf>,
    /// Whether to draw the charts
    pub render_charts: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let data = Path::new("data");
        Self {
            sources: vec![
                SourceConfig::new("demographic", data.join("demographic.csv")),
                SourceConfig::new("examination", data.join("examination.csv")),
                SourceConfig::new("labs", data.join("labs.csv")),
                SourceConfig::new("diet", data.join("diet.csv")),
                SourceConfig::new("questionnaire", data.join("questionnaire.csv")),
            ],
            output_dir: PathBuf::from("output"),
            continuous_variables: [
                "age",
                "income_ratio",
                "bmi",
                "cholesterol",
                "glucose",
                "protein",
                "sugar",
            ]
            .map(String::from)
            .to_vec(),
            categorical_variables: ["bmi_category", "ses_category", "diabetes"]
                .map(String::from)
                .to_vec(),
            stratify_by: ["age_group", "sex"].map(String::from).to_vec(),
            report_path: None,
            render_charts: true,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file; absent fields keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = safe_read_to_string(path, "reading configuration")?;
        serde_json::from_str(&content).map_err(|e| {
            NhanesError::config_error(format!("invalid configuration {}: {e}", path.display()))
        })
    }

    /// Configuration named by [`CONFIG_ENV_VAR`], or the defaults when it is unset
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_json_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }
}

impl fmt::Display for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sources:")?;
        for source in &self.sources {
            writeln!(
                f,
                "  {:<14} {} (delimiter {:?})",
                source.name,
                source.path.display(),
                source.delimiter
            )?;
        }
        writeln!(f, "Output directory: {}", self.output_dir.display())?;
        writeln!(f, "Continuous: {}", self.continuous_variables.join(", "))?;
        writeln!(f, "Categorical: {}", self.categorical_variables.join(", "))?;
        writeln!(f, "Stratified by: {}", self.stratify_by.join(" x "))?;
        match &self.report_path {
            Some(path) => writeln!(f, "JSON report: {}", path.display())?,
            None => writeln!(f, "JSON report: disabled")?,
        }
        let charts = if self.render_charts {
            "enabled"
        } else {
            "disabled"
        };
        write!(f, "Charts: {charts}")
    }
}
