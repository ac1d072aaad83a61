//! Test helper functions

use std::path::Path;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::{AnalysisTable, RawSubject, Subject};
use crate::utils::test::fixtures::write_csv_sources;

/// A fully populated adult male row, ready for tweaking
#[must_use]
pub fn raw_subject(id: i64) -> RawSubject {
    RawSubject {
        id,
        age: Some(45.0),
        sex_code: Some(1.0),
        income_ratio: Some(2.0),
        bmi: Some(24.0),
        cholesterol: Some(190.0),
        glucose: Some(95.0),
        protein: Some(80.0),
        sugar: Some(100.0),
        diabetes_code: Some(2.0),
    }
}

/// Recode raw rows into a table, dropping incomplete ones
#[must_use]
pub fn table_of(rows: Vec<RawSubject>) -> AnalysisTable {
    AnalysisTable::new(
        rows.into_iter()
            .filter_map(RawSubject::into_subject)
            .collect::<Vec<Subject>>(),
    )
}

/// Configuration reading CSV fixtures written to `data_dir` and
/// drawing into `output_dir`
pub fn test_config(data_dir: &Path, output_dir: &Path, n: usize) -> Result<PipelineConfig> {
    Ok(PipelineConfig {
        sources: write_csv_sources(data_dir, n)?,
        output_dir: output_dir.to_path_buf(),
        ..PipelineConfig::default()
    })
}
