//! The analysis pipeline
//!
//! Load and join, clean, then summarize, fit and draw from the same cleaned
//! table. Each stage takes the previous stage's value and nothing else.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;

use crate::algorithm::cleaning::clean;
use crate::algorithm::regression::{ModelFit, cholesterol_model, fit, glucose_model};
use crate::algorithm::statistics::{
    CORRELATION_VARIABLES, CorrelationMatrix, SummaryTable, correlation_matrix, summarize,
};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::error::util::ensure_output_dir;
use crate::loader::load_and_join;
use crate::models::AnalysisTable;
use crate::schema::IDENTIFIER_COLUMN;
use crate::viz::render_all;

/// Everything a run produces
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub joined_rows: usize,
    pub joined_columns: usize,
    pub analysis_rows: usize,
    pub summary: SummaryTable,
    pub models: Vec<ModelFit>,
    pub correlation: CorrelationMatrix,
    pub charts: Vec<PathBuf>,
    #[serde(skip)]
    pub table: AnalysisTable,
}

/// Fit both regression models on the cleaned table
pub fn fit_models(table: &AnalysisTable) -> Result<Vec<ModelFit>> {
    [cholesterol_model(), glucose_model()]
        .iter()
        .map(|spec| fit(spec, table))
        .collect()
}

/// Run every stage once, in order
pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    let start = Instant::now();

    let joined = load_and_join(&config.sources, IDENTIFIER_COLUMN)?;
    let table = clean(&joined)?;
    log::info!("Analysis table: {} subjects", table.len());

    let summary = summarize(
        &table,
        &config.continuous_variables,
        &config.categorical_variables,
        &config.stratify_by,
    )?;
    let models = fit_models(&table)?;
    let correlation = correlation_matrix(&table, &CORRELATION_VARIABLES);

    let charts = if config.render_charts {
        render_all(&table, &correlation, &config.output_dir)?
    } else {
        log::info!("Chart rendering disabled");
        Vec::new()
    };

    let report = PipelineReport {
        joined_rows: joined.num_rows(),
        joined_columns: joined.num_columns(),
        analysis_rows: table.len(),
        summary,
        models,
        correlation,
        charts,
        table,
    };

    if let Some(path) = &config.report_path {
        write_report(&report, path)?;
    }

    log::info!("Pipeline finished in {:?}", start.elapsed());
    Ok(report)
}

/// Write the report as pretty-printed JSON
pub fn write_report(report: &PipelineReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_output_dir(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(report)?)?;
    log::info!("Wrote JSON report to {}", path.display());
    Ok(())
}
