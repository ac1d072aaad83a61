//! Exploratory charts
//!
//! [`data`] prepares what each chart shows; [`charts`] draws it. Every chart
//! is written as SVG under a fixed file name.

pub mod charts;
pub mod data;

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::algorithm::statistics::CorrelationMatrix;
use crate::error::util::ensure_output_dir;
use crate::error::{NhanesError, Result};
use crate::models::AnalysisTable;
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// File names of the rendered charts, in drawing order
pub const CHART_FILES: [&str; 6] = [
    "overview.svg",
    "glucose_sugar.svg",
    "correlation.svg",
    "cholesterol_by_bmi.svg",
    "diabetes_by_ses.svg",
    "glucose_facets.svg",
];

fn render<F>(output_dir: &Path, file: &str, draw: F) -> Result<PathBuf>
where
    F: FnOnce(&Path) -> std::result::Result<(), Box<dyn std::error::Error>>,
{
    let path = output_dir.join(file);
    draw(&path).map_err(|e| NhanesError::render_error(file, e))?;
    log::debug!("Rendered {}", path.display());
    Ok(path)
}

/// Draw all six charts into `output_dir`, creating it if needed
pub fn render_all(
    table: &AnalysisTable,
    correlation: &CorrelationMatrix,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let start = Instant::now();
    log_operation_start("Rendering charts into", output_dir);
    ensure_output_dir(output_dir)?;

    let densities = data::bmi_density_by_sex(table);
    let protein = data::protein_cholesterol(table);
    let sugar = data::sugar_glucose_by_age_group(table);
    let boxes = data::cholesterol_by_bmi(table);
    let bars = data::diabetes_by_ses(table);
    let facets = data::glucose_facets(table);

    let paths = vec![
        render(output_dir, CHART_FILES[0], |p| {
            charts::overview(p, &densities, &protein)
        })?,
        render(output_dir, CHART_FILES[1], |p| charts::glucose_sugar(p, &sugar))?,
        render(output_dir, CHART_FILES[2], |p| {
            charts::correlation_heatmap(p, correlation)
        })?,
        render(output_dir, CHART_FILES[3], |p| {
            charts::cholesterol_boxplot(p, &boxes)
        })?,
        render(output_dir, CHART_FILES[4], |p| charts::diabetes_stacked(p, &bars))?,
        render(output_dir, CHART_FILES[5], |p| {
            charts::glucose_histograms(p, &facets)
        })?,
    ];

    log_operation_complete("rendered", output_dir, paths.len(), Some(start.elapsed()));
    Ok(paths)
}
