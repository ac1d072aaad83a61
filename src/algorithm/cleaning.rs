//! Cleaning the joined table into the analysis table
//!
//! Projection, the plausible-BMI filter and the completeness filter, with the
//! row count of every step logged. Both filters run on the Arrow batch;
//! recoding happens on the rows deserialized from what they keep.

use arrow::array::ArrayRef;
use arrow::compute::cast;
use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::filter::{BatchFilter, Expr, ExpressionFilter};
use crate::models::{AnalysisTable, RawSubject, Subject};
use crate::schema::{analysis_columns, find_column, projected_schema};
use crate::utils::logging::log_filter_step;

/// Exclusive lower bound of a plausible BMI
pub const BMI_LOWER: f64 = 10.0;

/// Exclusive upper bound of a plausible BMI
pub const BMI_UPPER: f64 = 80.0;

/// Measurements every analysed subject must have
pub const REQUIRED_COLUMNS: [&str; 3] = ["bmi", "cholesterol", "protein"];

/// Keep the ten analysis columns under their semantic names
///
/// # Errors
/// Returns a schema error naming the first survey column that is absent
pub fn project(joined: &RecordBatch) -> Result<RecordBatch> {
    let columns = analysis_columns()
        .iter()
        .map(|mapping| {
            let index = find_column(joined, mapping.source, "joined table")?;
            Ok(cast(joined.column(index), &mapping.data_type)?)
        })
        .collect::<Result<Vec<ArrayRef>>>()?;

    Ok(RecordBatch::try_new(projected_schema(), columns)?)
}

/// The plausible-BMI filter, `10 < bmi < 80`
#[must_use]
pub fn plausible_bmi_filter() -> ExpressionFilter {
    ExpressionFilter::new(
        Expr::between_exclusive("bmi", BMI_LOWER, BMI_UPPER),
        "projected table",
    )
}

/// Rows with BMI, cholesterol and protein all present
#[must_use]
pub fn required_measurements_filter() -> ExpressionFilter {
    ExpressionFilter::new(Expr::all_present(&REQUIRED_COLUMNS), "projected table")
}

/// Project, filter and recode the joined table
pub fn clean(joined: &RecordBatch) -> Result<AnalysisTable> {
    let projected = project(joined)?;
    let plausible = plausible_bmi_filter().filter(&projected)?;
    log_filter_step("Plausible BMI", projected.num_rows(), plausible.num_rows());

    let complete = required_measurements_filter().filter(&plausible)?;
    log_filter_step(
        "Complete BMI, cholesterol and protein",
        plausible.num_rows(),
        complete.num_rows(),
    );

    let raw: Vec<RawSubject> = serde_arrow::from_record_batch(&complete)?;
    // Rows left after both filters always carry the required fields
    let subjects: Vec<Subject> = raw
        .into_iter()
        .filter_map(RawSubject::into_subject)
        .collect();

    Ok(AnalysisTable::new(subjects))
}
