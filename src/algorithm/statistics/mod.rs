//! Descriptive statistics, correlation and the stratified summary

pub mod correlation;
pub mod descriptive;
pub mod summary;

pub use correlation::{CORRELATION_VARIABLES, CorrelationMatrix, correlation_matrix};
pub use descriptive::{BoxStats, mean, pearson, quantile_sorted, sample_sd};
pub use summary::{LevelCount, StratumSummary, SummaryTable, VariableSummary, summarize};
