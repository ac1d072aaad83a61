//! Exploratory analysis of NHANES survey extracts.
//!
//! Five survey tables are joined on the respondent sequence number, cleaned
//! and recoded into an [`AnalysisTable`], and then summarized by stratum,
//! modelled with least squares and drawn as a fixed set of SVG charts.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod reader;
pub mod schema;
pub mod utils;
pub mod viz;

// Core types
pub use config::{PipelineConfig, SourceConfig};
pub use error::{NhanesError, Result};
pub use models::{AnalysisTable, Subject, Variable};
pub use pipeline::{PipelineReport, run};

// Arrow types
pub use arrow::record_batch::RecordBatch;

// Stages
pub use algorithm::cleaning::clean;
pub use algorithm::regression::{ModelFit, fit};
pub use algorithm::statistics::{CorrelationMatrix, SummaryTable, correlation_matrix, summarize};
pub use loader::{join_sources, left_join, load_and_join, load_sources};
pub use reader::read_table;
pub use viz::render_all;
