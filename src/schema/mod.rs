//! NHANES column catalogue
//!
//! Names of the survey variables the analysis reads, the semantic names they
//! are renamed to, and the Arrow schema of the projected table.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use arrow_schema::{DataType, Field, Schema, SchemaRef};

use crate::error::{NhanesError, Result};

/// Respondent sequence number shared by every NHANES file
pub const IDENTIFIER_COLUMN: &str = "SEQN";

/// Field metadata key holding the NHANES variable name
pub const SOURCE_METADATA_KEY: &str = "nhanes_variable";

/// Field metadata key holding the codebook description
pub const DESCRIPTION_METADATA_KEY: &str = "description";

/// A survey variable retained by the cleaner
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMapping {
    /// Variable name in the NHANES file
    pub source: &'static str,
    /// Name in the projected table
    pub target: &'static str,
    /// Description from the NHANES codebook
    pub description: &'static str,
    /// Type the column is cast to
    pub data_type: DataType,
}

impl ColumnMapping {
    fn new(
        source: &'static str,
        target: &'static str,
        description: &'static str,
        data_type: DataType,
    ) -> Self {
        Self {
            source,
            target,
            description,
            data_type,
        }
    }

    /// Arrow field of the projected column, carrying the survey name and
    /// codebook description as metadata
    #[must_use]
    pub fn field(&self) -> Field {
        Field::new(self.target, self.data_type.clone(), true).with_metadata(HashMap::from([
            (SOURCE_METADATA_KEY.to_string(), self.source.to_string()),
            (DESCRIPTION_METADATA_KEY.to_string(), self.description.to_string()),
        ]))
    }
}

/// The ten variables kept by the cleaner, in projection order
#[must_use]
pub fn analysis_columns() -> Vec<ColumnMapping> {
    vec![
        ColumnMapping::new(IDENTIFIER_COLUMN, "id", "Respondent sequence number", DataType::Int64),
        ColumnMapping::new("RIDAGEYR", "age", "Age in years at screening", DataType::Float64),
        ColumnMapping::new("RIAGENDR", "sex_code", "Gender", DataType::Float64),
        ColumnMapping::new(
            "INDFMPIR",
            "income_ratio",
            "Ratio of family income to poverty",
            DataType::Float64,
        ),
        ColumnMapping::new("BMXBMI", "bmi", "Body Mass Index (kg/m**2)", DataType::Float64),
        ColumnMapping::new("LBXTC", "cholesterol", "Total Cholesterol (mg/dL)", DataType::Float64),
        ColumnMapping::new("LBXGLU", "glucose", "Fasting Glucose (mg/dL)", DataType::Float64),
        ColumnMapping::new("DR1TPROT", "protein", "Protein (gm)", DataType::Float64),
        ColumnMapping::new("DR1TSUGR", "sugar", "Total sugars (gm)", DataType::Float64),
        ColumnMapping::new(
            "DIQ010",
            "diabetes_code",
            "Doctor told you have diabetes",
            DataType::Float64,
        ),
    ]
}

/// Schema of the projected, renamed table
#[must_use]
pub fn projected_schema() -> SchemaRef {
    let fields: Vec<Field> = analysis_columns().iter().map(ColumnMapping::field).collect();
    Arc::new(Schema::new(fields))
}

/// Index of a column in a batch, or a schema error naming where it was expected
pub fn find_column(batch: &RecordBatch, name: &str, context: &str) -> Result<usize> {
    batch
        .schema()
        .index_of(name)
        .map_err(|_| NhanesError::schema_error(name, context))
}
