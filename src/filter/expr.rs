//! Expression-based filtering
//!
//! A small expression language over numeric columns, evaluated with Arrow's
//! vectorized comparison and boolean kernels. Comparisons against a null
//! value yield null, which the filter treats as "drop the row".

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Scalar};
use arrow::compute::kernels::cmp;
use arrow::compute::{and, cast, is_not_null};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

use crate::error::{NhanesError, Result};
use crate::filter::core::{BatchFilter, filter_record_batch};

/// Represents a filter expression over the columns of a batch
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column is greater than a literal value
    Gt(String, f64),

    /// Column is less than a literal value
    Lt(String, f64),

    /// Column is not null
    IsNotNull(String),

    /// Logical AND of expressions
    And(Vec<Expr>),
}

impl Expr {
    /// `lower < column < upper`
    #[must_use]
    pub fn between_exclusive(column: &str, lower: f64, upper: f64) -> Self {
        Self::And(vec![
            Self::Gt(column.to_string(), lower),
            Self::Lt(column.to_string(), upper),
        ])
    }

    /// Every listed column is non-null
    #[must_use]
    pub fn all_present(columns: &[&str]) -> Self {
        Self::And(
            columns
                .iter()
                .map(|c| Self::IsNotNull((*c).to_string()))
                .collect(),
        )
    }
}

/// A filter that evaluates an expression against a record batch
#[derive(Debug, Clone)]
pub struct ExpressionFilter {
    expr: Expr,
    context: String,
}

impl ExpressionFilter {
    /// Create a new expression filter; `context` names the table in errors
    #[must_use]
    pub fn new(expr: Expr, context: impl Into<String>) -> Self {
        Self {
            expr,
            context: context.into(),
        }
    }

    /// Evaluate the expression into a row mask
    pub fn evaluate(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        self.evaluate_expr(batch, &self.expr)
    }

    fn evaluate_expr(&self, batch: &RecordBatch, expr: &Expr) -> Result<BooleanArray> {
        match expr {
            Expr::And(exprs) => self.evaluate_and_expression(batch, exprs),
            Expr::Gt(col, value) => self.compare(batch, col, *value, cmp::gt),
            Expr::Lt(col, value) => self.compare(batch, col, *value, cmp::lt),
            Expr::IsNotNull(col) => Ok(is_not_null(self.column(batch, col)?.as_ref())?),
        }
    }

    fn evaluate_and_expression(
        &self,
        batch: &RecordBatch,
        exprs: &[Expr],
    ) -> Result<BooleanArray> {
        let mut result = BooleanArray::from(vec![true; batch.num_rows()]);
        for expr in exprs {
            let mask = self.evaluate_expr(batch, expr)?;
            result = and(&result, &mask)?;
        }
        Ok(result)
    }

    fn column<'a>(&self, batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
        batch
            .column_by_name(name)
            .ok_or_else(|| NhanesError::schema_error(name, self.context.clone()))
    }

    /// Compare a numeric column against a literal, after widening it to `Float64`
    fn compare(
        &self,
        batch: &RecordBatch,
        col: &str,
        value: f64,
        kernel: fn(
            &dyn arrow::array::Datum,
            &dyn arrow::array::Datum,
        ) -> std::result::Result<BooleanArray, arrow::error::ArrowError>,
    ) -> Result<BooleanArray> {
        let column = self.column(batch, col)?;
        let values = cast(column, &DataType::Float64)?;
        let literal = Scalar::new(Float64Array::from(vec![value]));
        Ok(kernel(&values, &literal)?)
    }
}

impl BatchFilter for ExpressionFilter {
    fn filter(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let mask = self.evaluate(batch)?;
        filter_record_batch(batch, &mask)
    }
}
