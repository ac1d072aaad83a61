//! Pairwise Pearson correlation over complete rows

use serde::Serialize;

use crate::algorithm::statistics::descriptive::pearson;
use crate::models::{AnalysisTable, Variable};

/// Variables of the correlation heatmap
pub const CORRELATION_VARIABLES: [Variable; 6] = [
    Variable::Age,
    Variable::Bmi,
    Variable::Cholesterol,
    Variable::Glucose,
    Variable::Protein,
    Variable::Sugar,
];

/// Symmetric correlation matrix with a unit diagonal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub variables: Vec<Variable>,
    /// Rows with no missing value among `variables`
    pub n: usize,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Correlation of two variables, if both are in the matrix
    #[must_use]
    pub fn get(&self, a: Variable, b: Variable) -> Option<f64> {
        let i = self.variables.iter().position(|v| *v == a)?;
        let j = self.variables.iter().position(|v| *v == b)?;
        Some(self.values[i][j])
    }
}

/// Correlate the given continuous variables over rows where all are present
#[must_use]
pub fn correlation_matrix(table: &AnalysisTable, variables: &[Variable]) -> CorrelationMatrix {
    let rows = table.complete_rows(variables);
    let columns: Vec<Vec<f64>> = (0..variables.len())
        .map(|j| rows.iter().map(|row| row[j]).collect())
        .collect();

    let k = variables.len();
    let mut values = vec![vec![f64::NAN; k]; k];
    for i in 0..k {
        for j in i..k {
            let r = if i == j && rows.len() >= 2 {
                1.0
            } else {
                pearson(&columns[i], &columns[j]).unwrap_or(f64::NAN)
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    log::info!("Correlation matrix over {} complete rows", rows.len());
    CorrelationMatrix {
        variables: variables.to_vec(),
        n: rows.len(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test::{raw_subject, table_of};

    #[test]
    fn test_matrix_is_symmetric_with_unit_diagonal() {
        let rows = (0..10_i32)
            .map(|i| {
                let mut row = raw_subject(i64::from(i));
                row.age = Some(f64::from(20 + i));
                row.bmi = Some(f64::from(20 + (i * 3) % 7));
                row.cholesterol = Some(f64::from(150 + 2 * i));
                row.glucose = Some(f64::from(90 + (i * 5) % 11));
                row.protein = Some(f64::from(50 + (i * 7) % 13));
                row.sugar = Some(f64::from(60 - i));
                row
            })
            .collect();
        let matrix = correlation_matrix(&table_of(rows), &CORRELATION_VARIABLES);

        assert_eq!(matrix.n, 10);
        for i in 0..6 {
            assert!((matrix.values[i][i] - 1.0).abs() < 1e-12);
            for j in 0..6 {
                assert!((matrix.values[i][j] - matrix.values[j][i]).abs() < 1e-12);
            }
        }
        let age_chol = matrix.get(Variable::Age, Variable::Cholesterol).unwrap();
        assert!((age_chol - 1.0).abs() < 1e-12);
        let age_sugar = matrix.get(Variable::Age, Variable::Sugar).unwrap();
        assert!((age_sugar + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_incomplete_rows_are_excluded() {
        let mut rows: Vec<_> = (0..5).map(raw_subject).collect();
        rows[0].glucose = None;
        rows[1].sugar = None;
        let matrix = correlation_matrix(&table_of(rows), &CORRELATION_VARIABLES);
        assert_eq!(matrix.n, 3);
    }
}
