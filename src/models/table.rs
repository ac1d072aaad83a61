//! The cleaned analysis table

use arrow::datatypes::FieldRef;
use arrow::record_batch::RecordBatch;
use serde::Serialize;
use serde_arrow::schema::{SchemaLike, TracingOptions};

use crate::error::Result;
use crate::models::subject::Subject;
use crate::models::types::Variable;

/// Flat view of a subject with categories as labels
#[derive(Serialize)]
struct SubjectRow {
    id: i64,
    age: Option<f64>,
    sex: Option<&'static str>,
    income_ratio: Option<f64>,
    bmi: f64,
    cholesterol: f64,
    glucose: Option<f64>,
    protein: f64,
    sugar: Option<f64>,
    diabetes: Option<&'static str>,
    age_group: Option<&'static str>,
    bmi_category: Option<&'static str>,
    ses_category: Option<&'static str>,
}

impl From<&Subject> for SubjectRow {
    fn from(s: &Subject) -> Self {
        Self {
            id: s.id,
            age: s.age,
            sex: s.category(Variable::Sex),
            income_ratio: s.income_ratio,
            bmi: s.bmi,
            cholesterol: s.cholesterol,
            glucose: s.glucose,
            protein: s.protein,
            sugar: s.sugar,
            diabetes: s.category(Variable::Diabetes),
            age_group: s.category(Variable::AgeGroup),
            bmi_category: s.category(Variable::BmiCategory),
            ses_category: s.category(Variable::SesCategory),
        }
    }
}

/// Immutable collection of cleaned subjects, in join order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisTable {
    subjects: Vec<Subject>,
}

impl AnalysisTable {
    #[must_use]
    pub fn new(subjects: Vec<Subject>) -> Self {
        Self { subjects }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subject> {
        self.subjects.iter()
    }

    /// Values of a continuous variable, one per subject
    #[must_use]
    pub fn numeric_column(&self, variable: Variable) -> Vec<Option<f64>> {
        self.subjects.iter().map(|s| s.numeric(variable)).collect()
    }

    /// Convert the table back into an Arrow record batch
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let rows: Vec<SubjectRow> = self.subjects.iter().map(SubjectRow::from).collect();
        let fields = Vec::<FieldRef>::from_samples(
            &rows,
            TracingOptions::default().allow_null_fields(true),
        )?;
        Ok(serde_arrow::to_record_batch(&fields, &rows)?)
    }

    /// Rows with a value for every listed continuous variable, as value vectors
    #[must_use]
    pub fn complete_rows(&self, variables: &[Variable]) -> Vec<Vec<f64>> {
        self.subjects
            .iter()
            .filter_map(|s| {
                variables
                    .iter()
                    .map(|v| s.numeric(*v))
                    .collect::<Option<Vec<f64>>>()
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a AnalysisTable {
    type Item = &'a Subject;
    type IntoIter = std::slice::Iter<'a, Subject>;

    fn into_iter(self) -> Self::IntoIter {
        self.subjects.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test::{raw_subject, table_of};
    use arrow::array::{Array, AsArray};
    use arrow::compute::cast;
    use arrow::datatypes::DataType;

    #[test]
    fn test_complete_rows_skips_missing_values() {
        let mut rows: Vec<_> = (0..3).map(raw_subject).collect();
        rows[1].sugar = None;
        let table = table_of(rows);

        let complete = table.complete_rows(&[Variable::Sugar, Variable::Bmi]);
        assert_eq!(complete, vec![vec![100.0, 24.0], vec![100.0, 24.0]]);
    }

    #[test]
    fn test_record_batch_carries_labels() {
        let mut rows: Vec<_> = (0..2).map(raw_subject).collect();
        rows[1].sex_code = Some(2.0);
        rows[1].diabetes_code = Some(3.0);
        let batch = table_of(rows).to_record_batch().unwrap();

        assert_eq!(batch.num_rows(), 2);
        let sex = cast(batch.column_by_name("sex").unwrap(), &DataType::Utf8).unwrap();
        let sex = sex.as_string::<i32>();
        assert_eq!(sex.value(0), "Male");
        assert_eq!(sex.value(1), "Female");
        assert!(batch.column_by_name("diabetes").unwrap().is_null(1));
    }
}
