//! Subject records
//!
//! [`RawSubject`] mirrors one row of the projected Arrow table and is filled
//! by `serde_arrow`. [`Subject`] is the recoded analysis record; its required
//! measurements are plain `f64`, so a `Subject` cannot exist without them.

use serde::{Deserialize, Serialize};

use crate::algorithm::recode;
use crate::models::types::{
    AgeGroup, BmiCategory, Category, DiabetesStatus, Sex, SocioeconomicCategory, Variable,
};

/// One projected row, before recoding
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawSubject {
    pub id: i64,
    pub age: Option<f64>,
    pub sex_code: Option<f64>,
    pub income_ratio: Option<f64>,
    pub bmi: Option<f64>,
    pub cholesterol: Option<f64>,
    pub glucose: Option<f64>,
    pub protein: Option<f64>,
    pub sugar: Option<f64>,
    pub diabetes_code: Option<f64>,
}

/// Categories derived from a raw row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Derived {
    pub sex: Option<Sex>,
    pub diabetes: Option<DiabetesStatus>,
    pub age_group: Option<AgeGroup>,
    pub bmi_category: Option<BmiCategory>,
    pub ses_category: Option<SocioeconomicCategory>,
}

impl RawSubject {
    /// Derive every categorical field
    #[must_use]
    pub fn derive(&self) -> Derived {
        Derived {
            sex: self.sex_code.and_then(Sex::from_code),
            diabetes: self.diabetes_code.and_then(DiabetesStatus::from_code),
            age_group: recode::age_group(self.age),
            bmi_category: recode::bmi_category(self.bmi),
            ses_category: recode::ses_category(self.income_ratio),
        }
    }

    /// Recode the row, then keep it only if BMI, cholesterol and protein are present
    #[must_use]
    pub fn into_subject(self) -> Option<Subject> {
        let derived = self.derive();

        Some(Subject {
            id: self.id,
            age: self.age,
            sex: derived.sex,
            income_ratio: self.income_ratio,
            bmi: self.bmi?,
            cholesterol: self.cholesterol?,
            glucose: self.glucose,
            protein: self.protein?,
            sugar: self.sugar,
            diabetes: derived.diabetes,
            age_group: derived.age_group,
            bmi_category: derived.bmi_category,
            ses_category: derived.ses_category,
        })
    }
}

/// A cleaned analysis record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subject {
    pub id: i64,
    pub age: Option<f64>,
    pub sex: Option<Sex>,
    pub income_ratio: Option<f64>,
    pub bmi: f64,
    pub cholesterol: f64,
    pub glucose: Option<f64>,
    pub protein: f64,
    pub sugar: Option<f64>,
    pub diabetes: Option<DiabetesStatus>,
    pub age_group: Option<AgeGroup>,
    pub bmi_category: Option<BmiCategory>,
    pub ses_category: Option<SocioeconomicCategory>,
}

impl Subject {
    /// Value of a continuous variable; `None` when missing or not continuous
    #[must_use]
    pub fn numeric(&self, variable: Variable) -> Option<f64> {
        match variable {
            Variable::Age => self.age,
            Variable::IncomeRatio => self.income_ratio,
            Variable::Bmi => Some(self.bmi),
            Variable::Cholesterol => Some(self.cholesterol),
            Variable::Glucose => self.glucose,
            Variable::Protein => Some(self.protein),
            Variable::Sugar => self.sugar,
            _ => None,
        }
    }

    /// Label of a categorical variable; `None` when missing or not categorical
    #[must_use]
    pub fn category(&self, variable: Variable) -> Option<&'static str> {
        match variable {
            Variable::Sex => self.sex.map(Category::label),
            Variable::Diabetes => self.diabetes.map(Category::label),
            Variable::AgeGroup => self.age_group.map(Category::label),
            Variable::BmiCategory => self.bmi_category.map(Category::label),
            Variable::SesCategory => self.ses_category.map(Category::label),
            _ => None,
        }
    }
}
