//! Model specifications and design matrices

use std::fmt;

use ndarray::{Array1, Array2};
use smallvec::{SmallVec, smallvec};

use crate::models::{AgeGroup, AnalysisTable, Category, Sex, Subject, Variable};

/// A column of the design matrix
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Intercept,
    /// A continuous variable entered as is
    Continuous(Variable),
    /// Treatment dummy: 1 at `level`, 0 at any other observed level
    Indicator {
        variable: Variable,
        level: &'static str,
    },
    /// Product of two terms
    Interaction(Box<Term>, Box<Term>),
}

impl Term {
    /// Value of the term for a subject; `None` when an input is missing
    #[must_use]
    pub fn value(&self, subject: &Subject) -> Option<f64> {
        match self {
            Self::Intercept => Some(1.0),
            Self::Continuous(variable) => subject.numeric(*variable),
            Self::Indicator { variable, level } => subject
                .category(*variable)
                .map(|observed| if observed == *level { 1.0 } else { 0.0 }),
            Self::Interaction(a, b) => Some(a.value(subject)? * b.value(subject)?),
        }
    }

    #[must_use]
    pub fn interaction(a: Self, b: Self) -> Self {
        Self::Interaction(Box::new(a), Box::new(b))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Intercept => f.write_str("Intercept"),
            Self::Continuous(variable) => write!(f, "{variable}"),
            Self::Indicator { variable, level } => write!(f, "{variable}[T.{level}]"),
            Self::Interaction(a, b) => write!(f, "{a}:{b}"),
        }
    }
}

/// A linear model: response, formula text and design terms
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    pub name: &'static str,
    pub formula: &'static str,
    pub response: Variable,
    pub terms: SmallVec<[Term; 6]>,
}

/// Cholesterol on protein intake, age, sex (reference Female) and BMI
#[must_use]
pub fn cholesterol_model() -> ModelSpec {
    ModelSpec {
        name: "cholesterol",
        formula: "cholesterol ~ protein + age + sex + bmi",
        response: Variable::Cholesterol,
        terms: smallvec![
            Term::Intercept,
            Term::Continuous(Variable::Protein),
            Term::Continuous(Variable::Age),
            Term::Indicator {
                variable: Variable::Sex,
                level: Sex::Male.label(),
            },
            Term::Continuous(Variable::Bmi),
        ],
    }
}

/// Glucose on sugar intake, age group (reference Adult) and their interaction
#[must_use]
pub fn glucose_model() -> ModelSpec {
    let pediatric = Term::Indicator {
        variable: Variable::AgeGroup,
        level: AgeGroup::Pediatric.label(),
    };
    ModelSpec {
        name: "glucose",
        formula: "glucose ~ sugar * age_group",
        response: Variable::Glucose,
        terms: smallvec![
            Term::Intercept,
            Term::Continuous(Variable::Sugar),
            pediatric.clone(),
            Term::interaction(Term::Continuous(Variable::Sugar), pediatric),
        ],
    }
}

/// Response vector and design matrix over the rows complete for one model
#[derive(Debug, Clone, PartialEq)]
pub struct Design {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
}

impl ModelSpec {
    #[must_use]
    pub fn term_names(&self) -> Vec<String> {
        self.terms.iter().map(ToString::to_string).collect()
    }

    /// Build the design from rows with no missing model input
    #[must_use]
    pub fn design(&self, table: &AnalysisTable) -> Design {
        let mut response = Vec::new();
        let mut cells = Vec::new();

        for subject in table {
            let Some(y) = subject.numeric(self.response) else {
                continue;
            };
            let Some(row) = self
                .terms
                .iter()
                .map(|t| t.value(subject))
                .collect::<Option<SmallVec<[f64; 6]>>>()
            else {
                continue;
            };
            response.push(y);
            cells.extend(row);
        }

        let n = response.len();
        let k = self.terms.len();
        Design {
            x: Array2::from_shape_vec((n, k), cells).unwrap_or_else(|_| Array2::zeros((0, k))),
            y: Array1::from(response),
        }
    }
}
