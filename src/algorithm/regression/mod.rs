//! Linear regression models of the analysis

pub mod design;
pub mod ols;

pub use design::{Design, ModelSpec, Term, cholesterol_model, glucose_model};
pub use ols::{Coefficient, ModelFit, fit, simple_line};
