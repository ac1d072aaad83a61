//! Domain models for the analysis table
//!
//! Categorical types, subject records and the cleaned table that every
//! downstream stage reads.

pub mod subject;
pub mod table;
pub mod types;

pub use subject::{RawSubject, Subject};
pub use table::AnalysisTable;
pub use types::{
    AgeGroup, BmiCategory, Category, DiabetesStatus, Sex, SocioeconomicCategory, Variable,
    VariableKind,
};
