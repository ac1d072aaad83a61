//! Analysis algorithms
//!
//! Cleaning and recoding of the joined table, descriptive statistics,
//! the stratified summary and least-squares regression.

pub mod cleaning;
pub mod recode;
pub mod regression;
pub mod statistics;
