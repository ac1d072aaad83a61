//! Row filtering for Arrow record batches
//!
//! Filters are expressed as [`Expr`] trees over column names and applied to
//! a batch through the [`BatchFilter`] trait. The cleaner uses them for the
//! BMI plausibility range and the required-measurement check.

pub mod core;
pub mod expr;

pub use self::core::{BatchFilter, filter_record_batch};
pub use self::expr::{Expr, ExpressionFilter};
