//! Shared utilities: logging, progress and console output, and test fixtures

pub mod logging;
pub mod test;
