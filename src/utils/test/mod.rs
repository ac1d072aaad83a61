//! Test utilities
//!
//! Synthetic sources and small builders shared by unit and integration tests.

pub mod helpers;

pub use fixtures::{
    SOURCE_LAYOUT, fixture_seqn, fixture_value, joined_batch, source_batch, source_csv,
    write_csv_sources,
};
pub use helpers::{raw_subject, table_of, test_config};
