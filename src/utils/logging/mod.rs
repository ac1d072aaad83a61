//! Logging utilities for stage output and progress tracking
//!
//! Consistent log messages for pipeline stages, console helpers for printed
//! tables, and spinners for the loading phase.

pub mod console;
pub mod log;
pub mod progress;

pub use self::log::{log_filter_step, log_operation_complete, log_operation_start, log_warning};
pub use console::{print_section, print_table_overview};
pub use progress::{create_spinner, finish_progress_bar};
