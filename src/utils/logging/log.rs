//! Logging utilities
//!
//! Standardized messages for reading sources and running pipeline stages.

use std::path::Path;
use std::time::Duration;

/// Log the start of an operation on a file
///
/// # Arguments
/// * `operation` - Description of the operation
/// * `path` - File being operated on
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{} {}", operation, path.display());
}

/// Log the completion of an operation on a file
///
/// # Arguments
/// * `operation` - Past-tense description of the operation
/// * `path` - File that was operated on
/// * `rows` - Number of rows produced
/// * `elapsed` - Optional elapsed time
pub fn log_operation_complete(
    operation: &str,
    path: &Path,
    rows: usize,
    elapsed: Option<Duration>,
) {
    if let Some(duration) = elapsed {
        log::info!(
            "Successfully {} {} rows from {} in {:?}",
            operation,
            rows,
            path.display(),
            duration
        );
    } else {
        log::info!(
            "Successfully {} {} rows from {}",
            operation,
            rows,
            path.display()
        );
    }
}

/// Log how many rows a filtering step kept
///
/// # Arguments
/// * `step` - Name of the filter
/// * `rows_in` - Rows before the filter
/// * `rows_out` - Rows after the filter
pub fn log_filter_step(step: &str, rows_in: usize, rows_out: usize) {
    let dropped = rows_in.saturating_sub(rows_out);
    log::info!("{step}: kept {rows_out} of {rows_in} rows ({dropped} dropped)");
}

/// Log a warning, optionally tied to a file
pub fn log_warning(message: &str, path: Option<&Path>) {
    if let Some(path) = path {
        log::warn!("{}: {}", message, path.display());
    } else {
        log::warn!("{message}");
    }
}
