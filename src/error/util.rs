//! Utility functions for error handling
//!
//! Wrappers around filesystem access that attach the path to the error.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{NhanesError, Result};

/// Open an input source, reporting failures as source errors
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.exists() {
        return Err(NhanesError::source_error(
            path,
            format!("file not found (needed for {purpose})"),
        ));
    }

    if !path.is_file() {
        return Err(NhanesError::source_error(
            path,
            format!("path is not a file (expected a file for {purpose})"),
        ));
    }

    fs::File::open(path).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::PermissionDenied => "permission denied".to_string(),
            _ => format!("failed to open file for {purpose}: {e}"),
        };
        NhanesError::source_error(path, context)
    })
}

/// Make sure an output directory exists, creating it if needed
pub fn ensure_output_dir(path: &Path) -> Result<()> {
    if path.exists() && !path.is_dir() {
        return Err(NhanesError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!(
                "Output path exists and is not a directory: {}",
                path.display()
            ),
        )));
    }
    fs::create_dir_all(path)?;
    Ok(())
}

/// Safely read a file to string, reporting failures as source errors
pub fn safe_read_to_string(path: &Path, purpose: &str) -> Result<String> {
    let mut file = safe_open_file(path, purpose)?;

    let mut content = String::new();
    io::Read::read_to_string(&mut file, &mut content).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::InvalidData => "file is not valid UTF-8".to_string(),
            _ => format!("failed to read file content for {purpose}: {e}"),
        };
        NhanesError::source_error(path, context)
    })?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_source_error() {
        let err = safe_open_file(Path::new("/definitely/not/here.csv"), "test").unwrap_err();
        assert!(matches!(err, NhanesError::Source { .. }));
    }

    #[test]
    fn test_ensure_output_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_output_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // idempotent
        ensure_output_dir(&nested).unwrap();
    }
}
