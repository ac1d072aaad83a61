//! Reading a single tabular source into an Arrow record batch.
//!
//! Delimited text is read with a header row and an inferred schema; files
//! with a `.parquet` extension go through the Parquet Arrow reader. Either
//! way the caller receives one batch holding the whole file.

use std::fs::File;
use std::io::Seek;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use arrow::compute::concat_batches;
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::util::safe_open_file;
use crate::error::{NhanesError, Result};
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Default field delimiter for text sources
pub const DEFAULT_DELIMITER: u8 = b',';

/// Physical format of a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text with a header row
    Delimited { delimiter: u8 },
    /// Apache Parquet
    Parquet,
}

impl SourceFormat {
    /// Choose the format from the file extension
    #[must_use]
    pub fn detect(path: &Path, delimiter: u8) -> Self {
        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"))
        {
            Self::Parquet
        } else {
            Self::Delimited { delimiter }
        }
    }
}

/// Read a tabular file into a single record batch
///
/// # Errors
/// Returns a source error if the file cannot be opened or parsed
pub fn read_table(path: &Path, delimiter: u8) -> Result<RecordBatch> {
    let start = Instant::now();
    log_operation_start("Reading source", path);

    let batch = match SourceFormat::detect(path, delimiter) {
        SourceFormat::Delimited { delimiter } => read_delimited(path, delimiter)?,
        SourceFormat::Parquet => read_parquet(path)?,
    };

    log_operation_complete("read", path, batch.num_rows(), Some(start.elapsed()));
    Ok(batch)
}

fn read_delimited(path: &Path, delimiter: u8) -> Result<RecordBatch> {
    let mut file = safe_open_file(path, "reading delimited source")?;

    let format = Format::default()
        .with_header(true)
        .with_delimiter(delimiter);
    let (schema, _) = format
        .infer_schema(&mut file, None)
        .map_err(|e| NhanesError::source_error(path, format!("schema inference failed: {e}")))?;
    file.rewind()
        .map_err(|e| NhanesError::source_error(path, e.to_string()))?;

    let schema = Arc::new(schema);
    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_delimiter(delimiter)
        .build(file)
        .map_err(|e| NhanesError::source_error(path, e.to_string()))?;

    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| NhanesError::source_error(path, e.to_string()))?;

    concat_batches(&schema, &batches).map_err(|e| NhanesError::source_error(path, e.to_string()))
}

fn read_parquet(path: &Path) -> Result<RecordBatch> {
    let file: File = safe_open_file(path, "reading parquet source")?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| NhanesError::source_error(path, format!("invalid parquet file: {e}")))?;
    let schema = builder.schema().clone();
    let reader = builder
        .build()
        .map_err(|e| NhanesError::source_error(path, e.to_string()))?;

    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| NhanesError::source_error(path, e.to_string()))?;

    concat_batches(&schema, &batches).map_err(|e| NhanesError::source_error(path, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, Float64Array, Int64Array};
    use arrow::datatypes::DataType;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(
            SourceFormat::detect(Path::new("DEMO.parquet"), b','),
            SourceFormat::Parquet
        );
        assert_eq!(
            SourceFormat::detect(Path::new("DEMO.csv"), b';'),
            SourceFormat::Delimited { delimiter: b';' }
        );
    }

    #[test]
    fn test_read_csv_with_missing_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "exam.csv",
            "SEQN,BMXBMI\n73557,26.7\n73558,\n73559,31.5\n",
        );

        let batch = read_table(&path, DEFAULT_DELIMITER).unwrap();
        assert_eq!(batch.num_rows(), 3);
        assert_eq!(batch.schema().field(0).data_type(), &DataType::Int64);

        let ids = batch.column(0).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(ids.value(2), 73559);

        let bmi = batch.column(1).as_any().downcast_ref::<Float64Array>().unwrap();
        assert!(bmi.is_null(1));
        assert!((bmi.value(2) - 31.5).abs() < 1e-12);
    }

    #[test]
    fn test_read_semicolon_delimited() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "diet.txt", "SEQN;DR1TPROT\n1;55.2\n");
        let batch = read_table(&path, b';').unwrap();
        assert_eq!(batch.num_columns(), 2);
        assert_eq!(batch.num_rows(), 1);
    }

    #[test]
    fn test_missing_file_is_source_error() {
        let err = read_table(Path::new("/no/such/DEMO.csv"), DEFAULT_DELIMITER).unwrap_err();
        assert!(matches!(err, NhanesError::Source { .. }));
    }

    #[test]
    fn test_garbage_parquet_is_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "labs.parquet", "not a parquet file");
        let err = read_table(&path, DEFAULT_DELIMITER).unwrap_err();
        assert!(matches!(err, NhanesError::Source { .. }));
    }
}
