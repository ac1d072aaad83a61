//! Core filtering functionality
//!
//! Applies boolean masks to record batches and defines the filter trait.

use arrow::array::{ArrayRef, BooleanArray};
use arrow::compute::filter as arrow_filter;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;

use crate::error::Result;

/// Filter a record batch based on a boolean mask
///
/// Rows where the mask is false or null are removed.
///
/// # Arguments
/// * `batch` - The record batch to filter
/// * `mask` - The boolean mask indicating which rows to keep
pub fn filter_record_batch(batch: &RecordBatch, mask: &BooleanArray) -> Result<RecordBatch> {
    if batch.num_rows() != mask.len() {
        return Err(ArrowError::InvalidArgumentError(format!(
            "Mask length ({}) doesn't match batch row count ({})",
            mask.len(),
            batch.num_rows()
        ))
        .into());
    }

    let filtered_columns: Vec<ArrayRef> = batch
        .columns()
        .iter()
        .map(|col| arrow_filter(col, mask))
        .collect::<std::result::Result<_, ArrowError>>()?;

    Ok(RecordBatch::try_new(batch.schema(), filtered_columns)?)
}

/// Trait for objects that can filter record batches
pub trait BatchFilter: std::fmt::Debug {
    /// Filter a record batch
    fn filter(&self, batch: &RecordBatch) -> Result<RecordBatch>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int64Array;
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    fn batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, false)]));
        RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(vec![1, 2, 3]))]).unwrap()
    }

    #[test]
    fn test_null_mask_entries_drop_rows() {
        let mask = BooleanArray::from(vec![Some(true), None, Some(false)]);
        let filtered = filter_record_batch(&batch(), &mask).unwrap();
        assert_eq!(filtered.num_rows(), 1);
    }

    #[test]
    fn test_mask_length_mismatch() {
        let mask = BooleanArray::from(vec![true]);
        assert!(filter_record_batch(&batch(), &mask).is_err());
    }
}
