//! Console output utilities

use arrow::array::Array;
use arrow::record_batch::RecordBatch;

/// Print row/column counts and the schema of a table
pub fn print_table_overview(name: &str, batch: &RecordBatch) {
    println!(
        "{name}: {} rows x {} columns",
        batch.num_rows(),
        batch.num_columns()
    );
    for field in batch.schema().fields() {
        let nulls = batch
            .column_by_name(field.name())
            .map_or(0, |column| column.null_count());
        println!(
            "  - {} ({}, {} null)",
            field.name(),
            field.data_type(),
            nulls
        );
    }
}

/// Print a section heading followed by a rule of matching width
pub fn print_section(title: &str) {
    println!();
    println!("{title}");
    println!("{}", "=".repeat(title.chars().count()));
}
