//! Loading and joining the NHANES sources
//!
//! The first source is the primary table. Every other source is attached to
//! it with a left outer join on the identifier, so the joined table has
//! exactly one row per distinct primary identifier.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, Int64Array, UInt32Array};
use arrow::compute::{cast, take};
use arrow::datatypes::{DataType, Field, Int64Type, Schema};
use arrow::record_batch::RecordBatch;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::SourceConfig;
use crate::error::{NhanesError, Result};
use crate::filter::filter_record_batch;
use crate::reader::read_table;
use crate::schema::find_column;
use crate::utils::logging::{create_spinner, finish_progress_bar, log_warning};

/// A source read into memory, labelled with its configured name
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub name: String,
    pub batch: RecordBatch,
}

/// Read every configured source, in order
pub fn load_sources(sources: &[SourceConfig]) -> Result<Vec<SourceTable>> {
    let spinner = create_spinner(Some("Reading NHANES sources"));
    let mut tables = Vec::with_capacity(sources.len());

    for source in sources {
        spinner.set_message(format!("Reading {}", source.name));
        let batch = read_table(&source.path, source.delimiter_byte()?)?;
        tables.push(SourceTable {
            name: source.name.clone(),
            batch,
        });
    }

    finish_progress_bar(&spinner, Some("Sources loaded"));
    Ok(tables)
}

/// Left-join every table onto the first one
pub fn join_sources(tables: &[SourceTable], id: &str) -> Result<RecordBatch> {
    let (primary, secondaries) = tables
        .split_first()
        .ok_or_else(|| NhanesError::config_error("no input sources configured"))?;

    let mut joined = normalize_primary(&primary.batch, id, &primary.name)?;
    for secondary in secondaries {
        joined = left_join(&joined, &secondary.batch, id, &secondary.name)?;
        log::debug!(
            "Joined {}: {} rows, {} columns",
            secondary.name,
            joined.num_rows(),
            joined.num_columns()
        );
    }

    log::info!(
        "Joined {} sources into {} rows x {} columns",
        tables.len(),
        joined.num_rows(),
        joined.num_columns()
    );
    Ok(joined)
}

/// Read and join the configured sources
pub fn load_and_join(sources: &[SourceConfig], id: &str) -> Result<RecordBatch> {
    let tables = load_sources(sources)?;
    join_sources(&tables, id)
}

/// Identifier column widened to `Int64`
fn identifier_values(batch: &RecordBatch, id: &str, context: &str) -> Result<Int64Array> {
    let index = find_column(batch, id, context)?;
    let values = cast(batch.column(index), &DataType::Int64)?;
    Ok(values.as_primitive::<Int64Type>().clone())
}

/// Replace the identifier column of a batch with its `Int64` form
fn with_identifier(batch: &RecordBatch, id: &str, ids: Int64Array) -> Result<RecordBatch> {
    let index = batch.schema().index_of(id)?;

    let mut fields: Vec<Field> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();
    fields[index] = Field::new(id, DataType::Int64, ids.null_count() > 0);

    let mut columns = batch.columns().to_vec();
    columns[index] = Arc::new(ids);

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

/// Drop rows with a null identifier and keep the first row of repeated ones
pub fn normalize_primary(batch: &RecordBatch, id: &str, name: &str) -> Result<RecordBatch> {
    let ids = identifier_values(batch, id, name)?;

    let mut seen = FxHashSet::default();
    let mut null_ids = 0_usize;
    let mut repeated = 0_usize;
    let keep: BooleanArray = ids
        .iter()
        .map(|value| match value {
            None => {
                null_ids += 1;
                Some(false)
            }
            Some(v) if !seen.insert(v) => {
                repeated += 1;
                Some(false)
            }
            Some(_) => Some(true),
        })
        .collect();

    if null_ids > 0 {
        log_warning(&format!("{name}: dropped {null_ids} rows without {id}"), None);
    }
    if repeated > 0 {
        log_warning(
            &format!("{name}: {repeated} repeated {id} values, keeping the first row of each"),
            None,
        );
    }

    let normalized = with_identifier(batch, id, ids)?;
    filter_record_batch(&normalized, &keep)
}

/// Position of the first row for every identifier of a secondary table
fn index_identifiers(ids: &Int64Array, name: &str, id: &str) -> FxHashMap<i64, u32> {
    let mut index = FxHashMap::default();
    index.reserve(ids.len());
    let mut repeated = 0_usize;

    for (row, value) in ids.iter().enumerate() {
        let (Some(value), Ok(row)) = (value, u32::try_from(row)) else {
            continue;
        };
        if index.contains_key(&value) {
            repeated += 1;
        } else {
            index.insert(value, row);
        }
    }

    if repeated > 0 {
        log_warning(
            &format!("{name}: {repeated} repeated {id} values, the first row of each is joined"),
            None,
        );
    }
    index
}

/// Left outer join of `secondary` onto `primary` on the identifier column
///
/// Every primary row appears once, in its original order. Secondary columns
/// are null where no secondary row matches. A secondary column whose name is
/// already taken gets `_<suffix>` appended.
///
/// # Errors
/// Returns a schema error if either table lacks the identifier column
pub fn left_join(
    primary: &RecordBatch,
    secondary: &RecordBatch,
    id: &str,
    suffix: &str,
) -> Result<RecordBatch> {
    let primary_ids = identifier_values(primary, id, "joined table")?;
    let secondary_ids = identifier_values(secondary, id, suffix)?;

    let index = index_identifiers(&secondary_ids, suffix, id);
    let indices: UInt32Array = primary_ids
        .iter()
        .map(|value| value.and_then(|v| index.get(&v).copied()))
        .collect();

    let matched = indices.len() - indices.null_count();
    log::debug!("{suffix}: {matched} of {} rows matched", indices.len());

    let primary = with_identifier(primary, id, primary_ids)?;
    let primary_schema = primary.schema();
    let mut fields: Vec<Field> = primary_schema
        .fields()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();
    let mut columns: Vec<ArrayRef> = primary.columns().to_vec();

    let secondary_schema = secondary.schema();
    for (field, column) in secondary_schema.fields().iter().zip(secondary.columns()) {
        if field.name() == id {
            continue;
        }

        let name = if primary_schema.index_of(field.name()).is_ok() {
            let renamed = format!("{}_{suffix}", field.name());
            log::debug!("Column {} renamed to {renamed}", field.name());
            renamed
        } else {
            field.name().clone()
        };

        fields.push(Field::new(name, field.data_type().clone(), true));
        columns.push(take(column.as_ref(), &indices, None)?);
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int32Array, StringArray};

    fn table(columns: Vec<(&str, ArrayRef)>) -> RecordBatch {
        RecordBatch::try_from_iter(columns).unwrap()
    }

    fn ids(values: Vec<i64>) -> ArrayRef {
        Arc::new(Int64Array::from(values))
    }

    fn floats(values: Vec<Option<f64>>) -> ArrayRef {
        Arc::new(Float64Array::from(values))
    }

    fn float_column(batch: &RecordBatch, name: &str) -> Vec<Option<f64>> {
        batch
            .column_by_name(name)
            .unwrap()
            .as_primitive::<arrow::datatypes::Float64Type>()
            .iter()
            .collect()
    }

    #[test]
    fn test_single_row_match_fills_every_column() {
        let primary = table(vec![("SEQN", ids(vec![1])), ("RIDAGEYR", floats(vec![Some(40.0)]))]);
        let secondary = table(vec![("SEQN", ids(vec![1])), ("BMXBMI", floats(vec![Some(22.5)]))]);

        let joined = left_join(&primary, &secondary, "SEQN", "examination").unwrap();
        assert_eq!(joined.num_rows(), 1);
        assert_eq!(joined.num_columns(), 3);
        assert_eq!(float_column(&joined, "RIDAGEYR"), vec![Some(40.0)]);
        assert_eq!(float_column(&joined, "BMXBMI"), vec![Some(22.5)]);
    }

    #[test]
    fn test_non_matching_identifier_gives_nulls() {
        let primary = table(vec![("SEQN", ids(vec![1])), ("RIDAGEYR", floats(vec![Some(40.0)]))]);
        let secondary = table(vec![("SEQN", ids(vec![2])), ("BMXBMI", floats(vec![Some(22.5)]))]);

        let joined = left_join(&primary, &secondary, "SEQN", "examination").unwrap();
        assert_eq!(joined.num_rows(), 1);
        assert_eq!(float_column(&joined, "BMXBMI"), vec![None]);
    }

    #[test]
    fn test_primary_order_and_cardinality_preserved() {
        let primary = table(vec![("SEQN", ids(vec![3, 1, 2]))]);
        let secondary = table(vec![
            ("SEQN", ids(vec![2, 3, 3, 9])),
            ("LBXTC", floats(vec![Some(200.0), Some(180.0), Some(999.0), Some(1.0)])),
        ]);

        let joined = left_join(&primary, &secondary, "SEQN", "labs").unwrap();
        assert_eq!(joined.num_rows(), 3);
        assert_eq!(
            float_column(&joined, "LBXTC"),
            vec![Some(180.0), None, Some(200.0)]
        );
    }

    #[test]
    fn test_identifier_types_are_normalized() {
        let primary = table(vec![("SEQN", Arc::new(Int32Array::from(vec![5, 6])) as ArrayRef)]);
        let secondary = table(vec![
            ("SEQN", floats(vec![Some(6.0), Some(5.0)])),
            ("DIQ010", floats(vec![Some(2.0), Some(1.0)])),
        ]);

        let joined = left_join(&primary, &secondary, "SEQN", "questionnaire").unwrap();
        assert_eq!(joined.schema().field(0).data_type(), &DataType::Int64);
        assert_eq!(float_column(&joined, "DIQ010"), vec![Some(1.0), Some(2.0)]);
    }

    #[test]
    fn test_colliding_columns_get_suffix() {
        let primary = table(vec![("SEQN", ids(vec![1])), ("WTMEC2YR", floats(vec![Some(1.0)]))]);
        let secondary = table(vec![
            ("SEQN", ids(vec![1])),
            ("WTMEC2YR", floats(vec![Some(2.0)])),
        ]);

        let joined = left_join(&primary, &secondary, "SEQN", "examination").unwrap();
        assert_eq!(float_column(&joined, "WTMEC2YR"), vec![Some(1.0)]);
        assert_eq!(
            float_column(&joined, "WTMEC2YR_examination"),
            vec![Some(2.0)]
        );
    }

    #[test]
    fn test_missing_identifier_is_schema_error() {
        let primary = table(vec![("SEQN", ids(vec![1]))]);
        let secondary = table(vec![(
            "RESPONDENT",
            Arc::new(StringArray::from(vec!["1"])) as ArrayRef,
        )]);

        let err = left_join(&primary, &secondary, "SEQN", "diet").unwrap_err();
        assert!(matches!(err, NhanesError::Schema { ref column, .. } if column == "SEQN"));
    }

    #[test]
    fn test_normalize_primary_drops_null_and_repeated_ids() {
        let primary = table(vec![
            ("SEQN", floats(vec![Some(1.0), None, Some(2.0), Some(1.0)])),
            ("RIDAGEYR", floats(vec![Some(10.0), Some(20.0), Some(30.0), Some(40.0)])),
        ]);

        let normalized = normalize_primary(&primary, "SEQN", "demographic").unwrap();
        assert_eq!(normalized.num_rows(), 2);
        assert_eq!(
            float_column(&normalized, "RIDAGEYR"),
            vec![Some(10.0), Some(30.0)]
        );
        let seqn = normalized.column(0).as_primitive::<Int64Type>();
        assert_eq!(seqn.values().to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_join_sources_chain() {
        let tables = vec![
            SourceTable {
                name: "demographic".into(),
                batch: table(vec![("SEQN", ids(vec![1, 2]))]),
            },
            SourceTable {
                name: "examination".into(),
                batch: table(vec![("SEQN", ids(vec![2])), ("BMXBMI", floats(vec![Some(30.0)]))]),
            },
            SourceTable {
                name: "labs".into(),
                batch: table(vec![("SEQN", ids(vec![1])), ("LBXTC", floats(vec![Some(150.0)]))]),
            },
        ];

        let joined = join_sources(&tables, "SEQN").unwrap();
        assert_eq!(joined.num_rows(), 2);
        assert_eq!(float_column(&joined, "BMXBMI"), vec![None, Some(30.0)]);
        assert_eq!(float_column(&joined, "LBXTC"), vec![Some(150.0), None]);
    }

    #[test]
    fn test_join_without_sources_is_config_error() {
        let err = join_sources(&[], "SEQN").unwrap_err();
        assert!(matches!(err, NhanesError::Config(_)));
    }
}
