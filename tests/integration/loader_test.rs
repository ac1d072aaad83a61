use arrow::array::{Array, AsArray};
use arrow::datatypes::Float64Type;
use nhanes_explorer::utils::test::{fixture_seqn, fixture_value, source_csv};
use nhanes_explorer::{NhanesError, SourceConfig, load_and_join};

use crate::utils::{Workspace, fixture_source_batch, layout_columns, write_parquet};

#[test]
fn test_join_keeps_one_row_per_primary_subject() {
    let workspace = Workspace::with_rows(50);
    let joined = load_and_join(&workspace.config.sources, "SEQN").unwrap();

    assert_eq!(joined.num_rows(), 50);
    // SEQN plus every survey column, WTINT2YR twice
    assert_eq!(joined.num_columns(), 1 + 4 + 2 + 2 + 2 + 1);
    assert!(joined.column_by_name("WTINT2YR_examination").is_some());
}

#[test]
fn test_secondary_with_fewer_subjects_leaves_nulls() {
    let workspace = Workspace::with_rows(30);
    workspace.overwrite_source("labs", &source_csv(layout_columns("labs"), 10, ','));

    let joined = load_and_join(&workspace.config.sources, "SEQN").unwrap();
    assert_eq!(joined.num_rows(), 30);

    let cholesterol = joined.column_by_name("LBXTC").unwrap();
    for i in 10..30 {
        assert!(cholesterol.is_null(i));
    }
    assert_eq!(cholesterol.is_valid(0), fixture_value("LBXTC", 0).is_some());
}

#[test]
fn test_parquet_and_delimited_sources_mix() {
    let mut workspace = Workspace::with_rows(40);

    let parquet_path = workspace.path("data/examination.parquet");
    write_parquet(&parquet_path, &fixture_source_batch("examination", 40));
    let semicolon_path = workspace.path("data/diet.txt");
    std::fs::write(&semicolon_path, source_csv(layout_columns("diet"), 40, ';')).unwrap();

    for source in &mut workspace.config.sources {
        match source.name.as_str() {
            "examination" => source.path = parquet_path.clone(),
            "diet" => {
                source.path = semicolon_path.clone();
                source.delimiter = ';';
            }
            _ => {}
        }
    }

    let joined = load_and_join(&workspace.config.sources, "SEQN").unwrap();
    assert_eq!(joined.num_rows(), 40);

    let bmi = joined
        .column_by_name("BMXBMI")
        .unwrap()
        .as_primitive::<Float64Type>();
    assert!((bmi.value(3) - fixture_value("BMXBMI", 3).unwrap()).abs() < 1e-9);
    // Whole-number intake columns may be inferred as integers, so only nulls are compared
    let protein = joined.column_by_name("DR1TPROT").unwrap();
    let expected_nulls = (0..40)
        .filter(|i| fixture_value("DR1TPROT", *i).is_none())
        .count();
    assert_eq!(protein.null_count(), expected_nulls);
}

#[test]
fn test_missing_identifier_in_source_is_schema_error() {
    let workspace = Workspace::with_rows(5);
    workspace.overwrite_source("questionnaire", "RESPONDENT,DIQ010\n1,2\n");

    let err = load_and_join(&workspace.config.sources, "SEQN").unwrap_err();
    assert!(matches!(err, NhanesError::Schema { ref column, .. } if column == "SEQN"));
}

#[test]
fn test_missing_file_is_source_error() {
    let mut workspace = Workspace::with_rows(5);
    workspace.config.sources.push(SourceConfig::new(
        "bodymeasures",
        workspace.path("data/missing.csv"),
    ));

    let err = load_and_join(&workspace.config.sources, "SEQN").unwrap_err();
    assert!(matches!(err, NhanesError::Source { .. }));
}

#[test]
fn test_first_subject_identifier() {
    let workspace = Workspace::with_rows(3);
    let joined = load_and_join(&workspace.config.sources, "SEQN").unwrap();
    let seqn = joined
        .column_by_name("SEQN")
        .unwrap()
        .as_primitive::<arrow::datatypes::Int64Type>();
    assert_eq!(seqn.value(0), fixture_seqn(0));
}
