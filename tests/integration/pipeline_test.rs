use std::fs;

use nhanes_explorer::viz::CHART_FILES;
use nhanes_explorer::{NhanesError, run};

use crate::utils::Workspace;

#[test]
fn test_end_to_end_run() {
    let mut workspace = Workspace::with_rows(300);
    let report_path = workspace.path("output/report.json");
    workspace.config.report_path = Some(report_path.clone());

    let report = run(&workspace.config).unwrap();

    assert_eq!(report.joined_rows, 300);
    assert!(report.analysis_rows > 0);
    assert!(report.analysis_rows < 300);
    assert_eq!(report.analysis_rows, report.table.len());

    // Four age group x sex strata plus the overall column
    assert_eq!(report.summary.strata.len(), 5);
    assert_eq!(
        report.summary.overall().map(|s| s.n),
        Some(report.analysis_rows)
    );

    assert_eq!(report.models.len(), 2);
    assert_eq!(report.models[0].coefficients.len(), 5);
    assert_eq!(report.models[1].coefficients.len(), 4);
    assert!(report.models[0].coefficient("sex[T.Male]").is_some());

    assert_eq!(report.charts.len(), CHART_FILES.len());
    for (path, file) in report.charts.iter().zip(CHART_FILES) {
        assert!(path.ends_with(file));
        let svg = fs::read_to_string(path).unwrap();
        assert!(svg.contains("<svg"));
    }

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(json["analysis_rows"], report.analysis_rows);
    assert_eq!(json["models"].as_array().map(Vec::len), Some(2));
    assert!(json.get("table").is_none());
}

#[test]
fn test_runs_are_deterministic() {
    let mut first = Workspace::with_rows(150);
    let mut second = Workspace::with_rows(150);
    first.config.report_path = None;
    second.config.report_path = None;

    let a = run(&first.config).unwrap();
    let b = run(&second.config).unwrap();

    assert_eq!(
        a.table.to_record_batch().unwrap(),
        b.table.to_record_batch().unwrap()
    );
    assert_eq!(a.summary, b.summary);
    assert_eq!(a.models, b.models);
    for (left, right) in a.charts.iter().zip(&b.charts) {
        assert_eq!(fs::read(left).unwrap(), fs::read(right).unwrap());
    }
}

#[test]
fn test_charts_can_be_disabled() {
    let mut workspace = Workspace::with_rows(120);
    workspace.config.render_charts = false;

    let report = run(&workspace.config).unwrap();
    assert!(report.charts.is_empty());
    assert!(!workspace.path("output/overview.svg").exists());
}

#[test]
fn test_unknown_stratifier_is_config_error() {
    let mut workspace = Workspace::with_rows(120);
    workspace.config.stratify_by = vec!["region".to_string()];

    let err = run(&workspace.config).unwrap_err();
    assert!(matches!(err, NhanesError::Config(_)));
}

#[test]
fn test_continuous_stratifier_is_config_error() {
    let mut workspace = Workspace::with_rows(120);
    workspace.config.stratify_by = vec!["bmi".to_string()];

    let err = run(&workspace.config).unwrap_err();
    assert!(matches!(err, NhanesError::Config(_)));
}

#[test]
fn test_missing_identifier_stops_the_run() {
    let workspace = Workspace::with_rows(20);
    workspace.overwrite_source("diet", "ID,DR1TPROT,DR1TSUGR\n1,50,60\n");

    let err = run(&workspace.config).unwrap_err();
    assert!(matches!(err, NhanesError::Schema { ref column, .. } if column == "SEQN"));
}

#[test]
fn test_missing_source_file_stops_the_run() {
    let mut workspace = Workspace::with_rows(20);
    workspace.config.sources[2].path = workspace.path("data/absent.csv");

    let err = run(&workspace.config).unwrap_err();
    assert!(matches!(err, NhanesError::Source { .. }));
}

#[test]
fn test_too_few_subjects_is_fit_error() {
    let workspace = Workspace::with_rows(3);

    let err = run(&workspace.config).unwrap_err();
    assert!(matches!(err, NhanesError::Fit { .. }));
}
