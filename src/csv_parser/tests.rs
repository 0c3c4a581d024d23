use std::fs;

use polars::prelude::*;

use crate::aggregator::{aggregate, ResultSet};
use crate::datastructures::*;

use super::*;

#[test]
fn test_rows_from_dataframe() {
    let df = df! {
        "Path" => ["taillard1993/tai001", "taillard1993/tai002"],
        "Objective" => ["makespan", "makespan"],
        "Time limit" => [10, 20],
        "Format" => ["default", "default"],
        "Best known solution value" => [1278, 1359],
        "Number of jobs" => [20, 20],
        "Number of machines" => [5, 5],
    }
    .unwrap();
    let rows = rows_from_dataframe(&df).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].path, "taillard1993/tai002");
    assert_eq!(rows[1].time_limit, 20.0);
    assert_eq!(rows[1].best_known_value, 1359);
    assert_eq!(rows[0].number_of_jobs, Some(20));
    assert_eq!(rows[0].dataset, None);
    assert_eq!(rows[0].result_field, ResultField::Makespan);
    assert!(rows[0].reference_results.is_empty());
}

#[test]
fn test_missing_best_known_value_is_malformed() {
    let df = df! {
        "Path" => ["a", "b"],
        "Objective" => ["tct", "tct"],
        "Time limit" => [1.0, 1.0],
        "Format" => ["default", "default"],
        "Best known solution value" => [Some(10), None],
    }
    .unwrap();
    let err = rows_from_dataframe(&df).unwrap_err();
    assert!(matches!(
        err,
        RowError::Malformed { line: 3, ref field, .. } if field == BEST_KNOWN_FIELD
    ));
}

#[test]
fn test_fractional_best_known_value_is_malformed() {
    for value in ["1278.5", "1278.0"] {
        let df = df! {
            "Path" => ["a"],
            "Objective" => ["makespan"],
            "Time limit" => ["10"],
            "Format" => ["default"],
            "Best known solution value" => [value],
        }
        .unwrap();
        let err = rows_from_dataframe(&df).unwrap_err();
        assert!(matches!(
            err,
            RowError::Malformed { line: 2, ref field, ref reason }
                if field == BEST_KNOWN_FIELD && reason == "is not an integer"
        ));
    }
}

#[test]
fn test_read_table_rejects_fractional_best_known_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data_pfss_makespan.csv");
    fs::write(
        &path,
        "Path,Objective,Time limit,Format,Best known solution value\n\
         taillard1993/tai001,makespan,10,default,1278.5\n",
    )
    .unwrap();
    let err = read_benchmark_rows(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RowError>(),
        Some(RowError::Malformed { .. })
    ));
    assert!(format!("{err:#}").contains("is not an integer"));
}

#[test]
fn test_missing_column() {
    let df = df! {
        "Path" => ["a"],
        "Objective" => ["makespan"],
        "Format" => ["default"],
        "Best known solution value" => [10],
    }
    .unwrap();
    assert!(matches!(
        rows_from_dataframe(&df).unwrap_err(),
        RowError::MissingColumn(ref c) if c == TIME_LIMIT_FIELD
    ));
}

#[test]
fn test_unknown_objective_is_malformed() {
    let df = df! {
        "Path" => ["a"],
        "Objective" => ["lateness"],
        "Time limit" => [1],
        "Format" => ["default"],
        "Best known solution value" => [10],
    }
    .unwrap();
    let err = rows_from_dataframe(&df).unwrap_err();
    assert!(err.to_string().contains("lateness"));
}

#[test]
fn test_read_table_with_reference_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data_pfss_tct.csv");
    fs::write(
        &path,
        "Path,Objective,Time limit,Format,Best known solution value,Literature / Solution value\n\
         a,total-flow-time,60,default,100,104\n\
         b,total-flow-time,60,default,200,\n",
    )
    .unwrap();
    let rows = read_benchmark_rows(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].result_field, ResultField::TotalFlowTime);
    assert_eq!(
        rows[0].reference_result("Literature / Solution value"),
        RunOutput::Solution(104)
    );
    assert_eq!(
        rows[1].reference_result("Literature / Solution value"),
        RunOutput::Missing
    );
}

#[test]
fn test_non_integer_reference_results_are_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data_pfss_tct.csv");
    fs::write(
        &path,
        "Path,Objective,Time limit,Format,Best known solution value,Literature / Solution value\n\
         a,total-flow-time,60,default,100,104.5\n\
         b,total-flow-time,60,default,200,204.0\n\
         c,total-flow-time,60,default,300, 304\n",
    )
    .unwrap();
    let rows = read_benchmark_rows(&path).unwrap();
    let references = rows
        .iter()
        .map(|r| r.reference_result("Literature / Solution value"))
        .collect::<Vec<_>>();
    assert_eq!(
        references,
        vec![RunOutput::Missing, RunOutput::Missing, RunOutput::Solution(304)]
    );
}

#[test]
fn test_report_keeps_table_columns() {
    let dir = tempfile::tempdir().unwrap();
    let table = dir.path().join("data_pfss_tct.csv");
    fs::write(
        &table,
        "Path,Comment,Objective,Time limit,Format,Best known solution value,Literature / Solution value\n\
         a,first try,total-flow-time,60,default,100,104\n",
    )
    .unwrap();
    let rows = read_benchmark_rows(&table).unwrap();
    assert_eq!(rows[0].field("Comment"), Some("first try"));
    let result_sets = crate::aggregator::result_sets(&rows, &[dir.path().join("run1")]);
    let report = aggregate(&rows, &result_sets, None).unwrap();
    let out = dir.path().join("report.csv");
    write_report_csv(&report, &out).unwrap();

    let content = fs::read_to_string(out).unwrap();
    let lines = content.lines().collect::<Vec<_>>();
    assert_eq!(
        lines[0],
        "Path,Comment,Objective,Time limit,Format,Best known solution value,\
         Literature / Solution value,Literature / Gap,run1 / Solution value,run1 / Gap"
    );
    assert!(lines[1].starts_with("a,first try,total-flow-time,60,default,100,104,"));
    assert!(lines[2].starts_with("Total,,,,,100,104,"));
    assert_eq!(lines.len(), 3);
}

#[test]
fn test_report_to_dataframe() {
    let rows = vec![BenchmarkRow {
        reference_results: vec![(
            "Literature / Solution value".to_string(),
            RunOutput::Missing,
        )],
        ..BenchmarkRow::new("a", "makespan", 5.0, "default", 200).unwrap()
    }];
    let report = aggregate(
        &rows,
        &[ResultSet::reference("Literature / Solution value")],
        None,
    )
    .unwrap();
    let df = report_to_dataframe(&report).unwrap();
    assert_eq!(df.height(), 2);
    assert_eq!(
        df.get_column_names(),
        vec![
            PATH_FIELD,
            BEST_KNOWN_FIELD,
            "Literature / Solution value",
            "Literature / Gap",
        ]
    );
    let values = df
        .column("Literature / Solution value")
        .unwrap()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect::<Vec<_>>();
    assert_eq!(values, vec![SENTINEL_VALUE, SENTINEL_VALUE]);
    let paths = df
        .column(PATH_FIELD)
        .unwrap()
        .utf8()
        .unwrap()
        .into_no_null_iter()
        .collect::<Vec<_>>();
    assert_eq!(paths, vec!["a", "Total"]);
}

#[test]
fn test_write_report_csv() {
    let dir = tempfile::tempdir().unwrap();
    let rows = vec![BenchmarkRow::new("a", "makespan", 5.0, "default", 200).unwrap()];
    let report = aggregate(&rows, &[], None).unwrap();
    let out = dir.path().join("reports/pfss_makespan.csv");
    write_report_csv(&report, &out).unwrap();
    let content = fs::read_to_string(out).unwrap();
    assert!(content.starts_with("Path,Best known solution value\n"));
    assert_eq!(content.lines().count(), 3);
}
