use std::{fs, path::Path};

use anyhow::{Context, Result};
use itertools::Itertools;
use polars::prelude::*;
use thiserror::Error;

use crate::aggregator::{Report, ResultSource};
use crate::datastructures::*;

use utils::*;

pub const PATH_FIELD: &str = "Path";
pub const DATASET_FIELD: &str = "Dataset";
pub const OBJECTIVE_FIELD: &str = "Objective";
pub const TIME_LIMIT_FIELD: &str = "Time limit";
pub const FORMAT_FIELD: &str = "Format";
pub const BEST_KNOWN_FIELD: &str = "Best known solution value";
pub const JOBS_FIELD: &str = "Number of jobs";
pub const MACHINES_FIELD: &str = "Number of machines";
pub const SOLUTION_VALUE_MARKER: &str = "Solution value";
pub const GAP_MARKER: &str = "Gap";

#[derive(Debug, Error)]
pub enum RowError {
    /// A row misses a field or carries a value of the wrong type. Lines count the header.
    #[error("malformed row at line {line}: field \"{field}\" {reason}")]
    Malformed {
        line: usize,
        field: String,
        reason: String,
    },
    #[error("missing column \"{0}\"")]
    MissingColumn(String),
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Header of the gap column paired with a solution value column.
pub fn gap_column(value_column: &str) -> String {
    value_column.replace(SOLUTION_VALUE_MARKER, GAP_MARKER)
}

/// Reads every column as text, so cells keep their written form until parsed.
pub fn read_benchmark_rows(path: &Path) -> Result<Vec<BenchmarkRow>> {
    let df = CsvReader::from_path(path)
        .with_context(|| format!("cannot open benchmark table {path:?}"))?
        .with_comment_char(Some(b'#'))
        .has_header(true)
        .infer_schema(Some(0))
        .finish()?;
    rows_from_dataframe(&df)
        .with_context(|| format!("invalid benchmark table {path:?}"))
}

/// Turns a benchmark table into typed rows.
///
/// Extra columns containing `Solution value` become reference results; empty or
/// non-integer cells in them are [`RunOutput::Missing`]. Every cell is also kept
/// in header order for the report.
pub fn rows_from_dataframe(df: &DataFrame) -> Result<Vec<BenchmarkRow>, RowError> {
    let paths = utf8_column(df, PATH_FIELD)?;
    let datasets = optional_utf8_column(df, DATASET_FIELD)?;
    let objectives = utf8_column(df, OBJECTIVE_FIELD)?;
    let time_limits = utf8_column(df, TIME_LIMIT_FIELD)?;
    let formats = utf8_column(df, FORMAT_FIELD)?;
    let best_known_values = utf8_column(df, BEST_KNOWN_FIELD)?;
    let jobs = optional_utf8_column(df, JOBS_FIELD)?;
    let machines = optional_utf8_column(df, MACHINES_FIELD)?;
    let columns = df
        .get_column_names()
        .into_iter()
        .map(|name| Ok((name.to_string(), utf8_column(df, name)?)))
        .collect::<Result<Vec<_>, RowError>>()?;

    (0..df.height())
        .map(|i| {
            let line = i + 2;
            let objective = required(&objectives[i], line, OBJECTIVE_FIELD)?.to_string();
            let result_field =
                ResultField::from_objective(&objective).ok_or_else(|| {
                    RowError::Malformed {
                        line,
                        field: OBJECTIVE_FIELD.to_string(),
                        reason: format!("has unknown objective \"{objective}\""),
                    }
                })?;
            let time_limit = required(&time_limits[i], line, TIME_LIMIT_FIELD)?;
            let best_known_value = required(&best_known_values[i], line, BEST_KNOWN_FIELD)?;
            Ok(BenchmarkRow {
                path: required(&paths[i], line, PATH_FIELD)?.to_string(),
                dataset: datasets[i].clone(),
                objective,
                result_field,
                time_limit: number(time_limit, line, TIME_LIMIT_FIELD)?,
                format: required(&formats[i], line, FORMAT_FIELD)?.to_string(),
                best_known_value: integer(best_known_value, line, BEST_KNOWN_FIELD)?,
                number_of_jobs: optional_integer(&jobs[i], line, JOBS_FIELD)?,
                number_of_machines: optional_integer(&machines[i], line, MACHINES_FIELD)?,
                reference_results: columns
                    .iter()
                    .filter(|(name, _)| name.contains(SOLUTION_VALUE_MARKER))
                    .map(|(name, values)| {
                        let value = values[i].as_deref().and_then(parse_integer);
                        (name.clone(), RunOutput::from(value))
                    })
                    .collect(),
                fields: columns
                    .iter()
                    .map(|(name, values)| (name.clone(), values[i].clone()))
                    .collect(),
            })
        })
        .collect()
}

/// Header of the report: the table's own columns in their order, `Path` and the
/// best known value first when the rows carry no table cells.
fn report_headers(report: &Report) -> Vec<String> {
    let mut headers = report
        .rows
        .iter()
        .find_map(|r| r.source())
        .map(|row| row.fields.iter().map(|(name, _)| name.clone()).collect_vec())
        .unwrap_or_default();
    for field in [BEST_KNOWN_FIELD, PATH_FIELD] {
        if !headers.iter().any(|h| h == field) {
            headers.insert(0, field.to_string());
        }
    }
    headers
}

fn result_columns(report: &Report, j: usize) -> [Series; 2] {
    let result_set = &report.result_sets[j];
    [
        Series::new(
            &result_set.value_column(),
            report.rows.iter().map(|r| r.entries[j].value()).collect_vec(),
        ),
        Series::new(
            &result_set.gap_column(),
            report.rows.iter().map(|r| r.entries[j].gap).collect_vec(),
        ),
    ]
}

/// The report as a dataframe. Missing results appear as [`SENTINEL_VALUE`].
///
/// The columns of the benchmark table keep their order, each reference result is
/// followed by its gap, and the run directories come last. Bucket rows carry their
/// label as path and leave the other table cells empty.
pub fn report_to_dataframe(report: &Report) -> Result<DataFrame> {
    let rows = &report.rows;
    let mut emitted = vec![false; report.result_sets.len()];
    let mut columns = vec![];
    for header in report_headers(report) {
        let reference = report.result_sets.iter().position(|s| {
            s.source == ResultSource::Reference && s.value_column() == header
        });
        if header == PATH_FIELD {
            columns.push(Series::new(
                PATH_FIELD,
                rows.iter().map(|r| r.label().to_string()).collect_vec(),
            ));
        } else if header == BEST_KNOWN_FIELD {
            columns.push(Series::new(
                BEST_KNOWN_FIELD,
                rows.iter().map(|r| r.best_known_value).collect_vec(),
            ));
        } else if let Some(j) = reference {
            columns.extend(result_columns(report, j));
            emitted[j] = true;
        } else if !report.result_sets.iter().any(|s| s.gap_column() == header) {
            // Gap columns already in the table are recomputed next to their values.
            columns.push(Series::new(
                &header,
                rows.iter()
                    .map(|r| r.source().and_then(|row| row.field(&header)).map(str::to_string))
                    .collect_vec(),
            ));
        }
    }
    let remaining = (0..report.result_sets.len()).filter(|&j| !emitted[j]).collect_vec();
    for j in remaining {
        columns.extend(result_columns(report, j));
    }
    Ok(DataFrame::new(columns)?)
}

pub fn write_report_csv(report: &Report, path: &Path) -> Result<()> {
    let mut df = report_to_dataframe(report)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(path)
        .with_context(|| format!("cannot create report {path:?}"))?;
    CsvWriter::new(&mut file).has_header(true).finish(&mut df)?;
    Ok(())
}

mod utils;

#[cfg(test)]
mod tests;
