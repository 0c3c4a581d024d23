use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use log::info;

use crate::datastructures::BenchmarkRow;
use crate::invoker::{CommandLine, Invoker};

pub const RESULT_SUFFIX: &str = "_output.json";
pub const CERTIFICATE_SUFFIX: &str = "_solution.csv";

/// Everything a run needs besides the rows.
#[derive(Debug, Clone)]
pub struct RunParameters {
    pub solver: PathBuf,
    pub algorithm: String,
    /// Extra solver arguments, split on whitespace.
    pub options: String,
    /// Directory the row paths are relative to.
    pub instances_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// `<results>/<benchmark>/<name>`, or a timestamped name when none is given.
pub fn output_directory<Tz: TimeZone>(
    results_dir: &Path,
    benchmark: &str,
    algorithm: &str,
    name: Option<&str>,
    now: DateTime<Tz>,
) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    let benchmark_dir = results_dir.join(benchmark);
    match name {
        Some(name) => benchmark_dir.join(name),
        None => benchmark_dir.join(format!(
            "{}_{benchmark}_{algorithm}",
            now.format("%Y-%m-%d_%H-%M-%S")
        )),
    }
}

pub fn result_path(run_dir: &Path, row_path: &str) -> PathBuf {
    run_dir.join(format!("{row_path}{RESULT_SUFFIX}"))
}

pub fn certificate_path(run_dir: &Path, row_path: &str) -> PathBuf {
    run_dir.join(format!("{row_path}{CERTIFICATE_SUFFIX}"))
}

pub fn solver_command(row: &BenchmarkRow, params: &RunParameters) -> CommandLine {
    CommandLine::new(&params.solver)
        .option("verbosity-level", 1)
        .option("input", params.instances_dir.join(&row.path).display())
        .option("objective", &row.objective)
        .option("format", &row.format)
        .option("algorithm", &params.algorithm)
        .args(params.options.split_whitespace())
        .option("time-limit", row.time_limit)
        .option("output", result_path(&params.output_dir, &row.path).display())
        .option(
            "certificate",
            certificate_path(&params.output_dir, &row.path).display(),
        )
}

/// Runs the solver once per row, in order. The first failure aborts the run.
pub fn run_benchmark<I: Invoker>(
    rows: &[BenchmarkRow],
    params: &RunParameters,
    invoker: &mut I,
) -> Result<usize> {
    info!(
        "Running {} instances with algorithm {} into {:?}",
        rows.len(),
        params.algorithm,
        params.output_dir
    );
    for (i, row) in rows.iter().enumerate() {
        for path in [
            result_path(&params.output_dir, &row.path),
            certificate_path(&params.output_dir, &row.path),
        ] {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
        }
        invoker
            .invoke(&solver_command(row, params))
            .with_context(|| format!("instance {} of {}: {row}", i + 1, rows.len()))?;
    }
    Ok(rows.len())
}
