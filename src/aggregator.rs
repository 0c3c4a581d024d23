use std::{
    fs,
    io::BufReader,
    iter,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use itertools::Itertools;
use log::{debug, warn};
use prettytable::{Cell, Row, Table};
use serde_json::Value;
use thiserror::Error;

use crate::csv_parser::{self, BEST_KNOWN_FIELD, PATH_FIELD, SOLUTION_VALUE_MARKER};
use crate::datastructures::*;
use crate::orchestrator::result_path;

pub const TOTAL_LABEL: &str = "Total";

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("row {path} (jobs {jobs:?}, machines {machines:?}) matches no size bin")]
    UnbinnedRow {
        path: String,
        jobs: Option<i64>,
        machines: Option<i64>,
    },
}

/// Where the values of a result set come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultSource {
    /// A `... / Solution value` column of the benchmark table itself.
    Reference,
    /// A completed run directory.
    Directory(PathBuf),
}

/// One competing set of results, rendered as a value and a gap column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet {
    pub name: String,
    pub source: ResultSource,
}

impl ResultSet {
    pub fn reference(column: &str) -> Self {
        Self {
            name: column.to_string(),
            source: ResultSource::Reference,
        }
    }

    /// Named after the last component of `dir`.
    pub fn directory(dir: &Path) -> Self {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());
        Self {
            name,
            source: ResultSource::Directory(dir.to_path_buf()),
        }
    }

    pub fn value_column(&self) -> String {
        match self.source {
            ResultSource::Reference => self.name.clone(),
            ResultSource::Directory(_) => {
                format!("{} / {SOLUTION_VALUE_MARKER}", self.name)
            }
        }
    }

    pub fn gap_column(&self) -> String {
        csv_parser::gap_column(&self.value_column())
    }

    pub fn read(&self, row: &BenchmarkRow) -> RunOutput {
        match &self.source {
            ResultSource::Reference => row.reference_result(&self.name),
            ResultSource::Directory(dir) => read_run_output(dir, row),
        }
    }
}

/// Reference columns of the table first, then the run directories in the given order.
///
/// A run whose name is already taken is named after its full path instead, and
/// numbered if that is taken too, so every result set gets its own columns.
pub fn result_sets(rows: &[BenchmarkRow], run_dirs: &[PathBuf]) -> Vec<ResultSet> {
    let mut sets = rows
        .first()
        .map(|row| {
            row.reference_results
                .iter()
                .map(|(column, _)| ResultSet::reference(column))
                .collect_vec()
        })
        .unwrap_or_default();
    for dir in run_dirs {
        let mut set = ResultSet::directory(dir);
        let short_name = set.name.clone();
        if is_taken(&sets, &set) {
            set.name = dir.display().to_string();
        }
        let base = set.name.clone();
        let mut n = 2;
        while is_taken(&sets, &set) {
            set.name = format!("{base} ({n})");
            n += 1;
        }
        if set.name != short_name {
            warn!("Run name {short_name} is taken, reporting {dir:?} as {}", set.name);
        }
        sets.push(set);
    }
    sets
}

fn is_taken(sets: &[ResultSet], set: &ResultSet) -> bool {
    sets.iter().any(|s| s.value_column() == set.value_column())
}

/// Every run directory of a benchmark, sorted by name.
pub fn list_run_directories(benchmark_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = fs::read_dir(benchmark_dir)
        .with_context(|| format!("cannot list runs in {benchmark_dir:?}"))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect_vec();
    dirs.sort();
    Ok(dirs)
}

/// Reads the objective value a run reported for `row`.
///
/// A missing file, invalid json or an absent field all give [`RunOutput::Missing`].
pub fn read_run_output(run_dir: &Path, row: &BenchmarkRow) -> RunOutput {
    let path = result_path(run_dir, &row.path);
    let value = fs::File::open(&path)
        .ok()
        .and_then(|file| serde_json::from_reader::<_, Value>(BufReader::new(file)).ok())
        .and_then(|json| json.pointer(row.result_field.pointer()).and_then(Value::as_i64));
    match value {
        Some(value) => RunOutput::Solution(value),
        None => {
            warn!("No result for {} in {:?}", row.path, path);
            RunOutput::Missing
        }
    }
}

/// Relative gap in percent. `reference` must not be zero.
pub fn gap(value: i64, reference: i64) -> f64 {
    (value - reference) as f64 / reference as f64 * 100.0
}

/// Display classification of a value against the best known value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Tie,
    Loss,
    Win,
}

impl Verdict {
    pub fn classify(value: i64, reference: i64) -> Self {
        match value.cmp(&reference) {
            std::cmp::Ordering::Equal => Verdict::Tie,
            std::cmp::Ordering::Greater => Verdict::Loss,
            std::cmp::Ordering::Less => Verdict::Win,
        }
    }

    fn style_spec(&self) -> &'static str {
        match self {
            Verdict::Tie => "Fg",
            Verdict::Loss => "Fr",
            Verdict::Win => "Fy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measure {
    /// What one result set reported for one row.
    Result(RunOutput),
    /// Accumulated values of a bucket.
    Sum(i64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub measure: Measure,
    pub gap: f64,
}

impl Entry {
    pub fn value(&self) -> i64 {
        match self.measure {
            Measure::Result(output) => output.value(),
            Measure::Sum(sum) => sum,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self.measure, Measure::Result(RunOutput::Missing))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowKind {
    Instance(BenchmarkRow),
    Bucket(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub kind: RowKind,
    pub best_known_value: i64,
    /// One entry per result set, in report order.
    pub entries: Vec<Entry>,
}

impl ReportRow {
    pub fn label(&self) -> &str {
        match &self.kind {
            RowKind::Instance(row) => &row.path,
            RowKind::Bucket(label) => label,
        }
    }

    pub fn source(&self) -> Option<&BenchmarkRow> {
        match &self.kind {
            RowKind::Instance(row) => Some(row),
            RowKind::Bucket(_) => None,
        }
    }

    pub fn verdicts(&self) -> Vec<Verdict> {
        self.entries
            .iter()
            .map(|e| Verdict::classify(e.value(), self.best_known_value))
            .collect()
    }
}

/// Running sums over the rows mapped to one label.
#[derive(Debug, Clone)]
struct Bucket {
    label: String,
    best_known_value: i64,
    values: Vec<i64>,
    gaps: Vec<f64>,
}

impl Bucket {
    fn new(label: &str, num_result_sets: usize) -> Self {
        Self {
            label: label.to_string(),
            best_known_value: 0,
            values: vec![0; num_result_sets],
            gaps: vec![0.0; num_result_sets],
        }
    }

    // Gaps are summed row by row, not recomputed from the summed values.
    fn add(&mut self, best_known_value: i64, entries: &[Entry]) {
        self.best_known_value += best_known_value;
        for (j, entry) in entries.iter().enumerate() {
            self.values[j] += entry.value();
            self.gaps[j] += entry.gap;
        }
    }

    fn into_row(self) -> ReportRow {
        ReportRow {
            kind: RowKind::Bucket(self.label),
            best_known_value: self.best_known_value,
            entries: self
                .values
                .into_iter()
                .zip(self.gaps)
                .map(|(sum, gap)| Entry {
                    measure: Measure::Sum(sum),
                    gap,
                })
                .collect(),
        }
    }
}

/// Comparative table: the benchmark rows, then the size buckets, then the total.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub result_sets: Vec<ResultSet>,
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn instance_rows(&self) -> impl Iterator<Item = &ReportRow> {
        self.rows
            .iter()
            .filter(|r| matches!(r.kind, RowKind::Instance(_)))
    }

    pub fn bucket(&self, label: &str) -> Option<&ReportRow> {
        self.rows
            .iter()
            .find(|r| matches!(&r.kind, RowKind::Bucket(l) if l == label))
    }

    pub fn total(&self) -> Option<&ReportRow> {
        self.bucket(TOTAL_LABEL)
    }

    /// Terminal rendering: ties green, losses red, wins yellow.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        let mut titles = vec![Cell::new(PATH_FIELD), Cell::new(BEST_KNOWN_FIELD)];
        for result_set in &self.result_sets {
            titles.push(Cell::new(&result_set.value_column()));
            titles.push(Cell::new(&result_set.gap_column()));
        }
        table.set_titles(Row::new(titles));
        for row in &self.rows {
            let mut cells = vec![
                Cell::new(row.label()),
                Cell::new(&row.best_known_value.to_string()),
            ];
            for (entry, verdict) in row.entries.iter().zip(row.verdicts()) {
                cells.push(
                    Cell::new(&entry.value().to_string())
                        .style_spec(verdict.style_spec()),
                );
                cells.push(Cell::new(&format!("{:.2}", entry.gap)));
            }
            table.add_row(Row::new(cells));
        }
        table
    }
}

fn bucket_index(bins: &SizeBins, row: &BenchmarkRow) -> Result<usize, AggregateError> {
    row.number_of_jobs
        .zip(row.number_of_machines)
        .and_then(|(jobs, machines)| bins.index(jobs, machines))
        .ok_or_else(|| AggregateError::UnbinnedRow {
            path: row.path.clone(),
            jobs: row.number_of_jobs,
            machines: row.number_of_machines,
        })
}

/// Builds the comparative report of `result_sets` over `rows`.
///
/// Every row goes to the total and, when `bins` is given, to exactly one size bucket.
pub fn aggregate(
    rows: &[BenchmarkRow],
    result_sets: &[ResultSet],
    bins: Option<&SizeBins>,
) -> Result<Report, AggregateError> {
    let num_result_sets = result_sets.len();
    let mut buckets = bins
        .map(|bins| {
            bins.labels()
                .iter()
                .map(|label| Bucket::new(label, num_result_sets))
                .collect_vec()
        })
        .unwrap_or_default();
    let mut total = Bucket::new(TOTAL_LABEL, num_result_sets);

    let mut report_rows = Vec::with_capacity(rows.len() + buckets.len() + 1);
    for row in rows {
        let entries = result_sets
            .iter()
            .map(|result_set| {
                let output = result_set.read(row);
                Entry {
                    measure: Measure::Result(output),
                    gap: gap(output.value(), row.best_known_value),
                }
            })
            .collect_vec();
        debug!("{}: {:?}", row.path, entries);
        if let Some(bins) = bins {
            buckets[bucket_index(bins, row)?].add(row.best_known_value, &entries);
        }
        total.add(row.best_known_value, &entries);
        report_rows.push(ReportRow {
            kind: RowKind::Instance(row.clone()),
            best_known_value: row.best_known_value,
            entries,
        });
    }
    report_rows.extend(
        buckets
            .into_iter()
            .chain(iter::once(total))
            .map(Bucket::into_row),
    );
    Ok(Report {
        result_sets: result_sets.to_vec(),
        rows: report_rows,
    })
}
