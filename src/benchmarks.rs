use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::csv_parser;
use crate::datastructures::*;

/// A named selection of benchmark rows and how to sub-total them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Benchmark {
    pub name: String,
    /// Benchmark table; row paths are relative to its directory.
    pub table: PathBuf,
    /// Keep only rows whose `Dataset` column equals this.
    #[serde(default)]
    pub dataset: Option<String>,
    #[serde(default)]
    pub bins: Option<SizeBins>,
}

impl Benchmark {
    /// The benchmarks shipped with the data directory.
    pub fn builtin(name: &str, data_dir: &Path) -> Option<Benchmark> {
        let benchmark = |table: &str, dataset: Option<&str>, bins: Option<SizeBins>| {
            Some(Benchmark {
                name: name.to_string(),
                table: data_dir.join(table),
                dataset: dataset.map(str::to_string),
                bins,
            })
        };
        match name {
            "pfss_makespan" => benchmark("data_pfss_makespan.csv", None, None),
            "pfss_makespan_vallada2015_small" => benchmark(
                "data_pfss_makespan.csv",
                Some("vallada2015_small"),
                Some(SizeBins {
                    jobs: vec![10, 20, 30, 40, 50, 60],
                    machines: vec![5, 10, 15, 20],
                }),
            ),
            "pfss_makespan_vallada2015_large" => benchmark(
                "data_pfss_makespan.csv",
                Some("vallada2015_large"),
                Some(SizeBins {
                    jobs: vec![100, 200, 300, 400, 500, 600, 700, 800],
                    machines: vec![20, 40, 60],
                }),
            ),
            "pfss_tct" => benchmark("data_pfss_tct.csv", None, None),
            "pfss_tt" => benchmark("data_pfss_tt.csv", None, None),
            _ => None,
        }
    }

    pub fn from_json(path: &Path) -> Result<Benchmark> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("cannot read benchmark config {path:?}"))?;
        Ok(serde_json::from_str(&config_str)?)
    }

    /// Directory the row paths are relative to.
    pub fn instances_dir(&self) -> PathBuf {
        self.table
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Rows of the table belonging to this benchmark, in table order.
    pub fn load_rows(&self) -> Result<Vec<BenchmarkRow>> {
        let rows = csv_parser::read_benchmark_rows(&self.table)?;
        let rows: Vec<BenchmarkRow> = match &self.dataset {
            Some(dataset) => rows
                .into_iter()
                .filter(|row| row.dataset.as_deref() == Some(dataset.as_str()))
                .collect(),
            None => rows,
        };
        info!("{}: {} rows from {:?}", self.name, rows.len(), self.table);
        Ok(rows)
    }
}

/// Looks up `name` in the catalog, or reads it from `config` when given.
pub fn resolve(name: &str, config: Option<&Path>, data_dir: &Path) -> Result<Benchmark> {
    match config {
        Some(path) => Benchmark::from_json(path),
        None => Benchmark::builtin(name, data_dir)
            .with_context(|| format!("unknown benchmark \"{name}\"")),
    }
}
