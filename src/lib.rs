//! Benchmark driver for an external shop scheduling solver.
//!
//! The crate covers the three phases of a benchmark campaign, each exposed as a binary:
//!
//! * `generate_instances` enumerates a space of shop configurations, calls the external
//!   instance generator once per configuration and writes one manifest per
//!   (shop type, objective, property) group.
//! * `run_benchmarks` runs the external solver once per row of a benchmark table and
//!   stores the json output and the solution certificate in a run directory.
//! * `process_benchmarks` compares one or more run directories against the best known
//!   values of the table and prints and stores the comparison with per-row gaps and
//!   sub-totals.
//!
//! Every external call is blocking and the first failing call aborts the whole phase.
//! Results that cannot be read while processing are reported as
//! [`datastructures::SENTINEL_VALUE`].
//!
//! Example
//! ```rust,no_run
//! use shop_bench::{aggregator, benchmarks::Benchmark};
//! # use std::path::{Path, PathBuf};
//! # use anyhow::Result;
//!
//! fn example() -> Result<()> {
//!     let benchmark = Benchmark::builtin("pfss_tct", Path::new("data")).unwrap();
//!     let rows = benchmark.load_rows()?;
//!     let runs = [PathBuf::from("benchmark_results/pfss_tct/baseline")];
//!     let result_sets = aggregator::result_sets(&rows, &runs);
//!     let report = aggregator::aggregate(&rows, &result_sets, benchmark.bins.as_ref())?;
//!     report.to_table().printstd();
//!     Ok(())
//! }
//! ```

/// Comparison of run results against best known values.
pub mod aggregator;

/// Catalog of named benchmarks.
pub mod benchmarks;

/// Parsing of benchmark tables and csv export of reports.
pub mod csv_parser;

/// Data structures shared by all phases.
#[warn(missing_docs)]
pub mod datastructures;

/// Enumeration of the instance generation space.
#[warn(missing_docs)]
pub mod enumerator;

/// Synchronous execution of external tools.
#[warn(missing_docs)]
pub mod invoker;

/// Instance suite generation and manifest bookkeeping.
pub mod manifest;

/// Solver runs over a benchmark table.
pub mod orchestrator;
