use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use log::{error, info};

use shop_bench::{aggregator, benchmarks, csv_parser};

#[derive(Parser)]
#[command(author, version, about = "Compare benchmark runs against best known values")]
struct Args {
    /// Benchmark to process
    benchmark: String,
    /// Benchmark results directory
    #[arg(long, default_value = "benchmark_results")]
    directory: PathBuf,
    /// Run directories to compare, defaults to every run of the benchmark
    #[arg(long, num_args = 1..)]
    runs: Vec<PathBuf>,
    /// Write the report as csv
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Directory holding the benchmark tables
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
    /// Json description of the benchmark, instead of a built-in one
    #[arg(long)]
    benchmark_config: Option<PathBuf>,
    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbosity.log_level_filter())
        .init();
    let benchmark = match benchmarks::resolve(
        &args.benchmark,
        args.benchmark_config.as_deref(),
        &args.data_dir,
    ) {
        Ok(benchmark) => benchmark,
        Err(e) => {
            error!("{e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    let rows = benchmark.load_rows()?;
    let run_dirs = if args.runs.is_empty() {
        aggregator::list_run_directories(&args.directory.join(&args.benchmark))?
    } else {
        args.runs
    };
    info!("Comparing {} runs", run_dirs.len());
    let result_sets = aggregator::result_sets(&rows, &run_dirs);
    let report = aggregator::aggregate(&rows, &result_sets, benchmark.bins.as_ref())?;
    report.to_table().printstd();
    if let Some(output) = &args.output {
        csv_parser::write_report_csv(&report, output)?;
        info!("Report written to {output:?}");
    }
    Ok(())
}
