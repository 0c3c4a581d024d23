use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use log::error;

use shop_bench::benchmarks;
use shop_bench::invoker::{DryRunInvoker, ProcessInvoker};
use shop_bench::orchestrator::{self, RunParameters};

#[derive(Parser)]
#[command(author, version, about = "Run the solver on every instance of a benchmark")]
struct Args {
    /// Benchmark to run
    benchmark: String,
    /// Algorithm passed to the solver
    algorithm: String,
    /// Benchmark results directory
    #[arg(long, default_value = "benchmark_results")]
    directory: PathBuf,
    /// Name of the run directory, defaults to a timestamp
    #[arg(long)]
    name: Option<String>,
    /// Extra solver options
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    options: String,
    /// Solver executable
    #[arg(long, default_value = "install/bin/shopschedulingsolver")]
    solver: PathBuf,
    /// Directory holding the benchmark tables
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
    /// Json description of the benchmark, instead of a built-in one
    #[arg(long)]
    benchmark_config: Option<PathBuf>,
    /// Only print the solver calls
    #[arg(long)]
    dry_run: bool,
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
    let instances_dir = fs::canonicalize(benchmark.instances_dir())
        .with_context(|| format!("cannot resolve {:?}", benchmark.instances_dir()))?;
    let params = RunParameters {
        solver: args.solver,
        algorithm: args.algorithm.clone(),
        options: args.options,
        instances_dir,
        output_dir: orchestrator::output_directory(
            &args.directory,
            &args.benchmark,
            &args.algorithm,
            args.name.as_deref(),
            chrono::Local::now(),
        ),
    };
    if args.dry_run {
        orchestrator::run_benchmark(&rows, &params, &mut DryRunInvoker::default())?;
    } else {
        orchestrator::run_benchmark(&rows, &params, &mut ProcessInvoker)?;
    }
    println!("{}", params.output_dir.display());
    Ok(())
}
