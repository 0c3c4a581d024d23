use std::{fs, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use log::{error, info};
use serde::{Deserialize, Serialize};

use shop_bench::enumerator::ConfigurationSpace;
use shop_bench::invoker::{DryRunInvoker, ProcessInvoker};
use shop_bench::manifest;

#[derive(Parser)]
#[command(author, version, about = "Generate the test instance suite and its manifests")]
struct Args {
    /// Path to a json config
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Instance generator executable
    #[arg(short, long)]
    generator: Option<PathBuf>,
    /// Directory receiving instances and manifests
    #[arg(short, long)]
    data_dir: Option<PathBuf>,
    /// Only print the generator calls
    #[arg(long)]
    dry_run: bool,
    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct Config {
    #[serde(default = "default_generator")]
    generator: PathBuf,
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,
    #[serde(default)]
    space: ConfigurationSpace,
}

fn default_generator() -> PathBuf {
    ["install", "bin", "shopschedulingsolver_generator"].iter().collect()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Config {
    fn from_cli(args: &Args) -> Result<Config> {
        let mut config: Config = match &args.config {
            Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
            None => serde_json::from_str("{}")?,
        };
        if let Some(generator) = &args.generator {
            config.generator = generator.to_path_buf();
        }
        if let Some(data_dir) = &args.data_dir {
            config.data_dir = data_dir.to_path_buf();
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbosity.log_level_filter())
        .init();
    let config = match Config::from_cli(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    let count = if args.dry_run {
        let mut invoker = DryRunInvoker::default();
        manifest::generate_suite(
            &config.space,
            &config.generator,
            &config.data_dir,
            &mut invoker,
        )?
    } else {
        manifest::generate_suite(
            &config.space,
            &config.generator,
            &config.data_dir,
            &mut ProcessInvoker,
        )?
    };
    info!("Done: {count} instances");
    Ok(())
}
