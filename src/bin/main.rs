//! rgram Command Line Interface
//!
//! Precomputes the linear and RBF Gram matrices of a feature file and
//! stores their upper triangles in a container keyed by the data
//! fingerprint.

use clap::Parser;
use env_logger::Env;
use log::{error, info};
use rgram::api::GramPrecompute;
use rgram::core::{GramError, Result, SweepConfig};
use rgram::data::{load_matrix, DEFAULT_DATASET};
use rgram::store::{open_store, DEFAULT_OUTPUT};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "rgram")]
#[command(about = "Precompute kernel Gram matrices over a log-spaced RBF sweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "rgram contributors")]
struct Cli {
    /// Feature file (`.h5`/`.hdf5` dataset, or CSV)
    input: Option<PathBuf>,

    /// Exponent increment of the gamma sweep
    #[arg(allow_negative_numbers = true)]
    step: Option<String>,

    /// Output container
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Dataset name inside HDF5 input files
    #[arg(long, default_value = DEFAULT_DATASET)]
    dataset: String,

    /// First exponent of the sweep
    #[arg(long, default_value = "-25", allow_negative_numbers = true)]
    start: f64,

    /// Last exponent of the sweep
    #[arg(long, default_value = "5", allow_negative_numbers = true)]
    stop: f64,

    /// Base raised to each exponent
    #[arg(long, default_value = "2")]
    base: f64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let (input, step) = match (&cli.input, &cli.step) {
        (Some(input), Some(step)) => (input.clone(), step.clone()),
        _ => {
            print_usage();
            return;
        }
    };

    if let Err(e) = precompute_command(&cli, &input, &step) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn print_usage() {
    let program = std::env::args()
        .next()
        .unwrap_or_else(|| "rgram".to_string());
    println!("Usage: {program} <input-file> <step>");
    println!("  Run with --help for all options");
}

fn parse_step(step: &str) -> Result<f64> {
    step.trim()
        .parse::<f64>()
        .map_err(|_| GramError::ParseError(format!("Invalid step: {step:?}")))
}

fn precompute_command(cli: &Cli, input: &Path, step: &str) -> Result<()> {
    let config = SweepConfig {
        start: cli.start,
        stop: cli.stop,
        step: parse_step(step)?,
        base: cli.base,
    };
    info!(
        "Sweep: {}^[{}, {}] step {}",
        config.base, config.start, config.stop, config.step
    );

    // Fail on a bad sweep before creating the output file
    let precompute = GramPrecompute::new().with_config(config);
    precompute.config().gammas()?;

    let x = load_matrix(input, &cli.dataset)?;

    info!("Writing to {:?}", cli.output);
    let mut store = open_store(&cli.output, true)?;
    let summary = precompute.run_with(&x, store.as_mut(), |key| println!("key: {key}"))?;

    info!(
        "Stored {} matrices under {}",
        summary.keys.len(),
        summary.fingerprint
    );
    Ok(())
}
