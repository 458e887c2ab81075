use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use batna::archive::Archiver;
use batna::batch::{BatnaEstimator, PrecomputedEstimator};
use batna::engine::{run_negotiation, value_analysis, SessionOptions};
use batna::models::{
    BidRecord, NegotiationMeta, NegotiationParameters, SimConfig, ValueAnalysisReport,
};

const DEFAULT_CONFIG: &str = "config/batna.toml";

#[derive(Parser, Debug)]
#[command(name = "batna", about = "BATNA negotiation simulator")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Pretty-print the output JSON
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one negotiation from NegotiationParameters JSON
    Negotiate {
        /// Read parameters from a file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Override the random seed in the parameters
        #[arg(long)]
        seed: Option<u32>,
    },
    /// Run a baseline batch and archive it
    Batch(BatchArgs),
    /// Compare baseline, oracle and optional precomputed estimates on one scenario set
    Compare {
        #[command(flatten)]
        batch: BatchArgs,

        /// JSON array of precomputed estimates keyed by scenario index
        #[arg(long)]
        precomputed: Option<PathBuf>,

        /// Name reported for the precomputed strategy
        #[arg(long, default_value = "precomputed")]
        precomputed_name: String,
    },
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Number of negotiations
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum concurrent sessions
    #[arg(long)]
    parallelism: Option<usize>,

    /// Output directory
    #[arg(short, long)]
    output: Option<String>,

    /// Skip the per-session JSON bundles
    #[arg(long)]
    no_bundles: bool,
}

impl BatchArgs {
    fn apply(&self, config: &mut SimConfig) {
        if let Some(count) = self.count {
            config.batch.count = count;
        }
        if self.seed.is_some() {
            config.batch.seed = self.seed;
        }
        if let Some(parallelism) = self.parallelism {
            config.batch.parallelism = parallelism;
        }
        if let Some(output) = &self.output {
            config.output.dir = output.clone();
        }
        if self.no_bundles {
            config.output.write_bundles = false;
        }
    }
}

#[derive(Serialize)]
struct NegotiationReport<'a> {
    meta: &'a NegotiationMeta,
    rounds: &'a [BidRecord],
    value_analysis: ValueAnalysisReport,
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{output}");
    Ok(())
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input: {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let default_path = cli.config.as_path() == Path::new(DEFAULT_CONFIG);
    let mut config = batna::load_config(&cli.config, default_path)?;

    match cli.command {
        Command::Negotiate { input, seed } => {
            let json = read_input(input.as_deref())?;
            let mut params: NegotiationParameters = serde_json::from_str(&json)
                .context("Failed to parse NegotiationParameters JSON")?;
            if seed.is_some() {
                params.random_seed = seed;
            }

            let completed = run_negotiation(&params, SessionOptions::default())
                .context("Negotiation failed")?;
            let report = NegotiationReport {
                meta: &completed.meta,
                rounds: &completed.rounds,
                value_analysis: value_analysis(&completed.meta),
            };
            print_json(&report, cli.pretty)?;
        }
        Command::Batch(args) => {
            args.apply(&mut config);
            let (run, summary) = batna::run_batch(&config)
                .await
                .context("Batch run failed")?;

            let archiver = Archiver::new(&config.output.dir, config.output.write_bundles);
            archiver
                .write_run(&run, &summary)
                .with_context(|| format!("Failed to archive to {}", config.output.dir))?;

            print_json(&summary, cli.pretty)?;
        }
        Command::Compare {
            batch,
            precomputed,
            precomputed_name,
        } => {
            batch.apply(&mut config);

            let mut extra: Vec<Arc<dyn BatnaEstimator>> = Vec::new();
            if let Some(path) = precomputed {
                let estimator = PrecomputedEstimator::from_path(&precomputed_name, &path)
                    .with_context(|| format!("Failed to load estimates: {}", path.display()))?;
                extra.push(Arc::new(estimator));
            }

            let (comparison, runs) = batna::run_comparison(&config, extra)
                .await
                .context("Comparison failed")?;

            let archiver = Archiver::new(&config.output.dir, config.output.write_bundles);
            archiver
                .write_comparison(&comparison, &runs)
                .with_context(|| format!("Failed to archive to {}", config.output.dir))?;

            print_json(&comparison, cli.pretty)?;
        }
    }

    Ok(())
}
