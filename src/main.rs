use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use booking_normalizer::config::Config;
use booking_normalizer::constants::CLEANED_PREFIX;
use booking_normalizer::logging;
use booking_normalizer::metrics;
use booking_normalizer::pipeline::anonymize::Anonymizer;
use booking_normalizer::pipeline::ingest::{self, RunReport};
use booking_normalizer::pipeline::{merge_files, RecordPipeline, Table};

#[derive(Parser)]
#[command(name = "booking-normalizer")]
#[command(about = "Normalize and merge escape-room booking sheets")]
#[command(version = "0.1.0")]
struct Cli {
    /// Config file (defaults to $BOOKING_CONFIG, then booking.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize every raw file of one venue
    Normalize {
        /// Venue profile name. See `venues`
        #[arg(long)]
        venue: String,
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Process files concurrently
        #[arg(long)]
        parallel: bool,
    },
    /// Concatenate normalized files into one table
    Merge {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Normalize one venue, then merge its outputs
    Run {
        #[arg(long)]
        venue: String,
        #[arg(long)]
        parallel: bool,
    },
    /// Pseudonymize a merged table
    Anonymize {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Seed for reproducible pseudonyms
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List the available venue profiles
    Venues,
}

async fn normalize(
    pipeline: Arc<RecordPipeline>,
    config: &Config,
    input: &Path,
    output: &Path,
    parallel: bool,
) -> anyhow::Result<RunReport> {
    let files = ingest::discover(input, &config.file_prefix, &config.file_suffix)
        .with_context(|| format!("listing {}", input.display()))?;
    if files.is_empty() {
        warn!(dir = %input.display(), "no input files found");
    }

    let report = if parallel {
        ingest::process_all_parallel(files, output.to_path_buf(), pipeline).await
    } else {
        ingest::process_all(&files, output, &pipeline)
    };

    eprintln!(
        "📊 {}: {} files, {} failed",
        report.venue,
        report.files.len(),
        report.failed()
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(report)
}

fn merge(inputs: &[PathBuf], output: &Path) -> anyhow::Result<()> {
    let rows = merge_files(inputs, output).with_context(|| format!("merging into {}", output.display()))?;
    eprintln!("🔗 merged {} files, {} rows -> {}", inputs.len(), rows, output.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    logging::init_logging(&config.log_dir);
    metrics::init_metrics();

    match cli.command {
        Commands::Normalize {
            venue,
            input,
            output,
            parallel,
        } => {
            let pipeline = config.registry()?.get(&venue)?;
            let input = input.unwrap_or_else(|| config.input_dir.clone());
            let output = output.unwrap_or_else(|| config.output_dir.clone());
            normalize(pipeline, &config, &input, &output, parallel).await?;
        }
        Commands::Merge { input, output } => {
            let input = input.unwrap_or_else(|| config.output_dir.clone());
            let output = output.unwrap_or_else(|| config.merged_file.clone());
            let files = ingest::discover(&input, CLEANED_PREFIX, &config.file_suffix)?;
            merge(&files, &output)?;
        }
        Commands::Run { venue, parallel } => {
            let pipeline = config.registry()?.get(&venue)?;
            let report = normalize(pipeline, &config, &config.input_dir, &config.output_dir, parallel).await?;
            merge(&report.output_files(), &config.merged_file)?;
        }
        Commands::Anonymize { input, output, seed } => {
            let table = Table::read_csv(&input).with_context(|| format!("reading {}", input.display()))?;
            let mut anonymizer = match seed {
                Some(seed) => Anonymizer::with_seed(config.anonymize.clone(), seed),
                None => Anonymizer::new(config.anonymize.clone()),
            };
            let anonymized = anonymizer.apply(table)?;
            anonymized.write_csv(&output)?;
            info!(rows = anonymized.rows.len(), output = %output.display(), "anonymized table written");
        }
        Commands::Venues => {
            for name in config.registry()?.list_venues() {
                println!("{}", name);
            }
        }
    }

    if let Some(path) = &config.metrics_file {
        metrics::write_snapshot(path)?;
    }
    Ok(())
}
