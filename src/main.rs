use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hoyowiki_ingest::{
    config::Config,
    data_mapping::RecordMapper,
    ingestor::{
        BatchPipeline, ExecutionMode, IngestionStateManager, PipelineOptions,
        validate_pipeline_outcome,
    },
    models::Entry,
    output::{JsonFileSink, OutputSink},
    sources::HoyoWikiClient,
};

#[derive(Parser)]
#[command(name = "hoyowiki-ingest")]
#[command(version)]
#[command(about = "Ingest wiki agent pages into validated, typed records")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON file holding the entry list
    #[arg(short, long, value_name = "FILE", required_unless_present = "print_default_config")]
    entries: Option<PathBuf>,

    /// Output file (overrides config file)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Process entries of a batch concurrently
    #[arg(long)]
    concurrent: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_default_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", Config::default_toml()?);
        return Ok(());
    }

    let log_filter = format!("hoyowiki_ingest={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting hoyowiki-ingest v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(cli.config.as_deref())?;
    match &cli.config {
        Some(path) => info!("Configuration loaded from: {}", path.display()),
        None => info!("No configuration file given, using defaults and environment"),
    }

    // Override config with CLI arguments
    if let Some(output) = cli.output {
        config.output.path = output;
    }
    if cli.concurrent {
        config.pipeline.execution = ExecutionMode::Concurrent;
    }

    let entries_path = cli.entries.context("--entries is required")?;
    let entries = read_entries(&entries_path).await?;
    if entries.is_empty() {
        bail!("Entry list {} is empty", entries_path.display());
    }
    info!("Loaded {} entries from {}", entries.len(), entries_path.display());

    let client = HoyoWikiClient::new(&config.client)?;
    info!("Content client targeting {}", config.client.base_url);

    let mapper = RecordMapper::with_requirements(config.pipeline.field_requirements())
        .with_span(info_span!("mapper"));

    let state_manager = IngestionStateManager::new();
    let mut progress = state_manager.subscribe();
    tokio::spawn(async move {
        while let Ok(update) = progress.recv().await {
            debug!(
                "Progress {}/{} ({:.1}%) current={:?}",
                update.processed, update.total, update.percentage, update.current_entry
            );
        }
    });

    let pipeline = BatchPipeline::new(Arc::new(client), mapper)
        .with_state_manager(state_manager)
        .with_span(info_span!("ingest", entries = entries.len()));

    let cancellation = pipeline.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling remaining entries");
            cancellation.cancel();
        }
    });

    let options = PipelineOptions::from(&config.pipeline);
    let result = pipeline.run(&entries, &options).await?;

    let sink = JsonFileSink::from(&config.output);
    sink.write(&result.successful).await?;

    let stats = &result.statistics;
    info!(
        "Ingestion finished: {} successful ({} degraded), {} failed, {} retries, {:.1}% success in {}ms",
        stats.successful,
        stats.degraded,
        stats.failed,
        stats.retries,
        stats.success_rate * 100.0,
        stats.processing_time_ms
    );
    for failure in &result.failed {
        error!(
            "Entry '{}' failed at {} after {} attempt(s): {}",
            failure.entry_id, failure.stage, failure.attempts, failure.error
        );
    }

    validate_pipeline_outcome(&result, options.min_success_rate)?;
    Ok(())
}

async fn read_entries(path: &std::path::Path) -> Result<Vec<Entry>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read entry list {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse entry list {}", path.display()))
}
