//! Common types and utilities shared across CLI commands.

use std::sync::Arc;

use bathyquery::config::ConfigFile;
use bathyquery::coord::Coordinate;
use bathyquery::logging::{init_logging, LoggingGuard};
use bathyquery::provider::{ArcGisDepthSource, ProviderSettings, ReqwestClient};
use bathyquery::scheduler::{BatchScheduler, ResolutionResult, SchedulerConfig};
use bathyquery::telemetry::TelemetrySnapshot;
use clap::{Args, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::CliError;

/// Result output format.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned text table
    #[default]
    Table,
    /// JSON array of results
    Json,
    /// Comma-separated values with a header row
    Csv,
}

/// Flags shared by every command that runs a resolution.
#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Query endpoint URL (overrides service.endpoint)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Coordinates dequeued per batch (overrides scheduler.batch_size)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Maximum requests in flight (overrides scheduler.concurrency)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Request ceiling per minute (overrides scheduler.rate_limit)
    #[arg(long)]
    pub rate_limit: Option<u32>,

    /// Layers tried per coordinate (overrides scheduler.max_attempts)
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub provider: ProviderSettings,
    pub scheduler: SchedulerConfig,
    pub format: OutputFormat,
}

/// Resolve run settings: CLI > config file > defaults.
///
/// The merged scheduler settings are validated here, so a bad flag is
/// reported as a configuration error before any request is made.
pub fn resolve_settings(args: &RunArgs, config: &ConfigFile) -> Result<RunSettings, CliError> {
    let mut provider = config.service.clone();
    if let Some(ref endpoint) = args.endpoint {
        provider.endpoint = endpoint.clone();
    }

    let mut scheduler = config.scheduler.clone();
    if let Some(batch_size) = args.batch_size {
        scheduler.batch_size = batch_size;
    }
    if let Some(concurrency) = args.concurrency {
        scheduler.concurrency = concurrency;
    }
    if let Some(rate_limit) = args.rate_limit {
        scheduler.rate_limit_per_minute = rate_limit;
    }
    if let Some(max_attempts) = args.max_attempts {
        scheduler.max_attempts = max_attempts;
    }

    scheduler
        .validate()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(RunSettings {
        provider,
        scheduler,
        format: args.format,
    })
}

/// Install logging from the config file, raised to debug with `--verbose`.
pub fn start_logging(config: &ConfigFile, verbose: bool) -> Result<LoggingGuard, CliError> {
    let mut logging = config.logging.clone();
    if verbose {
        logging.level = "debug".to_string();
    }
    Ok(init_logging(&logging)?)
}

/// Resolve coordinates against the configured service.
///
/// Shows a progress bar on stderr and cancels cleanly on Ctrl+C. Results
/// are returned in input order.
pub fn run_resolution(
    coords: Vec<Coordinate>,
    settings: &RunSettings,
) -> Result<(Vec<ResolutionResult>, TelemetrySnapshot), CliError> {
    let client = ReqwestClient::with_timeout(settings.provider.timeout_secs)
        .map_err(|e| CliError::Query(e.to_string()))?;
    let source = ArcGisDepthSource::new(client, settings.provider.clone());
    info!(
        coordinates = coords.len(),
        endpoint = %settings.provider.endpoint,
        "Resolving coordinates"
    );

    let progress = ProgressBar::new(coords.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let tick = progress.clone();

    let scheduler = BatchScheduler::new(source, settings.scheduler.clone())?.with_progress(
        Arc::new(move |result: &ResolutionResult| {
            tick.set_message(result.coord.to_string());
            tick.inc(1);
        }),
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Received interrupt, stopping after the current batch...");
        on_interrupt.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Query(format!("failed to start runtime: {}", e)))?;

    let outcome = runtime.block_on(scheduler.resolve_with_cancellation(coords, cancel));
    progress.finish_and_clear();

    let mut results = outcome?;
    results.sort_by_key(|r| r.index);
    Ok((results, scheduler.metrics().snapshot()))
}

/// Print the one-line run summary to stderr.
pub fn print_summary(snapshot: &TelemetrySnapshot) {
    eprintln!("{} {}", style("Done:").green().bold(), snapshot);
}
