//! BestStories CLI
//!
//! Local entry point: one-shot queries, a long-running watch loop and
//! configuration checks.

use std::path::{Path, PathBuf};
use std::time::Duration;

use beststories::{
    Engine,
    error::{AppError, Result},
    models::Config,
    services::TopItems,
};
use clap::{Parser, Subcommand};

/// BestStories - ranked Hacker News best stories
#[derive(Parser, Debug)]
#[command(
    name = "beststories",
    version,
    about = "Continuously refreshed, score-ranked Hacker News best stories"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "beststories.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines (requires the `json-log` feature)
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Refresh once and print the top stories
    Top {
        /// Number of stories to print
        #[arg(short = 'n', long, default_value_t = 10, allow_negative_numbers = true)]
        count: i64,
    },

    /// Run the refresh cycles and print the top stories until Ctrl-C
    Watch {
        /// Number of stories to print
        #[arg(short = 'n', long, default_value_t = 10, allow_negative_numbers = true)]
        count: i64,

        /// Seconds between prints
        #[arg(long, default_value_t = 30)]
        every: u64,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on flags and the configured level.
fn init_logging(level: &str, verbose: bool, json: bool) {
    let level = if verbose { "debug" } else { level };
    if json && init_json_logging(level) {
        return;
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    if json {
        log::warn!("--json-logs needs the `json-log` feature; using plain logs");
    }
}

#[cfg(feature = "json-log")]
fn init_json_logging(level: &str) -> bool {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
    tracing::info!("JSON logging enabled");
    true
}

#[cfg(not(feature = "json-log"))]
fn init_json_logging(_level: &str) -> bool {
    false
}

fn print_top(top: &TopItems) -> Result<()> {
    match top {
        TopItems::NotReady => println!("{}", TopItems::NOT_READY_MESSAGE),
        TopItems::Ready(items) => println!("{}", serde_json::to_string_pretty(items)?),
    }
    Ok(())
}

/// Read the config file, keeping any load error for reporting once logging
/// is up. Falls back to defaults on failure.
fn load_config(path: &Path) -> (Config, Option<AppError>) {
    match Config::load(path) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    }
}

/// The `validate` command: a file that fails to load is an error, not a
/// silent fallback to defaults.
fn validate(path: &Path, config: &Config, load_error: Option<AppError>) -> Result<()> {
    log::info!("Validating {}...", path.display());

    if let Some(e) = load_error {
        log::error!("Config load failed from {}: {}", path.display(), e);
        return Err(e);
    }
    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }
    log::info!(
        "✓ Config OK: refresh every {:?}, full refresh every {:?}, TTL {} min",
        config.caching.refresh_interval(),
        config.caching.full_refresh_interval(),
        config.caching.snapshot_ttl().num_minutes()
    );
    Ok(())
}

/// Run the background cycles and print the top items every `every` until
/// `shutdown` resolves.
async fn watch<F: Future>(
    engine: &mut Engine,
    count: i64,
    every: Duration,
    shutdown: F,
) -> Result<()> {
    engine.start();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                log::info!("Interrupted, shutting down...");
                break;
            }
            _ = tokio::time::sleep(every) => {
                if let Some(status) = engine.status() {
                    log::info!(
                        "Snapshot: {} items fetched at {}{}",
                        status.item_count,
                        status.fetched_at,
                        if status.stale { " (stale)" } else { "" }
                    );
                }
                print_top(&engine.top(count))?;
            }
        }
    }

    engine.stop().await;
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, load_error) = load_config(&cli.config);
    let level = std::env::var("BESTSTORIES_LOG_LEVEL")
        .unwrap_or_else(|_| config.logging.level.clone());
    init_logging(&level, cli.verbose, cli.json_logs);
    config.apply_env_overrides();

    if !matches!(cli.command, Command::Validate) {
        if let Some(e) = &load_error {
            log::warn!(
                "Config load failed from {}: {}. Using defaults.",
                cli.config.display(),
                e
            );
        }
    }

    match cli.command {
        Command::Top { count } => {
            let engine = Engine::from_config(&config)?;
            let report = engine.refresh_now().await?;
            log::info!(
                "Fetched {}/{} stories in {:?}",
                report.fetched,
                report.requested,
                report.elapsed
            );
            print_top(&engine.top(count))?;
        }

        Command::Watch { count, every } => {
            let mut engine = Engine::from_config(&config)?;
            let every = Duration::from_secs(every.max(1));
            watch(&mut engine, count, every, tokio::signal::ctrl_c()).await?;
        }

        Command::Validate => validate(&cli.config, &config, load_error)?,
    }

    Ok(())
}
