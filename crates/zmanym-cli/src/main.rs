//! zmanym - Shabbat, holiday and daily zmanim times from the terminal.
//!
//! Weekly and daily data is cached locally, so repeated lookups for the same
//! place work offline until the cache expires.

mod cli;
mod commands;
mod render;

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use zmanym_core::{
    CacheManager, Config, FileStore, HebcalClient, LocationPreferences, ZmanymClient, ZmanymError,
};

use cli::{CacheAction, Cli, Command, LocationAction};
use commands::App;

/// Directory for daily rolling log files. Unset means stderr only.
const ENV_LOG_DIR: &str = "ZMANYM_LOG_DIR";

const LOG_FILE_PREFIX: &str = "zmanym.log";

/// Initialize the tracing subscriber for logging.
///
/// The returned guard flushes the file writer on drop and must be kept alive
/// for the duration of the program.
fn init_tracing(debug: bool) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let (file_layer, guard) = match std::env::var_os(ENV_LOG_DIR) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.debug);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            if let Some(err) = e.downcast_ref::<ZmanymError>() {
                eprintln!("{}", err.user_message());
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let cache_dir = config.cache_dir()?;
    info!(cache_dir = %cache_dir.display(), "zmanym starting");

    let store = Arc::new(
        FileStore::new(cache_dir.clone())
            .with_context(|| format!("Failed to open cache directory {}", cache_dir.display()))?,
    );
    let gateway = Arc::new(HebcalClient::from_config(&config).context("Failed to build HTTP client")?);
    let cache = CacheManager::new(store.clone());
    let client = ZmanymClient::new(gateway, cache, config.region());
    let app = App::new(client, LocationPreferences::new(store), cli.json);

    match cli.command {
        Command::Search { query } => app.search(&query).await,
        Command::Shabbat { id, name, zip } => app.shabbat(id, name, zip).await,
        Command::Daily { id, zip, date } => app.daily(id, zip, date).await,
        Command::Locate {
            latitude,
            longitude,
            save,
        } => app.locate(latitude, longitude, save).await,
        Command::Location { action } => match action {
            LocationAction::Show => app.show_location().await,
            LocationAction::Clear => app.clear_location().await,
            LocationAction::Set { query } => app.set_location(&query).await,
        },
        Command::Cache { action } => match action {
            CacheAction::Info => app.cache_info().await,
            CacheAction::Clear => app.clear_cache().await,
            CacheAction::Prune => app.prune_cache().await,
        },
    }
}
