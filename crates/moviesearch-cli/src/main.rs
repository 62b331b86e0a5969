//! moviesearch - TMDB movie search CLI.

/// Application configuration (TOML).
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::sync::oneshot;
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{API_KEY_ENV, AppConfig, mask_api_key, resolve_config_path};
use moviesearch_api::tmdb::{POSTER_SIZE_W500, SearchClient};

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Search movies on TMDB.
    Search(SearchArgs),
    /// Manage the config file.
    Config(ConfigCommand),
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Search query (e.g. "Arrival").
    #[arg(long, required = true)]
    query: String,
    /// Print poster image URLs.
    #[arg(long)]
    posters: bool,
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Store the TMDB API key in the config file.
    SetApiKey(SetApiKeyArgs),
    /// Show the effective configuration.
    Show,
}

/// Arguments for the `config set-api-key` subcommand.
#[derive(clap::Args)]
struct SetApiKeyArgs {
    /// TMDB v3 API key.
    key: String,
}

/// Builds a `SearchClient` from config, with `TMDB_API_KEY` taking precedence.
///
/// # Errors
///
/// Returns an error if no API key is configured or the client fails to build.
#[instrument(skip_all)]
fn build_search_client(config: &AppConfig) -> Result<SearchClient> {
    let Some(api_key) = config.resolve_api_key(std::env::var(API_KEY_ENV).ok()) else {
        bail!(
            "TMDB API key is not configured: set {API_KEY_ENV} or run `moviesearch config set-api-key`"
        );
    };

    let mut builder = SearchClient::builder().api_key(api_key).user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(ref base_url) = config.tmdb.base_url {
        builder = builder.base_url(base_url.as_str());
    }

    builder.build().context("failed to build TMDB client")
}

/// Loads the config file for `dir`.
fn load_config(dir: Option<&PathBuf>) -> Result<(PathBuf, AppConfig)> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;
    Ok((config_path, config))
}

/// Runs the `search` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the search fails.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, dir: Option<&PathBuf>) -> Result<()> {
    let (_, config) = load_config(dir)?;
    let client = build_search_client(&config)?;

    let (tx, rx) = oneshot::channel();
    let handle = client.spawn_search(&args.query, move |result| {
        let _ = tx.send(result);
    });
    if handle.is_none() {
        tracing::debug!("Search was not dispatched");
    }

    let movies = rx
        .await
        .context("search ended without a result")?
        .context("TMDB search/movie request failed")?;

    tracing::info!("ID\tTitle\t\t\tReleaseDate\tRating");
    for movie in &movies {
        tracing::info!(
            "{}\t{}\t{}\t{:.1}",
            movie.id,
            movie.title,
            movie
                .release_date
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or("-"),
            movie.vote_average,
        );
        if args.posters
            && let Some(url) = movie.poster_url(POSTER_SIZE_W500)
        {
            tracing::info!("\tposter: {}", url);
        }
    }
    tracing::info!("Total: {} movies", movies.len());

    Ok(())
}

/// Runs the `config set-api-key` subcommand.
///
/// # Errors
///
/// Returns an error if the key is empty or the config cannot be saved.
#[instrument(skip_all)]
fn run_config_set_api_key(args: &SetApiKeyArgs, dir: Option<&PathBuf>) -> Result<()> {
    let key = args.key.trim();
    if key.is_empty() {
        bail!("API key must not be empty");
    }

    let (config_path, mut config) = load_config(dir)?;
    config.tmdb.api_key = Some(String::from(key));
    config.save(&config_path).context("failed to save config")?;
    tracing::info!("Saved API key to {}", config_path.display());

    Ok(())
}

/// Runs the `config show` subcommand.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded.
#[instrument(skip_all)]
fn run_config_show(dir: Option<&PathBuf>) -> Result<()> {
    let (config_path, config) = load_config(dir)?;
    let env_value = std::env::var(API_KEY_ENV).ok();
    let from_env = env_value.as_ref().is_some_and(|v| !v.trim().is_empty());

    tracing::info!("Config file: {}", config_path.display());
    match config.resolve_api_key(env_value) {
        Some(key) => tracing::info!(
            "API key: {} (from {})",
            mask_api_key(&key),
            if from_env { API_KEY_ENV } else { "config" }
        ),
        None => tracing::info!("API key: (not set)"),
    }
    tracing::info!(
        "Base URL: {}",
        config.tmdb.base_url.as_deref().unwrap_or("(default)")
    );

    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    let meter_provider = {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_enabled = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok();

        let otel_layer = otel_enabled
            .then(|| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            })
            .flatten();

        let meter_provider = otel_enabled
            .then(|| {
                let exporter = opentelemetry_otlp::MetricExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let meter_provider = opentelemetry_sdk::metrics::SdkMeterProvider::builder()
                    .with_periodic_exporter(exporter)
                    .build();
                opentelemetry::global::set_meter_provider(meter_provider.clone());

                Some(meter_provider)
            })
            .flatten();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();

        meter_provider
    };

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Search(args) => run_search(&args, cli.dir.as_ref()).await,
        Commands::Config(cmd) => match cmd.command {
            ConfigSubcommands::SetApiKey(args) => run_config_set_api_key(&args, cli.dir.as_ref()),
            ConfigSubcommands::Show => run_config_show(cli.dir.as_ref()),
        },
    };

    #[cfg(feature = "otel")]
    if let Some(provider) = meter_provider
        && let Err(e) = provider.shutdown()
    {
        tracing::warn!(error = %e, "Failed to flush metrics");
    }

    result
}
