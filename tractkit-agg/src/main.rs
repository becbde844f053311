//! tractkit-agg - census tract aggregation service
//!
//! Resolves street addresses to census tracts and exports a merged table of
//! health-indicator and statistical-survey fields for a chosen year.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tractkit_agg::aggregate::Aggregator;
use tractkit_agg::schema::SchemaRegistry;
use tractkit_agg::survey::{HttpSurveyClient, SurveyConfig};
use tractkit_agg::tract::{CensusGeographyClient, NominatimGeocoder, TractResolver};
use tractkit_agg::AppState;
use tractkit_common::config;

/// Command-line arguments for tractkit-agg
#[derive(Parser, Debug)]
#[command(name = "tractkit-agg")]
#[command(about = "Census tract health and survey data aggregation service")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "TRACTKIT_PORT")]
    port: Option<u16>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = config::resolve_config_path(args.config.as_deref());
    let toml_config = config::load_config(config_path.as_deref()).context("Failed to load config")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                let level = &toml_config.logging.level;
                format!("tractkit_agg={level},tractkit_common={level},tower_http=info").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tractkit-agg");
    info!(
        "Version: {} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) if path.exists() => info!("Config: {}", path.display()),
        Some(path) => warn!("Config file {} not found, using compiled defaults", path.display()),
        None => info!("Config: compiled defaults"),
    }
    info!("Data directory: {}", toml_config.data_dir.display());

    let api_key = config::resolve_census_api_key(&toml_config);
    let key_configured = api_key.is_some();
    let toml_config = Arc::new(toml_config);

    let geocoder =
        NominatimGeocoder::from_config(&toml_config).context("Failed to build geocoder")?;
    let geography = CensusGeographyClient::from_config(&toml_config)
        .context("Failed to build geography client")?;
    let survey = HttpSurveyClient::new(SurveyConfig::from_toml(&toml_config, api_key))
        .context("Failed to build survey client")?;

    let aggregator = Aggregator::new(
        TractResolver::new(Arc::new(geocoder), Arc::new(geography)),
        Arc::new(survey),
        Arc::new(SchemaRegistry::builtin().clone()),
        toml_config.clone(),
    );

    let state = AppState::new(aggregator, toml_config.clone(), key_configured);
    let app = tractkit_agg::build_router(state);

    let port = args.port.unwrap_or(toml_config.port);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
