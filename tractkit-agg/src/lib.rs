//! tractkit-agg library interface
//!
//! Address → census tract → year-versioned survey and health-indicator
//! aggregation, exposed over HTTP. The library surface exists so the pipeline
//! and router can be driven from integration tests with fake external services.

pub mod aggregate;
pub mod api;
pub mod eligibility;
pub mod error;
pub mod export;
pub mod health_table;
pub mod normalize;
pub mod record;
pub mod schema;
pub mod survey;
pub mod tract;
pub mod year;

pub use crate::error::{ApiError, ApiResult};

use aggregate::Aggregator;
use axum::{routing::get, Router};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tractkit_common::config::TomlConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Aggregator,
    pub config: Arc<TomlConfig>,
    /// Survey credential present at startup (the key itself is not exposed)
    pub census_api_key_configured: bool,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Failure of the most recent batch; cleared when a batch succeeds
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(
        aggregator: Aggregator,
        config: Arc<TomlConfig>,
        census_api_key_configured: bool,
    ) -> Self {
        Self {
            aggregator,
            config,
            census_api_key_configured,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
///
/// CORS is open on `/api/*` only; every route is traced.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(api::tract_routes())
        .merge(api::download_routes())
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/", get(api::banner))
        .merge(api::health_routes())
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
