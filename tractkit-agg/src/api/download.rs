//! POST /api/download
//!
//! Re-exports records a client already holds (the `GeneralInfo`/`CDC`/`Census`
//! shape) without fetching anything.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    response::Response,
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::export::ExportFormat;
use crate::record::Record;
use crate::AppState;

/// `?format=csv`; XLSX when absent
#[derive(Debug, Default, Deserialize)]
pub struct DownloadQuery {
    pub format: Option<String>,
}

/// POST /api/download
pub async fn download_records(
    query: Result<Query<DownloadQuery>, QueryRejection>,
    payload: Result<Json<Vec<Record>>, JsonRejection>,
) -> ApiResult<Response> {
    let Query(query) = query?;
    let Json(records) = payload?;

    if records.is_empty() {
        return Err(ApiError::BadRequest(
            "No data provided to generate export.".to_string(),
        ));
    }

    let format = match query.format.as_deref() {
        None => ExportFormat::default(),
        Some(s) => s
            .parse::<ExportFormat>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
    };

    tracing::info!(records = records.len(), "Download request");
    super::attachment(&records, format)
}

pub fn download_routes() -> Router<AppState> {
    Router::new().route("/api/download", post(download_records))
}
