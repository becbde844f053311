//! HTTP API handlers for tractkit-agg
//!
//! - `GET /` banner
//! - `GET /health`
//! - `POST /api/tract`: resolve addresses, aggregate, export
//! - `POST /api/download`: export already-aggregated records

pub mod download;
pub mod health;
pub mod tract;

pub use download::download_routes;
pub use health::health_routes;
pub use tract::tract_routes;

use crate::error::ApiResult;
use crate::export::{ExportFormat, ExportTable};
use crate::record::Record;
use axum::{
    http::header,
    response::{IntoResponse, Response},
};

/// GET /
pub async fn banner() -> &'static str {
    "API is running. POST to /api/tract"
}

/// Encode records as a downloadable attachment
pub fn attachment(records: &[Record], format: ExportFormat) -> ApiResult<Response> {
    let table = ExportTable::from_records(records);
    let bytes = format.encode(&table)?;

    tracing::info!(
        rows = table.rows.len(),
        columns = table.header.len(),
        bytes = bytes.len(),
        file = format.filename(),
        "Export generated"
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", format.filename()),
            ),
        ],
        bytes,
    )
        .into_response())
}
