//! POST /api/tract
//!
//! Body:
//! ```json
//! {
//!   "year": "2022",
//!   "dataType": "Both",
//!   "input": "1600 Pennsylvania Ave NW, Washington, DC",
//!   "excelData": [{"Address": "..."}, {"address": "..."}],
//!   "format": "xlsx"
//! }
//! ```
//! Responds with the export as an attachment.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Response,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;

use crate::aggregate::DataSource;
use crate::error::{ApiError, ApiResult};
use crate::export::ExportFormat;
use crate::year::SurveyYear;
use crate::AppState;

/// Keys checked, in order, for the address of an uploaded row
const ADDRESS_KEYS: [&str; 3] = ["Address", "address", "ADDRESS"];

/// POST /api/tract request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TractRequest {
    /// String or number
    pub year: Option<Value>,
    pub data_type: Option<String>,
    pub input: Option<String>,
    /// Rows of an uploaded spreadsheet
    pub excel_data: Option<Value>,
    pub format: Option<String>,
}

impl TractRequest {
    pub fn survey_year(&self) -> ApiResult<SurveyYear> {
        let token = match &self.year {
            None | Some(Value::Null) => {
                return Err(ApiError::BadRequest("Missing 'year' in request body.".to_string()))
            }
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => {
                return Err(ApiError::BadRequest(format!("Invalid year: {other}")));
            }
        };
        token
            .parse::<SurveyYear>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))
    }

    pub fn data_source(&self) -> ApiResult<DataSource> {
        match &self.data_type {
            None => Ok(DataSource::default()),
            Some(s) => s
                .parse::<DataSource>()
                .map_err(|e| ApiError::BadRequest(e.to_string())),
        }
    }

    pub fn export_format(&self) -> ApiResult<ExportFormat> {
        match &self.format {
            None => Ok(ExportFormat::default()),
            Some(s) => s
                .parse::<ExportFormat>()
                .map_err(|e| ApiError::BadRequest(e.to_string())),
        }
    }

    /// Single input first, then uploaded rows; blanks dropped
    pub fn addresses(&self) -> Vec<String> {
        let single = self.input.as_deref().map(str::trim).filter(|s| !s.is_empty());

        let rows = self
            .excel_data
            .as_ref()
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(row_address);

        single.map(str::to_string).into_iter().chain(rows).collect()
    }
}

fn row_address(row: &Value) -> Option<String> {
    ADDRESS_KEYS
        .iter()
        .filter_map(|key| row.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// POST /api/tract
pub async fn get_tract_data(
    State(state): State<AppState>,
    payload: Result<Json<TractRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = payload?;
    let year = request.survey_year()?;
    let source = request.data_source()?;
    let format = request.export_format()?;

    let addresses = request.addresses();
    if addresses.is_empty() {
        return Err(ApiError::BadRequest("No valid addresses provided.".to_string()));
    }

    tracing::info!(year = %year, source = %source, addresses = addresses.len(), "Tract request");

    let records = state.aggregator.process_batch(year, source, &addresses).await;
    if records.is_empty() {
        let message = "No valid addresses processed.".to_string();
        *state.last_error.write().await = Some(message.clone());
        return Err(ApiError::BatchEmpty(message));
    }
    *state.last_error.write().await = None;

    super::attachment(&records, format)
}

pub fn tract_routes() -> Router<AppState> {
    Router::new().route("/api/tract", post(get_tract_data))
}
