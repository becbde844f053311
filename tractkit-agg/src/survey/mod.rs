//! Statistical-survey API access
//!
//! - [`SurveyApi`]: transport seam (one request per table)
//! - [`client::HttpSurveyClient`]: reqwest implementation
//! - [`fetcher::FieldGroupFetcher`]: registry-driven fetch + normalization

pub mod client;
pub mod fetcher;

pub use client::{HttpSurveyClient, SurveyConfig};
pub use fetcher::{FetchOutcome, FieldGroupFetcher};

use crate::schema::Endpoint;
use crate::tract::TractId;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Survey request failures
#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("API error {0}: {1}")]
    Status(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unexpected response shape: {0}")]
    Shape(String),
}

/// One survey table request
///
/// Implementations issue `GET endpoint?get=<codes>&for=tract:<t>&in=state:<s> county:<c>[&key=]`
/// and return the decoded JSON body. Shape validation is left to the caller.
#[async_trait]
pub trait SurveyApi: Send + Sync {
    async fn get_table(
        &self,
        endpoint: Endpoint,
        codes: &[&str],
        tract: &TractId,
    ) -> Result<Value, SurveyError>;
}

/// Zip a 2-row survey response into code → raw value
///
/// Row 0 holds field-code headers, row 1 the values in the same order. Any
/// other shape is an error.
pub fn zip_response(body: &Value) -> Result<HashMap<String, Value>, SurveyError> {
    let rows = body
        .as_array()
        .ok_or_else(|| SurveyError::Shape("response is not an array".to_string()))?;

    let (Some(header), Some(values)) = (rows.first(), rows.get(1)) else {
        return Err(SurveyError::Shape(format!(
            "expected header and value rows, got {} row(s)",
            rows.len()
        )));
    };

    let header = header
        .as_array()
        .ok_or_else(|| SurveyError::Shape("header row is not an array".to_string()))?;
    let values = values
        .as_array()
        .ok_or_else(|| SurveyError::Shape("value row is not an array".to_string()))?;

    header
        .iter()
        .zip(values.iter())
        .map(|(code, value)| {
            code.as_str()
                .map(|c| (c.to_string(), value.clone()))
                .ok_or_else(|| SurveyError::Shape(format!("non-string header cell {code}")))
        })
        .collect()
}
