//! Statistical-survey HTTP client

use super::{SurveyApi, SurveyError};
use crate::schema::Endpoint;
use crate::tract::TractId;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tractkit_common::config::TomlConfig;

/// Credential, root URL and timeout for survey requests
#[derive(Debug, Clone)]
pub struct SurveyConfig {
    /// API root, e.g. `https://api.census.gov/data`
    pub base_url: String,
    /// Credential sent as `key=`; omitted when `None`
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl SurveyConfig {
    pub fn from_toml(config: &TomlConfig, api_key: Option<String>) -> Self {
        Self {
            base_url: config.endpoints.survey_base_url.clone(),
            api_key,
            timeout: config.timeouts.survey(),
        }
    }
}

/// Query parameters for one table request
pub fn request_params(
    codes: &[&str],
    tract: &TractId,
    api_key: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("get", codes.join(",")),
        ("for", format!("tract:{}", tract.tract())),
        ("in", format!("state:{} county:{}", tract.state(), tract.county())),
    ];
    if let Some(key) = api_key {
        params.push(("key", key.to_string()));
    }
    params
}

/// reqwest-backed [`SurveyApi`]
pub struct HttpSurveyClient {
    http_client: Client,
    config: SurveyConfig,
}

impl HttpSurveyClient {
    pub fn new(config: SurveyConfig) -> Result<Self, SurveyError> {
        let http_client = Client::builder()
            .user_agent(tractkit_common::config::get_user_agent())
            .timeout(config.timeout)
            .build()
            .map_err(|e| SurveyError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            config,
        })
    }
}

#[async_trait]
impl SurveyApi for HttpSurveyClient {
    async fn get_table(
        &self,
        endpoint: Endpoint,
        codes: &[&str],
        tract: &TractId,
    ) -> Result<Value, SurveyError> {
        let url = endpoint.url(&self.config.base_url);
        let params = request_params(codes, tract, self.config.api_key.as_deref());

        tracing::debug!(url = %url, tract = %tract, fields = codes.len(), "Querying survey API");

        let response = self
            .http_client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SurveyError::Timeout
                } else {
                    SurveyError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SurveyError::Status(status.as_u16(), error_text));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SurveyError::Parse(e.to_string()))
    }
}
