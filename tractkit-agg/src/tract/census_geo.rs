//! Census Bureau geocoder: coordinates → tract

use super::{Coordinates, GeographyLookup, ResolveError, TractId};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tractkit_common::config::TomlConfig;
use tracing::debug;

const BENCHMARK: &str = "Public_AR_Current";
const VINTAGE: &str = "Current_Current";
const TRACT_LAYER: &str = "Census Tracts";

/// Extract the first tract of a geographies/coordinates response
///
/// Expected path: `result.geographies["Census Tracts"][0]` with string
/// `STATE`, `COUNTY`, `TRACT` members.
pub fn parse_tract_payload(body: &Value) -> Result<TractId, ResolveError> {
    let tracts = body
        .pointer("/result/geographies")
        .and_then(|g| g.get(TRACT_LAYER))
        .and_then(Value::as_array)
        .ok_or_else(|| ResolveError::Parse("missing Census Tracts layer".to_string()))?;

    let first = tracts.first().ok_or(ResolveError::NoTract)?;

    let part = |name: &str| -> Result<&str, ResolveError> {
        first
            .get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| ResolveError::Parse(format!("missing {name}")))
    };

    Ok(TractId::from_parts(
        part("STATE")?,
        part("COUNTY")?,
        part("TRACT")?,
    )?)
}

/// `geographies/coordinates` client
pub struct CensusGeographyClient {
    client: Client,
    url: String,
}

impl CensusGeographyClient {
    pub fn new(url: String, user_agent: &str, timeout: Duration) -> Result<Self, ResolveError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| ResolveError::Network(e.to_string()))?;
        Ok(Self { client, url })
    }

    pub fn from_config(config: &TomlConfig) -> Result<Self, ResolveError> {
        Self::new(
            config.endpoints.geography_url.clone(),
            &config.endpoints.user_agent,
            config.timeouts.geocode(),
        )
    }
}

#[async_trait]
impl GeographyLookup for CensusGeographyClient {
    async fn tract_at(&self, point: Coordinates) -> Result<TractId, ResolveError> {
        debug!(lat = point.latitude, lon = point.longitude, "Querying census geography");

        let body: Value = self
            .client
            .get(&self.url)
            .query(&[
                ("x", point.longitude.to_string()),
                ("y", point.latitude.to_string()),
                ("benchmark", BENCHMARK.to_string()),
                ("vintage", VINTAGE.to_string()),
                ("layers", TRACT_LAYER.to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_tract_payload(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tract::TractIdError;
    use serde_json::json;

    #[test]
    fn test_parse_pads_short_tract() {
        let body = json!({
            "result": {
                "geographies": {
                    "Census Tracts": [
                        {"STATE": "06", "COUNTY": "037", "TRACT": "2071", "GEOID": "06037002071"}
                    ]
                }
            }
        });
        assert_eq!(parse_tract_payload(&body).unwrap().as_str(), "06037002071");
    }

    #[test]
    fn test_parse_empty_layer() {
        let body = json!({"result": {"geographies": {"Census Tracts": []}}});
        assert!(matches!(parse_tract_payload(&body), Err(ResolveError::NoTract)));
    }

    #[test]
    fn test_parse_malformed() {
        for body in [
            json!({}),
            json!({"result": {"geographies": {}}}),
            json!({"result": {"geographies": {"Census Tracts": [{"STATE": "06"}]}}}),
        ] {
            assert!(matches!(parse_tract_payload(&body), Err(ResolveError::Parse(_))));
        }
    }

    #[test]
    fn test_parse_rejects_bad_parts() {
        let body = json!({
            "result": {"geographies": {"Census Tracts": [
                {"STATE": "6", "COUNTY": "037", "TRACT": "123456"}
            ]}}
        });
        assert!(matches!(
            parse_tract_payload(&body),
            Err(ResolveError::InvalidTract(TractIdError::State(_)))
        ));
    }
}
