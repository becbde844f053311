//! Nominatim (OpenStreetMap) geocoder
//!
//! Usage policy: at most 1 request per second and an identifying User-Agent.
//! API documentation: https://nominatim.org/release-docs/latest/api/Search/

use super::{Coordinates, Geocoder, ResolveError};
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;
use tractkit_common::config::TomlConfig;
use tracing::debug;

/// One search hit; coordinates arrive as decimal strings
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

impl SearchHit {
    fn coordinates(&self) -> Result<Coordinates, ResolveError> {
        let latitude = self
            .lat
            .trim()
            .parse::<f64>()
            .map_err(|_| ResolveError::Parse(format!("latitude '{}'", self.lat)))?;
        let longitude = self
            .lon
            .trim()
            .parse::<f64>()
            .map_err(|_| ResolveError::Parse(format!("longitude '{}'", self.lon)))?;
        Ok(Coordinates {
            latitude,
            longitude,
        })
    }
}

/// Nominatim `/search` client
pub struct NominatimGeocoder {
    client: Client,
    search_url: String,
    /// 1 request per second (Nominatim policy)
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl NominatimGeocoder {
    pub fn new(
        search_url: String,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, ResolveError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| ResolveError::Network(e.to_string()))?;

        let rate_limiter = RateLimiter::direct(Quota::per_second(NonZeroU32::MIN));

        Ok(Self {
            client,
            search_url,
            rate_limiter,
        })
    }

    pub fn from_config(config: &TomlConfig) -> Result<Self, ResolveError> {
        Self::new(
            config.endpoints.geocoder_url.clone(),
            &config.endpoints.user_agent,
            config.timeouts.geocode(),
        )
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, ResolveError> {
        self.rate_limiter.until_ready().await;

        debug!(address = %address, "Querying Nominatim");

        let hits: Vec<SearchHit> = self
            .client
            .get(&self.search_url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        hits.first().map(SearchHit::coordinates).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_parses_string_coordinates() {
        let hits: Vec<SearchHit> = serde_json::from_str(
            r#"[{"place_id": 1, "lat": "34.0522", "lon": "-118.2437", "display_name": "LA"}]"#,
        )
        .unwrap();
        let point = hits[0].coordinates().unwrap();
        assert_eq!(point.latitude, 34.0522);
        assert_eq!(point.longitude, -118.2437);
    }

    #[test]
    fn test_hit_rejects_garbage() {
        let hit = SearchHit {
            lat: "north".to_string(),
            lon: "0".to_string(),
        };
        assert!(matches!(hit.coordinates(), Err(ResolveError::Parse(_))));
    }

    #[test]
    fn test_from_default_config() {
        assert!(NominatimGeocoder::from_config(&TomlConfig::default()).is_ok());
    }
}
