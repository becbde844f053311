//! Address → census tract resolution
//!
//! Two external steps, each behind a trait so the pipeline can run against
//! fakes:
//! 1. [`Geocoder`]: free-form address → latitude/longitude
//! 2. [`GeographyLookup`]: coordinates → [`TractId`]
//!
//! [`TractResolver`] chains them and absorbs every failure: an address that
//! cannot be resolved yields `None` and a warning, never an error.

pub mod census_geo;
mod id;
pub mod nominatim;

pub use census_geo::CensusGeographyClient;
pub use id::{TractId, TractIdError};
pub use nominatim::NominatimGeocoder;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Geographic point (WGS84 degrees)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Tract resolution failures
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No census tract at coordinates")]
    NoTract,

    #[error(transparent)]
    InvalidTract(#[from] TractIdError),
}

impl From<reqwest::Error> for ResolveError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ResolveError::Timeout
        } else if let Some(status) = e.status() {
            ResolveError::Status(status.as_u16())
        } else if e.is_decode() {
            ResolveError::Parse(e.to_string())
        } else {
            ResolveError::Network(e.to_string())
        }
    }
}

/// Address geocoding
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the provider has no match for the address
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, ResolveError>;
}

/// Coordinates → tract identifier
#[async_trait]
pub trait GeographyLookup: Send + Sync {
    async fn tract_at(&self, point: Coordinates) -> Result<TractId, ResolveError>;
}

/// Successfully resolved address
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTract {
    pub latitude: f64,
    pub longitude: f64,
    pub tract: TractId,
}

/// Geocoder + geography lookup pipeline
#[derive(Clone)]
pub struct TractResolver {
    geocoder: Arc<dyn Geocoder>,
    geography: Arc<dyn GeographyLookup>,
}

impl TractResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, geography: Arc<dyn GeographyLookup>) -> Self {
        Self {
            geocoder,
            geography,
        }
    }

    /// Resolve an address; `None` on any failure
    pub async fn resolve(&self, address: &str) -> Option<ResolvedTract> {
        let point = match self.geocoder.geocode(address).await {
            Ok(Some(point)) => point,
            Ok(None) => {
                warn!(address = %address, "Address not found by geocoder");
                return None;
            }
            Err(e) => {
                warn!(address = %address, error = %e, "Geocoding failed");
                return None;
            }
        };

        match self.geography.tract_at(point).await {
            Ok(tract) => {
                debug!(address = %address, tract = %tract, "Resolved census tract");
                Some(ResolvedTract {
                    latitude: point.latitude,
                    longitude: point.longitude,
                    tract,
                })
            }
            Err(e) => {
                warn!(
                    address = %address,
                    lat = point.latitude,
                    lon = point.longitude,
                    error = %e,
                    "Geography lookup failed"
                );
                None
            }
        }
    }
}
