//! In-process stand-ins for the external services

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tractkit_agg::schema::Endpoint;
use tractkit_agg::survey::{SurveyApi, SurveyError};
use tractkit_agg::tract::{Coordinates, Geocoder, GeographyLookup, ResolveError, TractId};

/// Geocoder that knows a fixed set of addresses
#[derive(Default)]
pub struct FakeGeocoder {
    known: HashMap<String, Coordinates>,
}

impl FakeGeocoder {
    pub fn with(mut self, address: &str, latitude: f64, longitude: f64) -> Self {
        self.known.insert(
            address.to_string(),
            Coordinates {
                latitude,
                longitude,
            },
        );
        self
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, ResolveError> {
        Ok(self.known.get(address).copied())
    }
}

/// Every point lies in the same tract
pub struct FixedGeography(pub TractId);

#[async_trait]
impl GeographyLookup for FixedGeography {
    async fn tract_at(&self, _point: Coordinates) -> Result<TractId, ResolveError> {
        Ok(self.0.clone())
    }
}

/// Survey API answering by first field code, then by table code (its prefix)
///
/// Unknown requests fail with HTTP 400, like the real API does for unknown
/// variables.
#[derive(Default)]
pub struct FakeSurvey {
    responses: HashMap<String, Value>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<(Endpoint, Vec<String>)>>,
    completed: Mutex<Vec<String>>,
}

impl FakeSurvey {
    /// Answer every request for `key`, a table code (`S1701`) or a first field code
    pub fn with_table(mut self, key: &str, body: Value) -> Self {
        self.responses.insert(key.to_string(), body);
        self
    }

    /// Hold back answers for `key` (same matching as `with_table`)
    pub fn with_delay(mut self, key: &str, delay: Duration) -> Self {
        self.delays.insert(key.to_string(), delay);
        self
    }

    /// First field code of every answered request, in completion order
    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }

    /// First field code of every request, in call order
    pub fn first_codes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|(_, codes)| codes.into_iter().next())
            .collect()
    }

    pub fn calls(&self) -> Vec<(Endpoint, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SurveyApi for FakeSurvey {
    async fn get_table(
        &self,
        endpoint: Endpoint,
        codes: &[&str],
        _tract: &TractId,
    ) -> Result<Value, SurveyError> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint, codes.iter().map(|c| c.to_string()).collect()));

        let first = codes.first().copied().unwrap_or_default();
        let table = first.split('_').next().unwrap_or_default();

        let delay = self.delays.get(first).or_else(|| self.delays.get(table));
        if let Some(delay) = delay {
            tokio::time::sleep(*delay).await;
        }
        self.completed.lock().unwrap().push(first.to_string());

        self.responses
            .get(first)
            .or_else(|| self.responses.get(table))
            .cloned()
            .ok_or_else(|| SurveyError::Status(400, format!("unknown variable '{first}'")))
    }
}
