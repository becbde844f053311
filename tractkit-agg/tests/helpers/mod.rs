//! Shared utilities for tractkit-agg integration tests

#![allow(dead_code)]

pub mod fakes;
pub mod log_capture;

pub use fakes::{FakeGeocoder, FakeSurvey, FixedGeography};
pub use log_capture::LogCapture;

use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tractkit_agg::aggregate::Aggregator;
use tractkit_agg::schema::SchemaRegistry;
use tractkit_agg::tract::{TractId, TractResolver};
use tractkit_agg::AppState;
use tractkit_common::config::TomlConfig;

pub const TRACT: &str = "06037123456";

/// Config whose health tables live in a fresh temp directory
///
/// Each `(year, csv)` pair is written to `places_{year}.csv`. Keep the
/// returned `TempDir` alive for the duration of the test.
pub fn config_with_health_tables(tables: &[(&str, &str)]) -> (TomlConfig, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = TomlConfig::default();
    config.data_dir = dir.path().to_path_buf();
    config.health_tables.clear();
    for (year, csv) in tables {
        let file = format!("places_{year}.csv");
        std::fs::write(dir.path().join(&file), csv).unwrap();
        config
            .health_tables
            .insert(year.to_string(), PathBuf::from(file));
    }
    (config, dir)
}

pub fn aggregator(
    geocoder: FakeGeocoder,
    survey: Arc<FakeSurvey>,
    config: TomlConfig,
) -> Aggregator {
    aggregator_with_registry(geocoder, survey, config, SchemaRegistry::builtin().clone())
}

/// Aggregator over a hand-built schema table
pub fn aggregator_with_registry(
    geocoder: FakeGeocoder,
    survey: Arc<FakeSurvey>,
    config: TomlConfig,
    registry: SchemaRegistry,
) -> Aggregator {
    let tract = TractId::parse(TRACT).unwrap();
    Aggregator::new(
        TractResolver::new(Arc::new(geocoder), Arc::new(FixedGeography(tract))),
        survey,
        Arc::new(registry),
        Arc::new(config),
    )
}

pub fn app_state(geocoder: FakeGeocoder, survey: Arc<FakeSurvey>, config: TomlConfig) -> AppState {
    let config_arc = Arc::new(config.clone());
    AppState::new(aggregator(geocoder, survey, config), config_arc, false)
}
