//! Multi-source aggregation pipeline
//!
//! Per address: resolve tract → health-indicator rows → eligible survey
//! datasets → last-write-wins merge → percentage formatting. Unresolvable
//! addresses are dropped from the batch; individual fetch failures only lose
//! their own fields.

use crate::eligibility::{eligible_steps, PlanStep};
use crate::health_table::HealthTable;
use crate::normalize::format_percent;
use crate::record::{merge_into, Fields, Record};
use crate::schema::{Dataset, SchemaRegistry};
use crate::survey::{FetchOutcome, FieldGroupFetcher, SurveyApi};
use crate::tract::{TractId, TractResolver};
use crate::year::SurveyYear;
use futures::future::join_all;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, info_span, Instrument};
use tractkit_common::config::TomlConfig;
use uuid::Uuid;

/// Survey labels rendered as `"<x.y>%"` after merging
pub const PERCENT_LABELS: &[&str] = &[
    "Unemployment Rate (%)",
    "Employment Rate (%)",
    "Married-Couple Households (%)",
    "Female Householder, No Spouse (%)",
    "Married-Couple Families (%)",
    "Households w/ No Vehicle (%)",
    "Households with a Computer (%)",
    "Households with Broadband (%)",
    "Speak Spanish at Home (%)",
    "Speak Other Indo-European Languages at Home (%)",
    "Speak Asian & Pacific Island Languages at Home (%)",
    "Speak Other Languages at Home (%)",
];

/// Which sources feed each record
///
/// Request tokens are `CDC`, `CENSUS` and `Both`, matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataSource {
    /// Health-indicator table only
    #[default]
    Health,
    /// Statistical survey only
    Survey,
    Both,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown data type '{0}': expected CDC, CENSUS or Both")]
pub struct DataSourceParseError(pub String);

impl DataSource {
    pub fn includes_health(self) -> bool {
        matches!(self, DataSource::Health | DataSource::Both)
    }

    pub fn includes_survey(self) -> bool {
        matches!(self, DataSource::Survey | DataSource::Both)
    }
}

impl FromStr for DataSource {
    type Err = DataSourceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CDC" => Ok(DataSource::Health),
            "CENSUS" => Ok(DataSource::Survey),
            "BOTH" => Ok(DataSource::Both),
            _ => Err(DataSourceParseError(s.to_string())),
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            DataSource::Health => "CDC",
            DataSource::Survey => "CENSUS",
            DataSource::Both => "Both",
        };
        f.write_str(token)
    }
}

/// Apply [`format_percent`] to every allow-listed label present
pub fn apply_percent_format(fields: &mut Fields) {
    for label in PERCENT_LABELS {
        if let Some(value) = fields.get_mut(*label) {
            *value = format_percent(value);
        }
    }
}

/// Aggregation pipeline and its collaborators
#[derive(Clone)]
pub struct Aggregator {
    resolver: TractResolver,
    survey: Arc<dyn SurveyApi>,
    registry: Arc<SchemaRegistry>,
    config: Arc<TomlConfig>,
}

impl Aggregator {
    pub fn new(
        resolver: TractResolver,
        survey: Arc<dyn SurveyApi>,
        registry: Arc<SchemaRegistry>,
        config: Arc<TomlConfig>,
    ) -> Self {
        Self {
            resolver,
            survey,
            registry,
            config,
        }
    }

    /// Merged survey fields for one tract
    ///
    /// Primary datasets are fetched concurrently; fallback datasets run only
    /// when the dataset they stand in for contributed nothing. Results are
    /// merged in plan order whatever order the requests complete in.
    pub async fn survey_fields(&self, tract: &TractId, year: SurveyYear) -> Fields {
        let fetcher = FieldGroupFetcher::new(self.survey.as_ref(), &self.registry);
        let steps = eligible_steps(year);

        let primary: Vec<&PlanStep> = steps
            .iter()
            .filter(|s| s.fallback_for.is_none())
            .collect();
        let outcomes =
            join_all(primary.iter().map(|s| fetcher.fetch(s.dataset, tract, year))).await;

        let mut contributed: HashMap<Dataset, Fields> = primary
            .iter()
            .map(|s| s.dataset)
            .zip(outcomes.into_iter().map(FetchOutcome::into_fields))
            .collect();

        for step in steps.iter().filter(|s| s.fallback_for.is_some()) {
            let needed = step
                .fallback_for
                .and_then(|primary| contributed.get(&primary))
                .map_or(true, |fields| fields.is_empty());
            if needed {
                debug!(dataset = %step.dataset, tract = %tract, "Running fallback dataset");
                let fields = fetcher.fetch(step.dataset, tract, year).await.into_fields();
                contributed.insert(step.dataset, fields);
            }
        }

        let mut merged = Fields::new();
        for step in &steps {
            if let Some(fields) = contributed.remove(&step.dataset) {
                merge_into(&mut merged, fields);
            }
        }
        apply_percent_format(&mut merged);
        merged
    }

    /// Full record for one address; `None` when the address cannot be resolved
    pub async fn process_address(
        &self,
        address: &str,
        year: SurveyYear,
        source: DataSource,
        health: &HealthTable,
    ) -> Option<Record> {
        let resolved = self.resolver.resolve(address).await?;

        let general = Fields::from([
            ("Year".to_string(), Value::String(year.token())),
            ("Address".to_string(), Value::String(address.to_string())),
            ("Latitude".to_string(), Value::from(resolved.latitude)),
            ("Longitude".to_string(), Value::from(resolved.longitude)),
            (
                "TractFIPS".to_string(),
                Value::String(resolved.tract.to_string()),
            ),
        ]);

        let health = if source.includes_health() {
            health.rows_for(&resolved.tract)
        } else {
            Fields::new()
        };

        let census = if source.includes_survey() {
            self.survey_fields(&resolved.tract, year).await
        } else {
            Fields::new()
        };

        debug!(
            tract = %resolved.tract,
            health_fields = health.len(),
            survey_fields = census.len(),
            "Address aggregated"
        );

        Some(Record {
            general,
            health,
            census,
        })
    }

    /// Records for every resolvable address, in input order
    ///
    /// Addresses are processed one at a time. The health table for the year
    /// is loaded once per batch.
    pub async fn process_batch(
        &self,
        year: SurveyYear,
        source: DataSource,
        addresses: &[String],
    ) -> Vec<Record> {
        let batch_id = Uuid::new_v4();
        let span = info_span!("batch", batch_id = %batch_id, year = %year, source = %source);

        async move {
            info!(addresses = addresses.len(), "Processing batch");

            let health = if source.includes_health() {
                HealthTable::load_for_year(&self.config, year).await
            } else {
                HealthTable::empty()
            };

            let mut records = Vec::with_capacity(addresses.len());
            for address in addresses {
                if let Some(record) = self.process_address(address, year, source, &health).await {
                    records.push(record);
                }
            }

            info!(
                requested = addresses.len(),
                processed = records.len(),
                "Batch complete"
            );
            records
        }
        .instrument(span)
        .await
    }
}
