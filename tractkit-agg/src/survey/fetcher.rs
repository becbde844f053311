//! Field-group fetcher
//!
//! One fetch = one dataset for one (tract, year): look up the schema entry,
//! issue a single request, zip the 2-row response and normalize every value.
//! Failures never cross this boundary; they come back as a typed
//! [`FetchOutcome`] that contributes no fields.

use super::{zip_response, SurveyApi, SurveyError};
use crate::normalize::clean;
use crate::record::Fields;
use crate::schema::{Dataset, SchemaRegistry};
use crate::tract::TractId;
use crate::year::SurveyYear;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Result of fetching one dataset
#[derive(Debug)]
pub enum FetchOutcome {
    /// Normalized label → value mapping
    Fields(Fields),
    /// No schema entry for the year (configuration gap)
    Unconfigured,
    /// Request failed or response was malformed
    Failed(SurveyError),
}

impl FetchOutcome {
    /// Fields contributed to the record (empty unless `Fields`)
    pub fn into_fields(self) -> Fields {
        match self {
            FetchOutcome::Fields(fields) => fields,
            FetchOutcome::Unconfigured | FetchOutcome::Failed(_) => Fields::new(),
        }
    }

    /// True when the outcome adds nothing to the record
    pub fn is_empty(&self) -> bool {
        match self {
            FetchOutcome::Fields(fields) => fields.is_empty(),
            FetchOutcome::Unconfigured | FetchOutcome::Failed(_) => true,
        }
    }
}

fn is_zero_base(raw: Option<&Value>) -> bool {
    match raw {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s == "0",
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(_) => false,
    }
}

/// Registry-driven fetcher over a [`SurveyApi`]
pub struct FieldGroupFetcher<'a> {
    api: &'a dyn SurveyApi,
    registry: &'a SchemaRegistry,
}

impl<'a> FieldGroupFetcher<'a> {
    pub fn new(api: &'a dyn SurveyApi, registry: &'a SchemaRegistry) -> Self {
        Self { api, registry }
    }

    /// Fetch one dataset for a tract and year
    pub async fn fetch(&self, dataset: Dataset, tract: &TractId, year: SurveyYear) -> FetchOutcome {
        let Some(entry) = self.registry.entry(dataset, year) else {
            debug!(dataset = %dataset, year = %year, "No schema entry for year, skipping");
            return FetchOutcome::Unconfigured;
        };

        let endpoint = entry.endpoint_for(year);
        let codes = entry.codes();

        let values = match self
            .api
            .get_table(endpoint, &codes, tract)
            .await
            .and_then(|body| zip_response(&body))
        {
            Ok(values) => values,
            Err(e) => {
                warn!(
                    dataset = %dataset,
                    tract = %tract,
                    year = %year,
                    error = %e,
                    "Survey fetch failed"
                );
                return FetchOutcome::Failed(e);
            }
        };

        if let Some(zero_base) = dataset.zero_base() {
            if is_zero_base(values.get(zero_base.code)) {
                info!(
                    dataset = %dataset,
                    tract = %tract,
                    "Tract has no base population ({} = 0)",
                    zero_base.code
                );
                return FetchOutcome::Fields(Fields::from([(
                    zero_base.label.to_string(),
                    Value::from(0),
                )]));
            }
        }

        let fields = entry
            .fields
            .iter()
            .map(|(code, label)| {
                let raw = values.get(*code).unwrap_or(&Value::Null);
                (label.to_string(), clean(raw))
            })
            .collect();

        debug!(dataset = %dataset, tract = %tract, "Survey fetch succeeded");
        FetchOutcome::Fields(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Endpoint;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays one canned body (or a network failure) and records requests
    struct CannedSurvey {
        body: Option<Value>,
        calls: Mutex<Vec<(Endpoint, Vec<String>, String)>>,
    }

    impl CannedSurvey {
        fn new(body: Option<Value>) -> Self {
            Self {
                body,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SurveyApi for CannedSurvey {
        async fn get_table(
            &self,
            endpoint: Endpoint,
            codes: &[&str],
            tract: &TractId,
        ) -> Result<Value, SurveyError> {
            self.calls.lock().unwrap().push((
                endpoint,
                codes.iter().map(|c| c.to_string()).collect(),
                tract.to_string(),
            ));
            self.body
                .clone()
                .ok_or_else(|| SurveyError::Network("connection refused".to_string()))
        }
    }

    fn tract() -> TractId {
        TractId::parse("06037123456").unwrap()
    }

    fn year(y: u16) -> SurveyYear {
        SurveyYear::new(y)
    }

    #[tokio::test]
    async fn test_fetch_zips_and_cleans() {
        let api = CannedSurvey::new(Some(json!([
            ["S1701_C03_001E", "state", "county", "tract"],
            ["14.2", "06", "037", "123456"]
        ])));
        let fetcher = FieldGroupFetcher::new(&api, SchemaRegistry::builtin());

        let fields = fetcher
            .fetch(Dataset::Poverty, &tract(), year(2020))
            .await
            .into_fields();

        assert_eq!(fields.len(), 1);
        assert_eq!(fields["Poverty Rate - Total"], json!("14.2"));

        let calls = api.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Endpoint::Subject(year(2020)));
        assert_eq!(calls[0].1, vec!["S1701_C03_001E".to_string()]);
        assert_eq!(calls[0].2, "06037123456");
    }

    #[tokio::test]
    async fn test_fetch_sentinels_and_missing_codes_become_null() {
        let api = CannedSurvey::new(Some(json!([
            ["DP03_0005PE", "DP03_0001PE", "DP03_0018E", "DP03_0092E"],
            ["-666666666", "", "27.5", "-888888888"]
        ])));
        let fetcher = FieldGroupFetcher::new(&api, SchemaRegistry::builtin());

        let fields = fetcher
            .fetch(Dataset::Employment, &tract(), year(2023))
            .await
            .into_fields();

        assert_eq!(fields["Unemployment Rate (%)"], Value::Null);
        assert_eq!(fields["Employment Rate (%)"], Value::Null);
        assert_eq!(fields["Mean Commute Time (min)"], json!("27.5"));
        assert_eq!(fields["Median Earnings (Male FT)"], Value::Null);
        // DP03_0074E absent from the response
        assert_eq!(fields["Households w/ SNAP"], Value::Null);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_empty_outcome() {
        let api = CannedSurvey::new(None);
        let fetcher = FieldGroupFetcher::new(&api, SchemaRegistry::builtin());

        let outcome = fetcher.fetch(Dataset::AgeSex, &tract(), year(2019)).await;
        assert!(matches!(outcome, FetchOutcome::Failed(SurveyError::Network(_))));
        assert!(outcome.is_empty());
        assert!(outcome.into_fields().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_malformed_payload_is_empty_outcome() {
        let api = CannedSurvey::new(Some(json!({"error": "unknown variable"})));
        let fetcher = FieldGroupFetcher::new(&api, SchemaRegistry::builtin());

        let outcome = fetcher.fetch(Dataset::AgeSex, &tract(), year(2019)).await;
        assert!(matches!(outcome, FetchOutcome::Failed(SurveyError::Shape(_))));
    }

    #[tokio::test]
    async fn test_unsupported_year_issues_no_request() {
        let api = CannedSurvey::new(Some(json!([["X"], ["1"]])));
        let fetcher = FieldGroupFetcher::new(&api, SchemaRegistry::builtin());

        let outcome = fetcher.fetch(Dataset::IncomeBrackets, &tract(), year(2009)).await;
        assert!(matches!(outcome, FetchOutcome::Unconfigured));
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_income_zero_households_marker() {
        let api = CannedSurvey::new(Some(json!([
            ["B19001_001E", "B19001_002E", "B19001_003E"],
            ["0", "0", "0"]
        ])));
        let fetcher = FieldGroupFetcher::new(&api, SchemaRegistry::builtin());

        let fields = fetcher
            .fetch(Dataset::IncomeBrackets, &tract(), year(2021))
            .await
            .into_fields();

        assert_eq!(
            fields,
            Fields::from([("Total Households (B19001)".to_string(), json!(0))])
        );
    }

    #[tokio::test]
    async fn test_income_full_brackets() {
        let api = CannedSurvey::new(Some(json!([
            ["B19001_001E", "B19001_002E", "B19001_017E"],
            ["1200", "85", "40"]
        ])));
        let fetcher = FieldGroupFetcher::new(&api, SchemaRegistry::builtin());

        let fields = fetcher
            .fetch(Dataset::IncomeBrackets, &tract(), year(2021))
            .await
            .into_fields();

        assert_eq!(fields.len(), 17);
        assert_eq!(fields["Total Households (B19001)"], json!("1200"));
        assert_eq!(fields["Less than $10,000"], json!("85"));
        assert_eq!(fields["$200,000 or more"], json!("40"));
        assert_eq!(fields["$50,000 to $59,999"], Value::Null);

        let calls = api.calls.lock().unwrap();
        assert_eq!(calls[0].0, Endpoint::Detailed(year(2021)));
        assert_eq!(calls[0].1.first().map(String::as_str), Some("B19001_001E"));
    }

    #[test]
    fn test_zero_base_detection() {
        assert!(is_zero_base(None));
        assert!(is_zero_base(Some(&Value::Null)));
        assert!(is_zero_base(Some(&json!("0"))));
        assert!(is_zero_base(Some(&json!(0))));
        assert!(!is_zero_base(Some(&json!("12"))));
        assert!(!is_zero_base(Some(&json!("-666666666"))));
    }
}
