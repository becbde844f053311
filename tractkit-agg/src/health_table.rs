//! Local health-indicator table (PLACES tract-level release)
//!
//! One delimited file per year, loaded at most once per request and indexed by
//! `locationid`. Header names are normalized (trimmed, lower-cased, spaces
//! removed) before lookup, so `LocationID` and `Data_Value_Unit ` both match.

use crate::record::Fields;
use crate::tract::TractId;
use crate::year::SurveyYear;
use serde_json::Value;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tractkit_common::config::TomlConfig;
use tracing::{debug, info, warn};

/// Health table load failures
#[derive(Debug, Error)]
pub enum HealthTableError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("Loader task failed: {0}")]
    Join(String),
}

fn normalize_header(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "")
}

/// Measure → value rows indexed by tract
#[derive(Debug, Default)]
pub struct HealthTable {
    by_tract: HashMap<String, Vec<(String, Value)>>,
}

impl HealthTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a delimited table
    ///
    /// Requires `locationid` and `measure` columns; `data_value` and
    /// `data_value_unit` are optional. A blank value becomes null, otherwise
    /// the unit (if any) is appended to the value text.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, HealthTableError> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
        let column = |name: &str| headers.iter().position(|h| h == name);

        let location_col =
            column("locationid").ok_or(HealthTableError::MissingColumn("locationid"))?;
        let measure_col = column("measure").ok_or(HealthTableError::MissingColumn("measure"))?;
        let value_col = column("data_value");
        let unit_col = column("data_value_unit");

        let mut by_tract: HashMap<String, Vec<(String, Value)>> = HashMap::new();
        for row in reader.records() {
            let row = row?;
            let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).unwrap_or("").trim();

            let location = cell(Some(location_col));
            let measure = cell(Some(measure_col));
            if location.is_empty() || measure.is_empty() {
                continue;
            }

            let value = match cell(value_col) {
                "" => Value::Null,
                v => Value::String(format!("{v}{}", cell(unit_col))),
            };

            by_tract
                .entry(location.to_string())
                .or_default()
                .push((measure.to_string(), value));
        }

        Ok(Self { by_tract })
    }

    pub fn from_path(path: &Path) -> Result<Self, HealthTableError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(io::BufReader::new(file))
    }

    /// Parse on the blocking pool
    pub async fn load(path: PathBuf) -> Result<Self, HealthTableError> {
        tokio::task::spawn_blocking(move || Self::from_path(&path))
            .await
            .map_err(|e| HealthTableError::Join(e.to_string()))?
    }

    /// Table configured for `year`, or an empty table when none is
    /// configured or the file cannot be read
    pub async fn load_for_year(config: &TomlConfig, year: SurveyYear) -> Self {
        let Some(path) = config.health_table_path(&year.token()) else {
            warn!(year = %year, "No health table configured for year");
            return Self::empty();
        };

        match Self::load(path.clone()).await {
            Ok(table) => {
                info!(
                    year = %year,
                    path = %path.display(),
                    tracts = table.tract_count(),
                    "Loaded health table"
                );
                table
            }
            Err(e) => {
                warn!(
                    year = %year,
                    path = %path.display(),
                    error = %e,
                    "Failed to load health table"
                );
                Self::empty()
            }
        }
    }

    /// Measure → value mapping for one tract; later rows win on repeated measures
    pub fn rows_for(&self, tract: &TractId) -> Fields {
        let Some(rows) = self.by_tract.get(tract.as_str()) else {
            debug!(tract = %tract, "No health indicators for tract");
            return Fields::new();
        };
        rows.iter().cloned().collect()
    }

    pub fn tract_count(&self) -> usize {
        self.by_tract.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tract.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    const SAMPLE: &str = "\
Year,StateAbbr, LocationID ,Measure,Data_Value_Unit,Data_Value,MeasureId
2022,CA,06037123456,Obesity among adults,%,32.1,OBESITY
2022,CA,06037123456,Current asthma among adults,%,9.8,CASTHMA
2022,CA,06037123456,Suppressed measure,%,,SUPP
2022,CA,06037999999,Obesity among adults,%,25.0,OBESITY
2022,CA, 06037123456 ,Total population,,4012,POP
";

    fn tract(id: &str) -> TractId {
        TractId::parse(id).unwrap()
    }

    #[test]
    fn test_rows_for_tract() {
        let table = HealthTable::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(table.tract_count(), 2);

        let fields = table.rows_for(&tract("06037123456"));
        assert_eq!(fields.len(), 4);
        assert_eq!(fields["Obesity among adults"], json!("32.1%"));
        assert_eq!(fields["Current asthma among adults"], json!("9.8%"));
        assert_eq!(fields["Suppressed measure"], Value::Null);
        assert_eq!(fields["Total population"], json!("4012"));
    }

    #[test]
    fn test_unknown_tract_is_empty() {
        let table = HealthTable::from_reader(SAMPLE.as_bytes()).unwrap();
        assert!(table.rows_for(&tract("01001000100")).is_empty());
    }

    #[test]
    fn test_missing_locationid_column() {
        let result = HealthTable::from_reader("Measure,Data_Value\nObesity,30\n".as_bytes());
        assert!(matches!(result, Err(HealthTableError::MissingColumn("locationid"))));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let table = HealthTable::load(file.path().to_path_buf()).await.unwrap();
        assert!(!table.is_empty());
    }

    #[tokio::test]
    async fn test_load_for_year_uses_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("places_2022.csv"), SAMPLE).unwrap();

        let mut config = TomlConfig::default();
        config.data_dir = dir.path().to_path_buf();
        config
            .health_tables
            .insert("2022".to_string(), PathBuf::from("places_2022.csv"));

        let table = HealthTable::load_for_year(&config, SurveyYear::new(2022)).await;
        assert_eq!(table.tract_count(), 2);
    }

    #[tokio::test]
    async fn test_load_for_year_absorbs_failures() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = TomlConfig::default();
        config.data_dir = dir.path().to_path_buf();

        // configured but absent on disk
        assert!(HealthTable::load_for_year(&config, SurveyYear::new(2021)).await.is_empty());
        // not configured
        assert!(HealthTable::load_for_year(&config, SurveyYear::new(2015)).await.is_empty());
    }
}
