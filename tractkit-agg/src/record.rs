//! Per-address record and merge helpers

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Label → normalized value (string, number or null)
pub type Fields = BTreeMap<String, Value>;

/// Merged output for one address
///
/// Serializes as `{"GeneralInfo": {...}, "CDC": {...}, "Census": {...}}`,
/// which is also the input shape accepted by `/api/download`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Year, Address, Latitude, Longitude, TractFIPS
    #[serde(rename = "GeneralInfo", default)]
    pub general: Fields,
    /// Health-indicator measures
    #[serde(rename = "CDC", default)]
    pub health: Fields,
    /// Statistical-survey fields
    #[serde(rename = "Census", default)]
    pub census: Fields,
}

impl Record {
    /// Single label → value view
    ///
    /// Sub-mappings are applied general, then health, then census; a label
    /// present in more than one keeps the census value.
    pub fn flatten(&self) -> Fields {
        let mut flat = Fields::new();
        merge_into(&mut flat, self.general.clone());
        merge_into(&mut flat, self.health.clone());
        merge_into(&mut flat, self.census.clone());
        flat
    }
}

/// Last-write-wins merge: entries of `source` overwrite same-label entries of `target`
pub fn merge_into(target: &mut Fields, source: Fields) {
    target.extend(source);
}
