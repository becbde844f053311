//! Census tract identifier

use std::fmt;
use thiserror::Error;

/// Malformed tract identifier parts
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TractIdError {
    #[error("State code must be 2 digits, got '{0}'")]
    State(String),

    #[error("County code must be 3 digits, got '{0}'")]
    County(String),

    #[error("Tract code must be at most 6 digits, got '{0}'")]
    Tract(String),

    #[error("Tract identifier must be 11 digits, got '{0}'")]
    Length(String),
}

/// 11-digit tract identifier: state(2) + county(3) + tract(6)
///
/// Always exactly 11 ASCII digits; constructed only through [`TractId::from_parts`]
/// or [`TractId::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TractId(String);

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl TractId {
    /// Build from geography lookup parts, zero-padding the tract code to 6
    pub fn from_parts(state: &str, county: &str, tract: &str) -> Result<Self, TractIdError> {
        let (state, county, tract) = (state.trim(), county.trim(), tract.trim());
        if state.len() != 2 || !all_digits(state) {
            return Err(TractIdError::State(state.to_string()));
        }
        if county.len() != 3 || !all_digits(county) {
            return Err(TractIdError::County(county.to_string()));
        }
        if tract.len() > 6 || !all_digits(tract) {
            return Err(TractIdError::Tract(tract.to_string()));
        }
        Ok(Self(format!("{state}{county}{tract:0>6}")))
    }

    /// Parse an already-concatenated 11-digit identifier
    pub fn parse(s: &str) -> Result<Self, TractIdError> {
        let s = s.trim();
        if s.len() != 11 || !all_digits(s) {
            return Err(TractIdError::Length(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Characters 0–1
    pub fn state(&self) -> &str {
        &self.0[0..2]
    }

    /// Characters 2–4
    pub fn county(&self) -> &str {
        &self.0[2..5]
    }

    /// Characters 5–10
    pub fn tract(&self) -> &str {
        &self.0[5..11]
    }
}

impl fmt::Display for TractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
