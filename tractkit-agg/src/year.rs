//! Survey year token

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Invalid survey year token
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid survey year '{0}': expected a 4-digit year")]
pub struct YearParseError(pub String);

/// Survey year as a numeric ordinal
///
/// The external token ("2020") is only a lookup key; every range comparison is
/// numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurveyYear(u16);

impl SurveyYear {
    pub const fn new(year: u16) -> Self {
        Self(year)
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    /// External string token, e.g. `"2020"`
    pub fn token(self) -> String {
        self.0.to_string()
    }
}

impl FromStr for SurveyYear {
    type Err = YearParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token.len() != 4 || !token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(YearParseError(s.to_string()));
        }
        token
            .parse::<u16>()
            .map(Self)
            .map_err(|_| YearParseError(s.to_string()))
    }
}

impl fmt::Display for SurveyYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
