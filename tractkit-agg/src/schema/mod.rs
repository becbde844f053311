//! Dataset schema registry
//!
//! Declarative table describing, for each statistical dataset and year band:
//! - which endpoint shape to call
//! - the ordered field codes to request
//! - the code → output label mapping
//!
//! All year-dependent variation of the survey API lives in [`tables`]; the
//! fetchers never branch on the year themselves.

mod tables;

use crate::year::SurveyYear;
use once_cell::sync::Lazy;
use std::fmt;
use thiserror::Error;

/// One statistical table (field group) the aggregator can fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    /// B19001 household income brackets
    IncomeBrackets,
    /// DP02 household composition, computer access, language spoken at home
    HouseholdProfile,
    /// S2502 educational attainment
    EducationAttainment,
    /// S0101 age and sex
    AgeSex,
    /// S0101 alternate field layout (2015)
    AgeSexAlternate,
    /// DP03 employment, commute, benefits
    Employment,
    /// DP04 vehicle access
    VehicleAccess,
    /// S2701 health insurance coverage
    Insurance,
    /// S2701 uninsured count (2013–2014 layout)
    InsuranceAlternate,
    /// S2902 extended social characteristics
    SocialCollege,
    /// S1701 poverty rate
    Poverty,
    /// P9 Hispanic or Latino origin (decennial)
    HispanicOrigin,
    /// H1 housing unit count (decennial)
    HousingUnits,
}

impl Dataset {
    pub const ALL: [Dataset; 13] = [
        Dataset::IncomeBrackets,
        Dataset::HouseholdProfile,
        Dataset::EducationAttainment,
        Dataset::AgeSex,
        Dataset::AgeSexAlternate,
        Dataset::Employment,
        Dataset::VehicleAccess,
        Dataset::Insurance,
        Dataset::InsuranceAlternate,
        Dataset::SocialCollege,
        Dataset::Poverty,
        Dataset::HispanicOrigin,
        Dataset::HousingUnits,
    ];

    /// Survey table code; its prefix selects the endpoint family
    pub fn table_code(self) -> &'static str {
        match self {
            Dataset::IncomeBrackets => "B19001",
            Dataset::HouseholdProfile => "DP02",
            Dataset::EducationAttainment => "S2502",
            Dataset::AgeSex | Dataset::AgeSexAlternate => "S0101",
            Dataset::Employment => "DP03",
            Dataset::VehicleAccess => "DP04",
            Dataset::Insurance | Dataset::InsuranceAlternate => "S2701",
            Dataset::SocialCollege => "S2902",
            Dataset::Poverty => "S1701",
            Dataset::HispanicOrigin => "P9",
            Dataset::HousingUnits => "H1",
        }
    }

    /// Denominator field whose zero value means "no base population"
    ///
    /// When the denominator is `"0"` or absent, the fetch yields only
    /// `{label: 0}` instead of the full field set.
    pub fn zero_base(self) -> Option<ZeroBase> {
        match self {
            Dataset::IncomeBrackets => Some(ZeroBase {
                code: "B19001_001E",
                label: "Total Households (B19001)",
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.table_code())
    }
}

/// Zero-base marker for a denominator field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroBase {
    pub code: &'static str,
    pub label: &'static str,
}

/// Set of survey years sharing one field layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearBand {
    /// Inclusive range
    Range(u16, u16),
    /// Enumerated years
    Years(&'static [u16]),
}

impl YearBand {
    pub fn contains(&self, year: SurveyYear) -> bool {
        let y = year.get();
        match self {
            YearBand::Range(lo, hi) => (*lo..=*hi).contains(&y),
            YearBand::Years(years) => years.contains(&y),
        }
    }

    /// Number of years covered; smaller is more specific
    pub fn width(&self) -> usize {
        match self {
            YearBand::Range(lo, hi) => usize::from(hi.saturating_sub(*lo)) + 1,
            YearBand::Years(years) => years.len(),
        }
    }

    fn years(&self) -> Vec<u16> {
        match self {
            YearBand::Range(lo, hi) => (*lo..=*hi).collect(),
            YearBand::Years(years) => years.to_vec(),
        }
    }
}

/// How a schema entry chooses its endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointShape {
    /// Apply [`resolve_endpoint`] to the dataset's table code
    ByTableCode,
    /// Always the subject-table endpoint for the year
    Subject,
    /// Always the demographic-profile endpoint for the year
    Profile,
}

/// Concrete survey endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `{year}/acs/acs5/subject`
    Subject(SurveyYear),
    /// `{year}/acs/acs5/profile`
    Profile(SurveyYear),
    /// `2020/dec/dhc`, independent of the requested year
    Decennial2020,
    /// `{year}/acs/acs5`
    Detailed(SurveyYear),
}

impl Endpoint {
    /// Path below the survey API root
    pub fn path(&self) -> String {
        match self {
            Endpoint::Subject(year) => format!("{year}/acs/acs5/subject"),
            Endpoint::Profile(year) => format!("{year}/acs/acs5/profile"),
            Endpoint::Decennial2020 => "2020/dec/dhc".to_string(),
            Endpoint::Detailed(year) => format!("{year}/acs/acs5"),
        }
    }

    /// Full URL under `base_url` (trailing slash tolerated)
    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.path())
    }
}

/// Endpoint family for a table code in a given year
///
/// 1. `S…` and year ≥ 2016 → subject tables
/// 2. `DP…` → demographic profile
/// 3. `P…` or `H…` → 2020 decennial (not parameterized by year)
/// 4. otherwise → 5-year detailed estimates
pub fn resolve_endpoint(year: SurveyYear, table_code: &str) -> Endpoint {
    if table_code.starts_with('S') && year.get() >= 2016 {
        Endpoint::Subject(year)
    } else if table_code.starts_with("DP") {
        Endpoint::Profile(year)
    } else if table_code.starts_with('P') || table_code.starts_with('H') {
        Endpoint::Decennial2020
    } else {
        Endpoint::Detailed(year)
    }
}

/// One (dataset, year band) layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntry {
    pub dataset: Dataset,
    pub band: YearBand,
    pub endpoint: EndpointShape,
    /// Ordered (field code, output label) pairs
    pub fields: &'static [(&'static str, &'static str)],
}

impl SchemaEntry {
    pub fn endpoint_for(&self, year: SurveyYear) -> Endpoint {
        match self.endpoint {
            EndpointShape::ByTableCode => resolve_endpoint(year, self.dataset.table_code()),
            EndpointShape::Subject => Endpoint::Subject(year),
            EndpointShape::Profile => Endpoint::Profile(year),
        }
    }

    /// Field codes in request order
    pub fn codes(&self) -> Vec<&'static str> {
        self.fields.iter().map(|(code, _)| *code).collect()
    }
}

/// Malformed schema table
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{0} has an empty field list")]
    EmptyFields(Dataset),

    #[error("{dataset} lists field code {code} twice")]
    DuplicateCode { dataset: Dataset, code: &'static str },

    #[error("{dataset} has two equally specific entries covering {year}")]
    Ambiguous { dataset: Dataset, year: u16 },
}

static BUILTIN: Lazy<SchemaRegistry> = Lazy::new(|| {
    SchemaRegistry::new(tables::builtin_entries()).expect("built-in schema table is valid")
});

/// Registry of schema entries, looked up by dataset and year band membership
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    entries: Vec<SchemaEntry>,
}

impl SchemaRegistry {
    /// Validate and build a registry
    ///
    /// Rejects entries with no fields, duplicate codes within an entry, and two
    /// entries of one dataset that cover the same year with the same width.
    pub fn new(entries: Vec<SchemaEntry>) -> Result<Self, SchemaError> {
        for entry in &entries {
            if entry.fields.is_empty() {
                return Err(SchemaError::EmptyFields(entry.dataset));
            }
            for (i, &(code, _)) in entry.fields.iter().enumerate() {
                if entry.fields[..i].iter().any(|&(c, _)| c == code) {
                    return Err(SchemaError::DuplicateCode {
                        dataset: entry.dataset,
                        code,
                    });
                }
            }
        }

        for (i, a) in entries.iter().enumerate() {
            for b in &entries[i + 1..] {
                if a.dataset != b.dataset || a.band.width() != b.band.width() {
                    continue;
                }
                if let Some(year) = a
                    .band
                    .years()
                    .into_iter()
                    .find(|y| b.band.contains(SurveyYear::new(*y)))
                {
                    return Err(SchemaError::Ambiguous {
                        dataset: a.dataset,
                        year,
                    });
                }
            }
        }

        Ok(Self { entries })
    }

    /// Process-wide registry built from the compiled-in table
    pub fn builtin() -> &'static SchemaRegistry {
        &BUILTIN
    }

    /// Most specific entry whose band contains `year`
    pub fn entry(&self, dataset: Dataset, year: SurveyYear) -> Option<&SchemaEntry> {
        self.entries
            .iter()
            .filter(|e| e.dataset == dataset && e.band.contains(year))
            .min_by_key(|e| e.band.width())
    }

    /// Ordered (code, label) pairs; empty when the year is not supported
    pub fn fields_for(
        &self,
        dataset: Dataset,
        year: SurveyYear,
    ) -> &'static [(&'static str, &'static str)] {
        self.entry(dataset, year).map(|e| e.fields).unwrap_or(&[])
    }

    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }
}
