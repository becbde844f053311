//! Compiled-in field layouts per dataset and year band
//!
//! Labels are output column names and must stay stable across releases.

use super::{Dataset, EndpointShape, SchemaEntry, YearBand};

const INCOME_BRACKETS: &[(&str, &str)] = &[
    ("B19001_001E", "Total Households (B19001)"),
    ("B19001_002E", "Less than $10,000"),
    ("B19001_003E", "$10,000 to $14,999"),
    ("B19001_004E", "$15,000 to $19,999"),
    ("B19001_005E", "$20,000 to $24,999"),
    ("B19001_006E", "$25,000 to $29,999"),
    ("B19001_007E", "$30,000 to $34,999"),
    ("B19001_008E", "$35,000 to $39,999"),
    ("B19001_009E", "$40,000 to $44,999"),
    ("B19001_010E", "$45,000 to $49,999"),
    ("B19001_011E", "$50,000 to $59,999"),
    ("B19001_012E", "$60,000 to $74,999"),
    ("B19001_013E", "$75,000 to $99,999"),
    ("B19001_014E", "$100,000 to $124,999"),
    ("B19001_015E", "$125,000 to $149,999"),
    ("B19001_016E", "$150,000 to $199,999"),
    ("B19001_017E", "$200,000 or more"),
];

// DP02 renumbered its computer/broadband and language rows several times.
// 2023 requests the margin-of-error column for total households.
const HOUSEHOLD_2023: &[(&str, &str)] = &[
    ("DP02_0001M", "Total Households"),
    ("DP02_0002PE", "Married-Couple Households (%)"),
    ("DP02_0012PE", "Female Householder, No Spouse (%)"),
    ("DP02_0153PE", "Households with a Computer (%)"),
    ("DP02_0154PE", "Households with Broadband (%)"),
    ("DP02_0116PE", "Speak Spanish at Home (%)"),
    ("DP02_0118PE", "Speak Other Indo-European Languages at Home (%)"),
    ("DP02_0120PE", "Speak Asian & Pacific Island Languages at Home (%)"),
    ("DP02_0122PE", "Speak Other Languages at Home (%)"),
];

const HOUSEHOLD_2022: &[(&str, &str)] = &[
    ("DP02_0001E", "Total Households"),
    ("DP02_0002PE", "Married-Couple Households (%)"),
    ("DP02_0012PE", "Female Householder, No Spouse (%)"),
    ("DP02_0153PE", "Households with a Computer (%)"),
    ("DP02_0154PE", "Households with Broadband (%)"),
    ("DP02_0116PE", "Speak Spanish at Home (%)"),
    ("DP02_0118PE", "Speak Other Indo-European Languages at Home (%)"),
    ("DP02_0120PE", "Speak Asian & Pacific Island Languages at Home (%)"),
    ("DP02_0122PE", "Speak Other Languages at Home (%)"),
];

const HOUSEHOLD_2020_2021: &[(&str, &str)] = &[
    ("DP02_0001E", "Total Households"),
    ("DP02_0002PE", "Married-Couple Households (%)"),
    ("DP02_0012PE", "Female Householder, No Spouse (%)"),
    ("DP02_0153PE", "Households with a Computer (%)"),
    ("DP02_0116PE", "Speak Spanish at Home (%)"),
    ("DP02_0122PE", "Speak Other Languages at Home (%)"),
];

const HOUSEHOLD_2019: &[(&str, &str)] = &[
    ("DP02_0001E", "Total Households"),
    ("DP02_0002PE", "Married-Couple Households (%)"),
    ("DP02_0012PE", "Female Householder, No Spouse (%)"),
    ("DP02_0152PE", "Households with a Computer (%)"),
    ("DP02_0115PE", "Speak Spanish at Home (%)"),
    ("DP02_0121PE", "Speak Other Languages at Home (%)"),
];

const HOUSEHOLD_2013_2018: &[(&str, &str)] = &[
    ("DP02_0001E", "Total Households"),
    ("DP02_0004PE", "Married-Couple Households (%)"),
    ("DP02_0008PE", "Female Householder, No Spouse (%)"),
    ("DP02_0151PE", "Households with a Computer (%)"),
    ("DP02_0114PE", "Speak Spanish at Home (%)"),
    ("DP02_0120PE", "Speak Other Languages at Home (%)"),
];

const HOUSEHOLD_2010_2012: &[(&str, &str)] = &[
    ("DP02_0001E", "Total Households"),
    ("DP02_0004PE", "Married-Couple Households (%)"),
    ("DP02_0008PE", "Female Householder, No Spouse (%)"),
    ("DP02_0114PE", "Speak Spanish at Home (%)"),
    ("DP02_0120PE", "Speak Other Languages at Home (%)"),
];

const EDUCATION: &[(&str, &str)] = &[("S2502_C01_018E", "Less than High School")];

const AGE_SEX: &[(&str, &str)] = &[
    ("S0101_C01_001E", "Total Poulation(S0101)"),
    ("S0101_C01_032E", "Median Age (S0101)"),
    ("S0101_C03_001E", "Male Population (S0101)"),
    ("S0101_C05_001E", "Female Population (S0101)"),
];

const AGE_SEX_2015: &[(&str, &str)] = &[
    ("S0101_C01_030E", "Median Age (S0101)"),
    ("S0101_C03_001E", "Female Population (S0101)"),
];

const EMPLOYMENT: &[(&str, &str)] = &[
    ("DP03_0005PE", "Unemployment Rate (%)"),
    ("DP03_0001PE", "Employment Rate (%)"),
    ("DP03_0018E", "Mean Commute Time (min)"),
    ("DP03_0092E", "Median Earnings (Male FT)"),
    ("DP03_0074E", "Households w/ SNAP"),
];

const VEHICLE: &[(&str, &str)] = &[("DP04_0058PE", "Households w/ No Vehicle (%)")];

const INSURANCE: &[(&str, &str)] = &[("S2701_C02_001E", "With Any Health Insurance")];

const INSURANCE_2013_2014: &[(&str, &str)] = &[("S2701_C04_001E", "Without Health Insurance")];

const SOCIAL_COLLEGE: &[(&str, &str)] = &[("S2902_C01_011E", "Some College, No Degree")];

const POVERTY: &[(&str, &str)] = &[("S1701_C03_001E", "Poverty Rate - Total")];

const HISPANIC: &[(&str, &str)] = &[("P9_002N", "Hispanic or Latino")];

const HOUSING_UNITS: &[(&str, &str)] = &[("H1_001N", "Housing Units")];

fn entry(
    dataset: Dataset,
    band: YearBand,
    endpoint: EndpointShape,
    fields: &'static [(&'static str, &'static str)],
) -> SchemaEntry {
    SchemaEntry {
        dataset,
        band,
        endpoint,
        fields,
    }
}

pub(super) fn builtin_entries() -> Vec<SchemaEntry> {
    use EndpointShape::{ByTableCode, Subject};
    use YearBand::{Range, Years};

    vec![
        entry(Dataset::IncomeBrackets, Range(2010, 2023), ByTableCode, INCOME_BRACKETS),
        entry(Dataset::HouseholdProfile, Years(&[2023]), ByTableCode, HOUSEHOLD_2023),
        entry(Dataset::HouseholdProfile, Years(&[2022]), ByTableCode, HOUSEHOLD_2022),
        entry(Dataset::HouseholdProfile, Range(2020, 2021), ByTableCode, HOUSEHOLD_2020_2021),
        entry(Dataset::HouseholdProfile, Years(&[2019]), ByTableCode, HOUSEHOLD_2019),
        entry(Dataset::HouseholdProfile, Range(2013, 2018), ByTableCode, HOUSEHOLD_2013_2018),
        entry(Dataset::HouseholdProfile, Range(2010, 2012), ByTableCode, HOUSEHOLD_2010_2012),
        entry(Dataset::EducationAttainment, Range(2010, 2023), ByTableCode, EDUCATION),
        entry(Dataset::AgeSex, Range(2010, 2023), ByTableCode, AGE_SEX),
        entry(Dataset::AgeSexAlternate, Years(&[2015]), ByTableCode, AGE_SEX_2015),
        entry(Dataset::Employment, Range(2010, 2023), ByTableCode, EMPLOYMENT),
        entry(Dataset::VehicleAccess, Range(2015, 2023), EndpointShape::Profile, VEHICLE),
        entry(Dataset::Insurance, Range(2015, 2023), ByTableCode, INSURANCE),
        entry(Dataset::InsuranceAlternate, Range(2013, 2014), Subject, INSURANCE_2013_2014),
        entry(Dataset::SocialCollege, Range(2018, 2023), ByTableCode, SOCIAL_COLLEGE),
        entry(Dataset::Poverty, Range(2012, 2023), ByTableCode, POVERTY),
        entry(Dataset::HispanicOrigin, Years(&[2020]), ByTableCode, HISPANIC),
        entry(Dataset::HousingUnits, Years(&[2020]), ByTableCode, HOUSING_UNITS),
    ]
}
