//! Year eligibility rules and statistical merge plan
//!
//! [`MERGE_PLAN`] lists every dataset in the order its fields are merged into a
//! record (later steps overwrite earlier ones on label collisions) together
//! with the rule deciding whether it runs for a given year.

use crate::schema::Dataset;
use crate::year::SurveyYear;

/// Pure predicate over the survey year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearRule {
    /// Every year
    Always,
    /// Exactly one of the listed years
    AnyOf(&'static [u16]),
    /// The given year or later
    AtLeast(u16),
}

impl YearRule {
    pub fn applies(&self, year: SurveyYear) -> bool {
        match self {
            YearRule::Always => true,
            YearRule::AnyOf(years) => years.contains(&year.get()),
            YearRule::AtLeast(min) => year.get() >= *min,
        }
    }
}

/// One dataset in the merge plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanStep {
    pub dataset: Dataset,
    pub rule: YearRule,
    /// Run only when this other dataset contributed no fields
    pub fallback_for: Option<Dataset>,
}

const fn step(dataset: Dataset, rule: YearRule) -> PlanStep {
    PlanStep {
        dataset,
        rule,
        fallback_for: None,
    }
}

/// Statistical datasets in merge order
pub const MERGE_PLAN: [PlanStep; 13] = [
    step(Dataset::Employment, YearRule::AnyOf(&[2023, 2017, 2012, 2010])),
    PlanStep {
        dataset: Dataset::AgeSexAlternate,
        rule: YearRule::AnyOf(&[2015]),
        fallback_for: Some(Dataset::AgeSex),
    },
    step(Dataset::VehicleAccess, YearRule::AtLeast(2015)),
    step(Dataset::Insurance, YearRule::AtLeast(2015)),
    step(Dataset::InsuranceAlternate, YearRule::AnyOf(&[2013, 2014])),
    step(Dataset::SocialCollege, YearRule::AtLeast(2018)),
    step(Dataset::Poverty, YearRule::AtLeast(2012)),
    step(Dataset::HispanicOrigin, YearRule::AnyOf(&[2020])),
    step(Dataset::HousingUnits, YearRule::AnyOf(&[2020])),
    step(Dataset::IncomeBrackets, YearRule::Always),
    step(Dataset::HouseholdProfile, YearRule::Always),
    step(Dataset::EducationAttainment, YearRule::Always),
    step(Dataset::AgeSex, YearRule::Always),
];

/// Rule for a dataset
pub fn rule_for(dataset: Dataset) -> YearRule {
    MERGE_PLAN
        .iter()
        .find(|s| s.dataset == dataset)
        .map(|s| s.rule)
        .unwrap_or(YearRule::Always)
}

/// Whether `dataset` applies to `year`
pub fn is_eligible(dataset: Dataset, year: SurveyYear) -> bool {
    rule_for(dataset).applies(year)
}

/// Steps that apply to `year`, in merge order
pub fn eligible_steps(year: SurveyYear) -> Vec<PlanStep> {
    MERGE_PLAN
        .iter()
        .copied()
        .filter(|s| s.rule.applies(year))
        .collect()
}
