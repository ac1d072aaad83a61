//! Threshold recoding of numeric fields into ordered categories
//!
//! Each derived category is described by an ordered list of
//! (predicate, label) rules. Rules are evaluated top to bottom and the first
//! match wins, so a boundary value belongs to the band whose rule first
//! accepts it.

use crate::models::types::{AgeGroup, BmiCategory, SocioeconomicCategory};

/// Numeric test applied by a recoding rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate {
    /// Value strictly below the limit
    Below(f64),
    /// Value at or above the limit
    AtLeast(f64),
}

impl Predicate {
    #[must_use]
    pub fn matches(&self, value: f64) -> bool {
        match *self {
            Self::Below(limit) => value < limit,
            Self::AtLeast(limit) => value >= limit,
        }
    }
}

/// A single (predicate, label) pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule<L> {
    pub predicate: Predicate,
    pub label: L,
}

impl<L> Rule<L> {
    pub const fn new(predicate: Predicate, label: L) -> Self {
        Self { predicate, label }
    }
}

/// Age group: under 18 is pediatric
pub const AGE_GROUP_RULES: [Rule<AgeGroup>; 2] = [
    Rule::new(Predicate::Below(18.0), AgeGroup::Pediatric),
    Rule::new(Predicate::AtLeast(18.0), AgeGroup::Adult),
];

/// BMI bands in kg/m²
pub const BMI_RULES: [Rule<BmiCategory>; 4] = [
    Rule::new(Predicate::Below(18.5), BmiCategory::Underweight),
    Rule::new(Predicate::Below(25.0), BmiCategory::Normal),
    Rule::new(Predicate::Below(30.0), BmiCategory::Overweight),
    Rule::new(Predicate::AtLeast(30.0), BmiCategory::Obese),
];

/// Socioeconomic bands on the income-to-poverty ratio
pub const SES_RULES: [Rule<SocioeconomicCategory>; 3] = [
    Rule::new(Predicate::Below(1.3), SocioeconomicCategory::Low),
    Rule::new(Predicate::Below(3.5), SocioeconomicCategory::Middle),
    Rule::new(Predicate::AtLeast(3.5), SocioeconomicCategory::High),
];

/// Classify a value against an ordered rule list
///
/// Returns `None` when the value is missing or when no rule accepts it
/// (only possible for NaN with the rule tables above).
#[must_use]
pub fn classify<L: Copy>(rules: &[Rule<L>], value: Option<f64>) -> Option<L> {
    let value = value?;
    rules
        .iter()
        .find(|rule| rule.predicate.matches(value))
        .map(|rule| rule.label)
}

#[must_use]
pub fn age_group(age: Option<f64>) -> Option<AgeGroup> {
    classify(&AGE_GROUP_RULES, age)
}

#[must_use]
pub fn bmi_category(bmi: Option<f64>) -> Option<BmiCategory> {
    classify(&BMI_RULES, bmi)
}

#[must_use]
pub fn ses_category(ratio: Option<f64>) -> Option<SocioeconomicCategory> {
    classify(&SES_RULES, ratio)
}
