//! Common domain type definitions
//!
//! Categorical values derived during recoding, and the [`Variable`] catalogue
//! that names every column of the analysis table.

use serde::Serialize;

/// A categorical value with a fixed, ordered set of levels
pub trait Category: Copy + Eq + std::fmt::Debug + 'static {
    /// All levels in their reporting order
    const LEVELS: &'static [Self];

    /// Human-readable label of the level
    fn label(self) -> &'static str;
}

/// Sex of a subject, from `RIAGENDR`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Map the survey code (1 = male, 2 = female); anything else is unmapped
    #[must_use]
    pub fn from_code(code: f64) -> Option<Self> {
        match code {
            c if c == 1.0 => Some(Self::Male),
            c if c == 2.0 => Some(Self::Female),
            _ => None,
        }
    }
}

impl Category for Sex {
    const LEVELS: &'static [Self] = &[Self::Male, Self::Female];

    fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

/// Self-reported diabetes diagnosis, from `DIQ010`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiabetesStatus {
    Yes,
    No,
}

impl DiabetesStatus {
    /// Map the survey code (1 = yes, 2 = no); borderline, refused and
    /// don't-know codes are unmapped
    #[must_use]
    pub fn from_code(code: f64) -> Option<Self> {
        match code {
            c if c == 1.0 => Some(Self::Yes),
            c if c == 2.0 => Some(Self::No),
            _ => None,
        }
    }
}

impl Category for DiabetesStatus {
    const LEVELS: &'static [Self] = &[Self::Yes, Self::No];

    fn label(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }
}

/// Age group split at 18 years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AgeGroup {
    Pediatric,
    Adult,
}

impl Category for AgeGroup {
    const LEVELS: &'static [Self] = &[Self::Pediatric, Self::Adult];

    fn label(self) -> &'static str {
        match self {
            Self::Pediatric => "Pediatric",
            Self::Adult => "Adult",
        }
    }
}

/// WHO body-mass index bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl Category for BmiCategory {
    const LEVELS: &'static [Self] = &[
        Self::Underweight,
        Self::Normal,
        Self::Overweight,
        Self::Obese,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Underweight => "Underweight",
            Self::Normal => "Normal",
            Self::Overweight => "Overweight",
            Self::Obese => "Obese",
        }
    }
}

/// Socioeconomic band on the family income-to-poverty ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SocioeconomicCategory {
    Low,
    Middle,
    High,
}

impl Category for SocioeconomicCategory {
    const LEVELS: &'static [Self] = &[Self::Low, Self::Middle, Self::High];

    fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Middle => "Middle",
            Self::High => "High",
        }
    }
}

/// Kind of a column in the analysis table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Identifier,
    Continuous,
    Categorical,
}

/// Every column of the analysis table, addressed by its semantic name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    Id,
    Age,
    Sex,
    IncomeRatio,
    Bmi,
    Cholesterol,
    Glucose,
    Protein,
    Sugar,
    Diabetes,
    AgeGroup,
    BmiCategory,
    SesCategory,
}

impl Variable {
    pub const ALL: [Self; 13] = [
        Self::Id,
        Self::Age,
        Self::Sex,
        Self::IncomeRatio,
        Self::Bmi,
        Self::Cholesterol,
        Self::Glucose,
        Self::Protein,
        Self::Sugar,
        Self::Diabetes,
        Self::AgeGroup,
        Self::BmiCategory,
        Self::SesCategory,
    ];

    /// Column name used in configuration and reports
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Age => "age",
            Self::Sex => "sex",
            Self::IncomeRatio => "income_ratio",
            Self::Bmi => "bmi",
            Self::Cholesterol => "cholesterol",
            Self::Glucose => "glucose",
            Self::Protein => "protein",
            Self::Sugar => "sugar",
            Self::Diabetes => "diabetes",
            Self::AgeGroup => "age_group",
            Self::BmiCategory => "bmi_category",
            Self::SesCategory => "ses_category",
        }
    }

    /// Axis and table label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Id => "Subject ID",
            Self::Age => "Age (years)",
            Self::Sex => "Sex",
            Self::IncomeRatio => "Income-to-poverty ratio",
            Self::Bmi => "BMI (kg/m²)",
            Self::Cholesterol => "Total cholesterol (mg/dL)",
            Self::Glucose => "Fasting glucose (mg/dL)",
            Self::Protein => "Protein intake (g)",
            Self::Sugar => "Sugar intake (g)",
            Self::Diabetes => "Diabetes",
            Self::AgeGroup => "Age group",
            Self::BmiCategory => "BMI category",
            Self::SesCategory => "Socioeconomic status",
        }
    }

    /// Look a variable up by its column name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.name() == name.trim())
    }

    #[must_use]
    pub const fn kind(self) -> VariableKind {
        match self {
            Self::Id => VariableKind::Identifier,
            Self::Age
            | Self::IncomeRatio
            | Self::Bmi
            | Self::Cholesterol
            | Self::Glucose
            | Self::Protein
            | Self::Sugar => VariableKind::Continuous,
            Self::Sex
            | Self::Diabetes
            | Self::AgeGroup
            | Self::BmiCategory
            | Self::SesCategory => VariableKind::Categorical,
        }
    }

    /// Declared level labels of a categorical variable
    #[must_use]
    pub fn levels(self) -> Option<Vec<&'static str>> {
        fn labels<C: Category>() -> Vec<&'static str> {
            C::LEVELS.iter().map(|level| level.label()).collect()
        }

        match self {
            Self::Sex => Some(labels::<Sex>()),
            Self::Diabetes => Some(labels::<DiabetesStatus>()),
            Self::AgeGroup => Some(labels::<AgeGroup>()),
            Self::BmiCategory => Some(labels::<BmiCategory>()),
            Self::SesCategory => Some(labels::<SocioeconomicCategory>()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_mapping() {
        assert_eq!(Sex::from_code(1.0), Some(Sex::Male));
        assert_eq!(Sex::from_code(2.0), Some(Sex::Female));
        assert_eq!(Sex::from_code(3.0), None);
        assert_eq!(DiabetesStatus::from_code(1.0), Some(DiabetesStatus::Yes));
        assert_eq!(DiabetesStatus::from_code(2.0), Some(DiabetesStatus::No));
        assert_eq!(DiabetesStatus::from_code(3.0), None);
        assert_eq!(DiabetesStatus::from_code(9.0), None);
    }

    #[test]
    fn test_variable_lookup() {
        for variable in Variable::ALL {
            assert_eq!(Variable::from_name(variable.name()), Some(variable));
        }
        assert_eq!(Variable::from_name("RIDAGEYR"), None);
        assert_eq!(
            Variable::BmiCategory.levels().unwrap(),
            vec!["Underweight", "Normal", "Overweight", "Obese"]
        );
        assert!(Variable::Bmi.levels().is_none());
    }
}
