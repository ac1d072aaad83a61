//! Stratified summary table
//!
//! Strata are the cross-product of the declared levels of the stratification
//! variables, so every combination appears even when no subject falls in it.
//! A final "Overall" column covers every cleaned subject, including those
//! whose stratification value is missing.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::algorithm::statistics::descriptive::{mean, sample_sd};
use crate::error::{NhanesError, Result};
use crate::models::{AnalysisTable, Subject, Variable, VariableKind};

/// Label of the column covering all subjects
pub const OVERALL_LABEL: &str = "Overall";

/// Count and share of one level of a categorical variable
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelCount {
    pub level: &'static str,
    pub count: usize,
    /// Percentage of all the stratum's subjects, including those missing this
    /// variable, so the level percentages sum to less than 100 when `missing`
    /// is non-zero; `None` for an empty stratum
    pub percent: Option<f64>,
}

/// Summary of one variable within one stratum
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariableSummary {
    Continuous {
        variable: Variable,
        n: usize,
        missing: usize,
        mean: Option<f64>,
        sd: Option<f64>,
    },
    Categorical {
        variable: Variable,
        missing: usize,
        levels: Vec<LevelCount>,
    },
}

impl VariableSummary {
    #[must_use]
    pub fn variable(&self) -> Variable {
        match self {
            Self::Continuous { variable, .. } | Self::Categorical { variable, .. } => *variable,
        }
    }
}

/// One column of the summary table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StratumSummary {
    pub label: String,
    /// Level of each stratification variable; empty for the overall column
    pub levels: Vec<&'static str>,
    pub n: usize,
    pub variables: Vec<VariableSummary>,
}

/// Summary statistics for every stratum plus the overall column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    pub stratify_by: Vec<Variable>,
    pub strata: Vec<StratumSummary>,
}

impl SummaryTable {
    /// The stratum with the given levels, in stratification order
    #[must_use]
    pub fn stratum(&self, levels: &[&str]) -> Option<&StratumSummary> {
        self.strata
            .iter()
            .find(|s| !s.levels.is_empty() && s.levels.as_slice() == levels)
    }

    #[must_use]
    pub fn overall(&self) -> Option<&StratumSummary> {
        self.strata.iter().find(|s| s.levels.is_empty())
    }
}

/// Look a variable up by name and check its kind
fn resolve(name: &str, expected: VariableKind, role: &str) -> Result<Variable> {
    let variable = Variable::from_name(name)
        .ok_or_else(|| NhanesError::config_error(format!("unknown {role} variable '{name}'")))?;
    if variable.kind() != expected {
        return Err(NhanesError::config_error(format!(
            "{role} variable '{name}' is {:?}, expected {expected:?}",
            variable.kind()
        )));
    }
    Ok(variable)
}

fn summarize_variable(subjects: &[&Subject], variable: Variable) -> VariableSummary {
    match variable.levels() {
        None => {
            let values: Vec<f64> = subjects
                .iter()
                .filter_map(|s| s.numeric(variable))
                .collect();
            VariableSummary::Continuous {
                variable,
                n: values.len(),
                missing: subjects.len() - values.len(),
                mean: mean(&values),
                sd: sample_sd(&values),
            }
        }
        Some(levels) => {
            let observed: Vec<&str> = subjects
                .iter()
                .filter_map(|s| s.category(variable))
                .collect();
            let levels = levels
                .into_iter()
                .map(|level| {
                    let count = observed.iter().filter(|l| **l == level).count();
                    #[allow(clippy::cast_precision_loss)]
                    let percent = (!subjects.is_empty())
                        .then(|| 100.0 * count as f64 / subjects.len() as f64);
                    LevelCount {
                        level,
                        count,
                        percent,
                    }
                })
                .collect();
            VariableSummary::Categorical {
                variable,
                missing: subjects.len() - observed.len(),
                levels,
            }
        }
    }
}

fn summarize_stratum(
    label: String,
    levels: Vec<&'static str>,
    subjects: &[&Subject],
    variables: &[Variable],
) -> StratumSummary {
    StratumSummary {
        label,
        levels,
        n: subjects.len(),
        variables: variables
            .iter()
            .map(|v| summarize_variable(subjects, *v))
            .collect(),
    }
}

/// Build the stratified summary
///
/// # Errors
/// Returns a config error if no stratification variable is given, if a name
/// is unknown, or if a variable is of the wrong kind for its role
pub fn summarize(
    table: &AnalysisTable,
    continuous: &[String],
    categorical: &[String],
    stratify_by: &[String],
) -> Result<SummaryTable> {
    if stratify_by.is_empty() {
        return Err(NhanesError::config_error(
            "no stratification variable given",
        ));
    }
    let stratifiers = stratify_by
        .iter()
        .map(|name| resolve(name, VariableKind::Categorical, "stratification"))
        .collect::<Result<Vec<_>>>()?;

    let variables = continuous
        .iter()
        .map(|name| resolve(name, VariableKind::Continuous, "continuous"))
        .chain(
            categorical
                .iter()
                .map(|name| resolve(name, VariableKind::Categorical, "categorical")),
        )
        .collect::<Result<Vec<_>>>()?;

    let mut strata: Vec<StratumSummary> = stratifiers
        .iter()
        .map(|v| v.levels().unwrap_or_default())
        .multi_cartesian_product()
        .map(|levels| {
            let members: Vec<&Subject> = table
                .iter()
                .filter(|s| {
                    stratifiers
                        .iter()
                        .zip(&levels)
                        .all(|(v, level)| s.category(*v) == Some(*level))
                })
                .collect();
            summarize_stratum(levels.iter().join(" / "), levels, &members, &variables)
        })
        .collect();

    let everyone: Vec<&Subject> = table.iter().collect();
    strata.push(summarize_stratum(
        OVERALL_LABEL.to_string(),
        Vec::new(),
        &everyone,
        &variables,
    ));

    for stratum in &strata {
        log::debug!("Stratum {}: n = {}", stratum.label, stratum.n);
    }

    Ok(SummaryTable {
        stratify_by: stratifiers,
        strata,
    })
}

fn format_mean_sd(mean: Option<f64>, sd: Option<f64>) -> String {
    match (mean, sd) {
        (Some(m), Some(s)) => format!("{m:.1} ({s:.1})"),
        (Some(m), None) => format!("{m:.1} (-)"),
        _ => "-".to_string(),
    }
}

fn format_count(count: &LevelCount) -> String {
    match count.percent {
        Some(p) => format!("{} ({p:.1}%)", count.count),
        None => format!("{} (-)", count.count),
    }
}

impl fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rows: Vec<(String, Vec<String>)> = vec![(
            self.stratify_by.iter().join(" x "),
            self.strata.iter().map(|s| s.label.clone()).collect(),
        )];
        rows.push((
            "n".to_string(),
            self.strata.iter().map(|s| s.n.to_string()).collect(),
        ));

        let variable_count = self.strata.first().map_or(0, |s| s.variables.len());
        for index in 0..variable_count {
            let cells: Vec<&VariableSummary> =
                self.strata.iter().map(|s| &s.variables[index]).collect();
            let Some(first) = cells.first() else { continue };

            match first {
                VariableSummary::Continuous { variable, .. } => {
                    rows.push((
                        format!("{variable}, mean (SD)"),
                        cells
                            .iter()
                            .map(|c| match c {
                                VariableSummary::Continuous { mean, sd, .. } => {
                                    format_mean_sd(*mean, *sd)
                                }
                                VariableSummary::Categorical { .. } => String::new(),
                            })
                            .collect(),
                    ));
                }
                VariableSummary::Categorical {
                    variable, levels, ..
                } => {
                    rows.push((
                        format!("{variable}, n (%)"),
                        vec![String::new(); cells.len()],
                    ));
                    for (level_index, level) in levels.iter().enumerate() {
                        rows.push((
                            format!("  {}", level.level),
                            cells
                                .iter()
                                .map(|c| match c {
                                    VariableSummary::Categorical { levels, .. } => {
                                        levels
                                            .get(level_index)
                                            .map(format_count)
                                            .unwrap_or_default()
                                    }
                                    VariableSummary::Continuous { .. } => String::new(),
                                })
                                .collect(),
                        ));
                    }
                }
            }

            rows.push((
                "  missing".to_string(),
                cells
                    .iter()
                    .map(|c| match c {
                        VariableSummary::Continuous { missing, .. }
                        | VariableSummary::Categorical { missing, .. } => missing.to_string(),
                    })
                    .collect(),
            ));
        }

        let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
        let widths: Vec<usize> = (0..self.strata.len())
            .map(|j| {
                rows.iter()
                    .map(|(_, cells)| cells.get(j).map_or(0, |c| c.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        for (row_index, (label, cells)) in rows.iter().enumerate() {
            write!(f, "{label:<label_width$}")?;
            for (cell, width) in cells.iter().zip(&widths) {
                write!(f, " | {cell:>width$}")?;
            }
            writeln!(f)?;
            if row_index == 0 {
                let total = label_width + widths.iter().map(|w| w + 3).sum::<usize>();
                writeln!(f, "{}", "-".repeat(total))?;
            }
        }
        Ok(())
    }
}
