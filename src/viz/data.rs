//! Chart data preparation
//!
//! Everything a chart shows is computed here from the analysis table, so the
//! drawing code only maps prepared values to shapes.

use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::algorithm::regression::simple_line;
use crate::algorithm::statistics::descriptive::{
    BoxStats, quantile_sorted, sample_sd, sorted,
};
use crate::models::{AgeGroup, AnalysisTable, BmiCategory, Category, DiabetesStatus, Sex};
use crate::models::{SocioeconomicCategory, Variable};

/// Grid points of a density curve
pub const DENSITY_POINTS: usize = 200;

/// Bins of each glucose histogram
pub const HISTOGRAM_BINS: usize = 30;

/// A Gaussian kernel density estimate on an even grid
#[derive(Debug, Clone, PartialEq)]
pub struct DensityCurve {
    pub label: &'static str,
    pub bandwidth: f64,
    pub points: Vec<(f64, f64)>,
}

/// Silverman's rule of thumb, `0.9 * min(sd, IQR / 1.34) * n^(-1/5)`
#[must_use]
pub fn silverman_bandwidth(values: &[f64]) -> Option<f64> {
    let sd = sample_sd(values)?;
    let data = sorted(values);
    let iqr = quantile_sorted(&data, 0.75)? - quantile_sorted(&data, 0.25)?;
    let spread = if iqr > 0.0 { sd.min(iqr / 1.34) } else { sd };
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    let h = 0.9 * spread * n.powf(-0.2);
    (h > 0.0).then_some(h)
}

/// Density of `values` over `[min - 3h, max + 3h]`
#[must_use]
pub fn gaussian_kde(label: &'static str, values: &[f64], points: usize) -> Option<DensityCurve> {
    let bandwidth = silverman_bandwidth(values)?;
    let (lo, hi) = values
        .iter()
        .copied()
        .minmax_by(f64::total_cmp)
        .into_option()?;
    let (start, end) = (lo - 3.0 * bandwidth, hi + 3.0 * bandwidth);

    #[allow(clippy::cast_precision_loss)]
    let (n, steps) = (values.len() as f64, (points.max(2) - 1) as f64);
    let norm = n * bandwidth * (2.0 * std::f64::consts::PI).sqrt();

    let points = (0..points.max(2))
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let x = start + (end - start) * i as f64 / steps;
            let density = values
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                / norm;
            (x, density)
        })
        .collect();

    Some(DensityCurve {
        label,
        bandwidth,
        points,
    })
}

/// BMI density for each sex with at least two distinct values
#[must_use]
pub fn bmi_density_by_sex(table: &AnalysisTable) -> Vec<DensityCurve> {
    Sex::LEVELS
        .iter()
        .filter_map(|sex| {
            let values: Vec<f64> = table
                .iter()
                .filter(|s| s.sex == Some(*sex))
                .map(|s| s.bmi)
                .collect();
            gaussian_kde(sex.label(), &values, DENSITY_POINTS)
        })
        .collect()
}

/// Points of one group with its least-squares line
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub label: &'static str,
    pub points: Vec<(f64, f64)>,
    /// `(intercept, slope)`
    pub line: Option<(f64, f64)>,
}

impl ScatterSeries {
    fn new(label: &'static str, points: Vec<(f64, f64)>) -> Self {
        let (x, y): (Vec<f64>, Vec<f64>) = points.iter().copied().unzip();
        Self {
            label,
            line: simple_line(&x, &y),
            points,
        }
    }
}

/// Protein intake against cholesterol, every cleaned subject
#[must_use]
pub fn protein_cholesterol(table: &AnalysisTable) -> ScatterSeries {
    ScatterSeries::new(
        "All subjects",
        table.iter().map(|s| (s.protein, s.cholesterol)).collect(),
    )
}

/// Sugar intake against glucose, one series per age group
#[must_use]
pub fn sugar_glucose_by_age_group(table: &AnalysisTable) -> Vec<ScatterSeries> {
    AgeGroup::LEVELS
        .iter()
        .map(|group| {
            let points = table
                .iter()
                .filter(|s| s.age_group == Some(*group))
                .filter_map(|s| Some((s.sugar?, s.glucose?)))
                .collect();
            ScatterSeries::new(group.label(), points)
        })
        .collect()
}

/// Box statistics of cholesterol per BMI category, empty categories included
#[must_use]
pub fn cholesterol_by_bmi(table: &AnalysisTable) -> Vec<(&'static str, Option<BoxStats>)> {
    BmiCategory::LEVELS
        .iter()
        .map(|category| {
            let values: Vec<f64> = table
                .iter()
                .filter(|s| s.bmi_category == Some(*category))
                .map(|s| s.cholesterol)
                .collect();
            (category.label(), BoxStats::from_values(&values))
        })
        .collect()
}

/// Diabetes status shares within one socioeconomic category
#[derive(Debug, Clone, PartialEq)]
pub struct StackedBar {
    pub label: &'static str,
    pub total: usize,
    /// `(diabetes level, percent)`, summing to 100 when `total > 0`
    pub segments: Vec<(&'static str, f64)>,
}

/// Percentage of each diabetes status within each socioeconomic category,
/// over subjects with both values present
#[must_use]
pub fn diabetes_by_ses(table: &AnalysisTable) -> Vec<StackedBar> {
    let mut counts: FxHashMap<(SocioeconomicCategory, DiabetesStatus), usize> =
        FxHashMap::default();
    for subject in table {
        if let (Some(ses), Some(diabetes)) = (subject.ses_category, subject.diabetes) {
            *counts.entry((ses, diabetes)).or_default() += 1;
        }
    }

    SocioeconomicCategory::LEVELS
        .iter()
        .map(|ses| {
            let total: usize = DiabetesStatus::LEVELS
                .iter()
                .map(|d| counts.get(&(*ses, *d)).copied().unwrap_or_default())
                .sum();
            let segments = DiabetesStatus::LEVELS
                .iter()
                .map(|d| {
                    let count = counts.get(&(*ses, *d)).copied().unwrap_or_default();
                    #[allow(clippy::cast_precision_loss)]
                    let percent = if total > 0 {
                        100.0 * count as f64 / total as f64
                    } else {
                        0.0
                    };
                    (d.label(), percent)
                })
                .collect();
            StackedBar {
                label: ses.label(),
                total,
                segments,
            }
        })
        .collect()
}

/// Fixed-width histogram
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub start: f64,
    pub width: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin `values` into `bins` equal bins over `[start, end]`; the last bin is closed
    #[must_use]
    pub fn new(values: &[f64], start: f64, end: f64, bins: usize) -> Self {
        let bins = bins.max(1);
        #[allow(clippy::cast_precision_loss)]
        let width = if end > start {
            (end - start) / bins as f64
        } else {
            1.0
        };
        let mut counts = vec![0; bins];
        for value in values {
            if *value < start || *value > end {
                continue;
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let index = (((value - start) / width).floor() as usize).min(bins - 1);
            counts[index] += 1;
        }
        Self {
            start,
            width,
            counts,
        }
    }

    #[must_use]
    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// One panel of the glucose facet grid
#[derive(Debug, Clone, PartialEq)]
pub struct Facet {
    pub age_group: &'static str,
    pub sex: &'static str,
    pub histogram: Histogram,
}

/// Glucose histograms for age group x sex, all panels sharing one bin grid
#[must_use]
pub fn glucose_facets(table: &AnalysisTable) -> Vec<Facet> {
    let all: Vec<f64> = table
        .numeric_column(Variable::Glucose)
        .into_iter()
        .flatten()
        .collect();
    let (start, end) = all
        .iter()
        .copied()
        .minmax_by(f64::total_cmp)
        .into_option()
        .unwrap_or((0.0, 1.0));

    AgeGroup::LEVELS
        .iter()
        .cartesian_product(Sex::LEVELS.iter())
        .map(|(group, sex)| {
            let values: Vec<f64> = table
                .iter()
                .filter(|s| s.age_group == Some(*group) && s.sex == Some(*sex))
                .filter_map(|s| s.glucose)
                .collect();
            Facet {
                age_group: group.label(),
                sex: sex.label(),
                histogram: Histogram::new(&values, start, end, HISTOGRAM_BINS),
            }
        })
        .collect()
}
