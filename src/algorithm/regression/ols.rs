//! Ordinary least squares
//!
//! The normal equations are solved by Gauss-Jordan elimination with partial
//! pivoting on `X'X`; its inverse also gives the coefficient covariance.

use std::fmt;

use ndarray::{Array1, Array2};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

use crate::algorithm::regression::design::{Design, ModelSpec};
use crate::error::{NhanesError, Result};
use crate::models::AnalysisTable;

/// Pivots smaller than this fraction of the largest diagonal entry of `X'X`
/// are treated as zero
const SINGULARITY_TOLERANCE: f64 = 1e-10;

/// Estimate and inference for one design term
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coefficient {
    pub term: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_value: f64,
    pub p_value: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

/// A fitted model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelFit {
    pub name: String,
    pub formula: String,
    pub n_obs: usize,
    pub df_residual: usize,
    pub coefficients: Vec<Coefficient>,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub residual_std_error: f64,
    pub f_statistic: f64,
    pub f_p_value: f64,
}

impl ModelFit {
    #[must_use]
    pub fn coefficient(&self, term: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.term == term)
    }
}

/// Inverse of a symmetric positive semi-definite matrix; `None` if singular
fn invert(matrix: &Array2<f64>) -> Option<Array2<f64>> {
    let k = matrix.nrows();
    let scale = matrix
        .diag()
        .iter()
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 {
        return None;
    }
    let tolerance = scale * SINGULARITY_TOLERANCE;

    let mut a = matrix.clone();
    let mut inverse = Array2::<f64>::eye(k);

    for col in 0..k {
        let pivot_row =
            (col..k).max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))?;
        if a[[pivot_row, col]].abs() <= tolerance {
            return None;
        }
        if pivot_row != col {
            for j in 0..k {
                a.swap([col, j], [pivot_row, j]);
                inverse.swap([col, j], [pivot_row, j]);
            }
        }

        let pivot = a[[col, col]];
        a.row_mut(col).mapv_inplace(|v| v / pivot);
        inverse.row_mut(col).mapv_inplace(|v| v / pivot);

        for row in 0..k {
            if row == col {
                continue;
            }
            let factor = a[[row, col]];
            if factor == 0.0 {
                continue;
            }
            for j in 0..k {
                a[[row, j]] -= factor * a[[col, j]];
                inverse[[row, j]] -= factor * inverse[[col, j]];
            }
        }
    }
    Some(inverse)
}

/// Reference t distribution; `None` without residual degrees of freedom
fn t_inference(df: usize) -> Option<StudentsT> {
    #[allow(clippy::cast_precision_loss)]
    let df = df as f64;
    StudentsT::new(0.0, 1.0, df).ok()
}

/// Fit a model over the table's complete rows
///
/// # Errors
/// Returns a fit error with fewer complete rows than terms, or when the
/// design is singular
pub fn fit(spec: &ModelSpec, table: &AnalysisTable) -> Result<ModelFit> {
    let Design { x, y } = spec.design(table);
    let (n, k) = x.dim();
    log::info!(
        "Fitting {} ({}) on {n} complete rows",
        spec.name,
        spec.formula
    );

    if n < k {
        return Err(NhanesError::fit_error(
            spec.name,
            format!("{n} complete rows, need at least {k}"),
        ));
    }

    let xtx = x.t().dot(&x);
    let xty = x.t().dot(&y);
    let inverse = invert(&xtx).ok_or_else(|| {
        NhanesError::fit_error(spec.name, "design matrix is singular (X'X not invertible)")
    })?;
    let beta: Array1<f64> = inverse.dot(&xty);

    let residuals = &y - &x.dot(&beta);
    let rss = residuals.dot(&residuals);
    let y_mean = y.mean().unwrap_or(f64::NAN);
    let tss = y.mapv(|v| (v - y_mean).powi(2)).sum();

    let df_residual = n - k;
    #[allow(clippy::cast_precision_loss)]
    let (n_f, k_f, df_f) = (n as f64, k as f64, df_residual as f64);

    let sigma2 = if df_residual > 0 {
        rss / df_f
    } else {
        f64::NAN
    };
    let t_dist = t_inference(df_residual);
    let t_critical = t_dist.as_ref().map_or(f64::NAN, |t| t.inverse_cdf(0.975));

    let variances = inverse.diag().mapv(|v| v * sigma2);
    let coefficients = spec
        .term_names()
        .into_iter()
        .zip(beta.iter().zip(variances.iter()))
        .map(|(term, (&estimate, &variance))| {
            let std_error = variance.sqrt();
            let t_value = estimate / std_error;
            let p_value = t_dist
                .as_ref()
                .filter(|_| t_value.is_finite())
                .map_or(f64::NAN, |t| (2.0 * t.sf(t_value.abs())).min(1.0));
            Coefficient {
                term,
                estimate,
                std_error,
                t_value,
                p_value,
                ci_lower: estimate - t_critical * std_error,
                ci_upper: estimate + t_critical * std_error,
            }
        })
        .collect();

    let r_squared = if tss > 0.0 { 1.0 - rss / tss } else { f64::NAN };
    let adj_r_squared = if df_residual > 0 {
        1.0 - (1.0 - r_squared) * (n_f - 1.0) / df_f
    } else {
        f64::NAN
    };

    let df_model = k_f - 1.0;
    let (f_statistic, f_p_value) = if df_residual > 0 && k > 1 {
        let f = ((tss - rss) / df_model) / sigma2;
        let p = FisherSnedecor::new(df_model, df_f)
            .ok()
            .filter(|_| f.is_finite())
            .map_or(f64::NAN, |dist| dist.sf(f));
        (f, p)
    } else {
        (f64::NAN, f64::NAN)
    };

    let fit = ModelFit {
        name: spec.name.to_string(),
        formula: spec.formula.to_string(),
        n_obs: n,
        df_residual,
        coefficients,
        r_squared,
        adj_r_squared,
        residual_std_error: sigma2.sqrt(),
        f_statistic,
        f_p_value,
    };
    log::info!(
        "{}: R² = {:.4}, F = {:.3} (p = {:.3e})",
        fit.name,
        fit.r_squared,
        fit.f_statistic,
        fit.f_p_value
    );
    Ok(fit)
}

/// Simple linear regression line `y = intercept + slope * x`
#[must_use]
pub fn simple_line(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let design = Array2::from_shape_fn((x.len(), 2), |(i, j)| if j == 0 { 1.0 } else { x[i] });
    let response = Array1::from(y.to_vec());
    let inverse = invert(&design.t().dot(&design))?;
    let beta = inverse.dot(&design.t().dot(&response));
    Some((beta[0], beta[1]))
}

fn fmt_value(value: f64, precision: usize) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{value:.precision$}")
    }
}

impl fmt::Display for ModelFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "OLS regression: {}", self.formula)?;
        writeln!(
            f,
            "Observations: {}   Residual df: {}   R²: {}   Adj. R²: {}",
            self.n_obs,
            self.df_residual,
            fmt_value(self.r_squared, 4),
            fmt_value(self.adj_r_squared, 4)
        )?;
        writeln!(
            f,
            "Residual SE: {}   F: {}   Prob (F): {}",
            fmt_value(self.residual_std_error, 3),
            fmt_value(self.f_statistic, 3),
            if self.f_p_value.is_nan() {
                "NaN".to_string()
            } else {
                format!("{:.3e}", self.f_p_value)
            }
        )?;

        let width = self
            .coefficients
            .iter()
            .map(|c| c.term.chars().count())
            .max()
            .unwrap_or(0)
            .max(4);
        writeln!(
            f,
            "{:<width$} {:>11} {:>10} {:>8} {:>8} {:>11} {:>11}",
            "term", "coef", "std err", "t", "P>|t|", "[0.025", "0.975]"
        )?;
        for c in &self.coefficients {
            writeln!(
                f,
                "{:<width$} {:>11} {:>10} {:>8} {:>8} {:>11} {:>11}",
                c.term,
                fmt_value(c.estimate, 4),
                fmt_value(c.std_error, 4),
                fmt_value(c.t_value, 3),
                fmt_value(c.p_value, 3),
                fmt_value(c.ci_lower, 4),
                fmt_value(c.ci_upper, 4)
            )?;
        }
        Ok(())
    }
}
