//! Weighted sample statistics.
//!
//! All weighted helpers accept unnormalized non-negative weights and normalize
//! internally. Inputs are expected to be finite; empty input yields `NaN`
//! rather than an error because these feed read-only accessors.

use crate::{Error, Result};

/// Normalize weights to sum to 1.
///
/// Fails if any weight is negative or non-finite, or if all weights are zero.
pub fn normalize_weights(weights: &[f64]) -> Result<Vec<f64>> {
    if weights.is_empty() {
        return Err(Error::Validation("weights must be non-empty".to_string()));
    }
    let mut total = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        if !w.is_finite() || w < 0.0 {
            return Err(Error::Computation(format!(
                "weight[{i}] must be finite and >= 0, got {w}"
            )));
        }
        total += w;
    }
    if total <= 0.0 {
        return Err(Error::Computation("weights sum to zero".to_string()));
    }
    Ok(weights.iter().map(|&w| w / total).collect())
}

fn normalized_or_nan(weights: &[f64]) -> Option<Vec<f64>> {
    normalize_weights(weights).ok()
}

/// Weighted mean of `values`.
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> f64 {
    if values.is_empty() || values.len() != weights.len() {
        return f64::NAN;
    }
    let Some(w) = normalized_or_nan(weights) else {
        return f64::NAN;
    };
    values.iter().zip(w.iter()).map(|(&x, &wi)| x * wi).sum()
}

/// Weighted variance with the reliability-weights bias correction
/// `1 / (1 - sum(w_i^2))`.
///
/// Returns `0.0` when the correction is undefined (a single effective sample).
pub fn weighted_variance(values: &[f64], weights: &[f64]) -> f64 {
    if values.is_empty() || values.len() != weights.len() {
        return f64::NAN;
    }
    let Some(w) = normalized_or_nan(weights) else {
        return f64::NAN;
    };
    let mean: f64 = values.iter().zip(w.iter()).map(|(&x, &wi)| x * wi).sum();
    let sum_sq: f64 = w.iter().map(|&wi| wi * wi).sum();
    let denom = 1.0 - sum_sq;
    if denom <= 1e-12 {
        return 0.0;
    }
    let ss: f64 = values.iter().zip(w.iter()).map(|(&x, &wi)| wi * (x - mean).powi(2)).sum();
    ss / denom
}

/// Weighted covariance of row vectors (row-major `dim x dim` output).
///
/// Uses the same bias correction as [`weighted_variance`].
pub fn weighted_covariance(rows: &[Vec<f64>], weights: &[f64]) -> Result<Vec<f64>> {
    if rows.is_empty() {
        return Err(Error::Validation("covariance requires at least one row".to_string()));
    }
    if rows.len() != weights.len() {
        return Err(Error::ShapeMismatch { expected: rows.len(), actual: weights.len() });
    }
    let dim = rows[0].len();
    if let Some(bad) = rows.iter().find(|r| r.len() != dim) {
        return Err(Error::ShapeMismatch { expected: dim, actual: bad.len() });
    }
    let w = normalize_weights(weights)?;

    let mut mean = vec![0.0; dim];
    for (row, &wi) in rows.iter().zip(w.iter()) {
        for (m, &x) in mean.iter_mut().zip(row.iter()) {
            *m += wi * x;
        }
    }

    let mut cov = vec![0.0; dim * dim];
    for (row, &wi) in rows.iter().zip(w.iter()) {
        for i in 0..dim {
            let di = row[i] - mean[i];
            for j in i..dim {
                cov[i * dim + j] += wi * di * (row[j] - mean[j]);
            }
        }
    }

    let sum_sq: f64 = w.iter().map(|&wi| wi * wi).sum();
    let denom = 1.0 - sum_sq;
    let scale = if denom > 1e-12 { 1.0 / denom } else { 0.0 };
    for i in 0..dim {
        for j in i..dim {
            let v = cov[i * dim + j] * scale;
            cov[i * dim + j] = v;
            cov[j * dim + i] = v;
        }
    }
    Ok(cov)
}

/// Weighted quantile using midpoint interpolation of the weighted CDF.
///
/// Each sample sits at cumulative position `C_i - w_i / 2`; `q` is linearly
/// interpolated between neighbouring positions and clamped to the extremes.
/// With equal weights this is the Hazen plotting-position quantile.
pub fn weighted_quantile(values: &[f64], weights: &[f64], q: f64) -> f64 {
    if values.is_empty() || values.len() != weights.len() {
        return f64::NAN;
    }
    let Some(w) = normalized_or_nan(weights) else {
        return f64::NAN;
    };
    let q = q.clamp(0.0, 1.0);

    let mut idx: Vec<usize> = (0..values.len()).filter(|&i| w[i] > 0.0).collect();
    if idx.is_empty() {
        return f64::NAN;
    }
    idx.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut positions = Vec::with_capacity(idx.len());
    let mut cum = 0.0;
    for &i in &idx {
        positions.push(cum + 0.5 * w[i]);
        cum += w[i];
    }

    if q <= positions[0] {
        return values[idx[0]];
    }
    let last = idx.len() - 1;
    if q >= positions[last] {
        return values[idx[last]];
    }
    let k = positions.partition_point(|&p| p < q);
    let (p0, p1) = (positions[k - 1], positions[k]);
    let (x0, x1) = (values[idx[k - 1]], values[idx[k]]);
    if p1 <= p0 {
        return x1;
    }
    let t = (q - p0) / (p1 - p0);
    (1.0 - t) * x0 + t * x1
}

/// Kish effective sample size `1 / sum(w_i^2)` of normalized weights.
pub fn effective_sample_size(weights: &[f64]) -> f64 {
    match normalized_or_nan(weights) {
        Some(w) => 1.0 / w.iter().map(|&wi| wi * wi).sum::<f64>(),
        None => f64::NAN,
    }
}

/// Quantile for sorted data via linear interpolation.
///
/// - `q=0` returns min
/// - `q=1` returns max
/// - empty input returns `NaN`
pub fn quantile_linear_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let i = pos.floor() as usize;
    let j = pos.ceil() as usize;
    if i == j {
        return sorted[i];
    }
    let t = pos - i as f64;
    (1.0 - t) * sorted[i] + t * sorted[j]
}

/// Quantile via sorting + linear interpolation.
pub fn quantile_linear(data: &[f64], q: f64) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    let mut v = data.to_vec();
    v.sort_by(f64::total_cmp);
    quantile_linear_sorted(&v, q)
}
