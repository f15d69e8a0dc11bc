//! Weighted one-dimensional Gaussian kernel density estimation.
//!
//! Used to turn a weighted particle population into a smooth marginal density
//! and read off its mode (MAP estimate).

use tau_core::stats::{effective_sample_size, normalize_weights, weighted_variance};
use tau_core::{Error, Result};

/// Scott's rule bandwidth `sd * n_eff^(-1/5)` for weighted samples.
pub fn scott_bandwidth(samples: &[f64], weights: &[f64]) -> Result<f64> {
    if samples.len() != weights.len() {
        return Err(Error::ShapeMismatch { expected: samples.len(), actual: weights.len() });
    }
    let n_eff = effective_sample_size(weights);
    let sd = weighted_variance(samples, weights).sqrt();
    if !(n_eff.is_finite() && sd.is_finite()) {
        return Err(Error::Computation("bandwidth undefined for these weights".to_string()));
    }
    Ok(sd * n_eff.powf(-0.2))
}

/// Weighted Gaussian KDE evaluated at each grid point.
pub fn density_on_grid(
    samples: &[f64],
    weights: &[f64],
    bandwidth: f64,
    grid: &[f64],
) -> Result<Vec<f64>> {
    if !(bandwidth.is_finite() && bandwidth > 0.0) {
        return Err(Error::Validation(format!("bandwidth must be finite and > 0, got {bandwidth}")));
    }
    if samples.len() != weights.len() {
        return Err(Error::ShapeMismatch { expected: samples.len(), actual: weights.len() });
    }
    let w = normalize_weights(weights)?;
    Ok(grid
        .iter()
        .map(|&g| {
            samples
                .iter()
                .zip(w.iter())
                .map(|(&x, &wi)| wi * crate::normal::std_pdf((g - x) / bandwidth))
                .sum::<f64>()
                / bandwidth
        })
        .collect())
}

/// Mode of the weighted KDE on a uniform grid of `n_grid` points spanning the
/// sample range padded by three bandwidths.
///
/// Degenerate populations (zero spread) return the common value.
pub fn kde_mode(samples: &[f64], weights: &[f64], n_grid: usize) -> Result<f64> {
    if samples.is_empty() {
        return Err(Error::Validation("kde_mode requires at least one sample".to_string()));
    }
    if n_grid < 2 {
        return Err(Error::Validation(format!("n_grid must be >= 2, got {n_grid}")));
    }
    let h = scott_bandwidth(samples, weights)?;
    let lo = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if h <= 0.0 || hi <= lo {
        return Ok(lo);
    }
    let (a, b) = (lo - 3.0 * h, hi + 3.0 * h);
    let step = (b - a) / (n_grid - 1) as f64;
    let grid: Vec<f64> = (0..n_grid).map(|i| a + step * i as f64).collect();
    let dens = density_on_grid(samples, weights, h, &grid)?;
    let best = dens
        .iter()
        .enumerate()
        .max_by(|x, y| x.1.total_cmp(y.1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    Ok(grid[best])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_integrates_to_one() {
        let xs = [1.0, 2.0, 2.5, 4.0];
        let w = [0.1, 0.4, 0.3, 0.2];
        let grid: Vec<f64> = (0..4001).map(|i| -5.0 + i as f64 * 0.005).collect();
        let d = density_on_grid(&xs, &w, 0.5, &grid).unwrap();
        let integral: f64 = d.iter().sum::<f64>() * 0.005;
        assert!((integral - 1.0).abs() < 1e-3, "integral={}", integral);
    }

    #[test]
    fn test_mode_follows_weight() {
        let xs = [0.0, 0.1, -0.1, 10.0, 10.1, 9.9];
        let heavy_right = [0.05, 0.05, 0.05, 0.3, 0.3, 0.25];
        let m = kde_mode(&xs, &heavy_right, 512).unwrap();
        assert!((m - 10.0).abs() < 1.0, "mode={}", m);
    }

    #[test]
    fn test_degenerate_population() {
        assert_eq!(kde_mode(&[3.0, 3.0, 3.0], &[1.0, 1.0, 1.0], 64).unwrap(), 3.0);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(kde_mode(&[], &[], 10).is_err());
        assert!(density_on_grid(&[1.0], &[1.0], 0.0, &[0.0]).is_err());
        assert!(scott_bandwidth(&[1.0, 2.0], &[1.0]).is_err());
    }
}
