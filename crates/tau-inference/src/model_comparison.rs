//! Compare two fitted models through their posterior-predictive distances.
//!
//! For a distance level `eps`, the fraction of a model's predictive draws
//! within `eps` of the observed summary estimates the ABC evidence at `eps`.
//! The ratio of those fractions is the Bayes factor `BF_ab(eps)`.

use serde::{Deserialize, Serialize};
use tau_core::{Error, Result};

/// Empirical CDF of `samples` evaluated at each grid point.
pub fn empirical_cdf(samples: &[f64], grid: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = samples.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len() as f64;
    grid.iter()
        .map(|&x| if n > 0.0 { sorted.partition_point(|&v| v <= x) as f64 / n } else { f64::NAN })
        .collect()
}

/// Outcome of [`compare_models`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelComparison {
    /// Distance levels.
    pub grid: Vec<f64>,
    /// ECDF of model A's distances.
    pub cdf_a: Vec<f64>,
    /// ECDF of model B's distances.
    pub cdf_b: Vec<f64>,
    /// `cdf_a / cdf_b`; `NaN` where both are zero, `inf` where only B is.
    pub bayes_factor: Vec<f64>,
    /// Largest grid level at which A's CDF strictly exceeds B's.
    pub a_dominates_up_to: Option<f64>,
    /// Largest grid level at which B's CDF strictly exceeds A's.
    pub b_dominates_up_to: Option<f64>,
}

/// Compare two distance samples on a shared linear grid of `n_grid` levels
/// spanning the pooled range.
pub fn compare_models(dist_a: &[f64], dist_b: &[f64], n_grid: usize) -> Result<ModelComparison> {
    if dist_a.is_empty() || dist_b.is_empty() {
        return Err(Error::Validation("both distance samples must be non-empty".to_string()));
    }
    if n_grid < 2 {
        return Err(Error::Validation(format!("n_grid must be >= 2, got {n_grid}")));
    }
    let pooled = dist_a.iter().chain(dist_b).copied().filter(|v| v.is_finite());
    let (lo, hi) = pooled.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !(lo.is_finite() && hi.is_finite()) {
        return Err(Error::Validation("distance samples contain no finite values".to_string()));
    }
    let step = (hi - lo) / (n_grid - 1) as f64;
    let mut grid: Vec<f64> = (0..n_grid).map(|i| lo + step * i as f64).collect();
    grid[n_grid - 1] = hi;

    let cdf_a = empirical_cdf(dist_a, &grid);
    let cdf_b = empirical_cdf(dist_b, &grid);
    let bayes_factor = cdf_a
        .iter()
        .zip(&cdf_b)
        .map(|(&a, &b)| if b > 0.0 { a / b } else if a > 0.0 { f64::INFINITY } else { f64::NAN })
        .collect();
    let last_where = |pred: &dyn Fn(f64, f64) -> bool| {
        grid.iter()
            .zip(cdf_a.iter().zip(&cdf_b))
            .rev()
            .find(|(_, (a, b))| pred(**a, **b))
            .map(|(g, _)| *g)
    };
    let a_dominates_up_to = last_where(&|a, b| a > b);
    let b_dominates_up_to = last_where(&|a, b| b > a);

    Ok(ModelComparison { grid, cdf_a, cdf_b, bayes_factor, a_dominates_up_to, b_dominates_up_to })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empirical_cdf() {
        let cdf = empirical_cdf(&[3.0, 1.0, 2.0, 2.0], &[0.0, 1.0, 2.0, 5.0]);
        assert_eq!(cdf, vec![0.0, 0.25, 0.75, 1.0]);
    }

    #[test]
    fn test_better_model_has_bayes_factor_above_one() {
        let a: Vec<f64> = (0..100).map(|i| i as f64 * 0.01).collect();
        let b: Vec<f64> = (0..100).map(|i| 0.5 + i as f64 * 0.01).collect();
        let cmp = compare_models(&a, &b, 50).unwrap();
        assert_eq!(cmp.grid.len(), 50);
        assert_relative_eq!(cmp.grid[0], 0.0);
        assert_relative_eq!(*cmp.grid.last().unwrap(), 1.49, epsilon = 1e-12);
        // Below B's smallest distance only A has mass.
        assert!(cmp.bayes_factor[1].is_infinite());
        assert!(cmp.a_dominates_up_to.is_some());
        assert!(cmp.b_dominates_up_to.is_none());
        assert_relative_eq!(*cmp.bayes_factor.last().unwrap(), 1.0);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(compare_models(&[], &[1.0], 10).is_err());
        assert!(compare_models(&[1.0], &[1.0], 1).is_err());
        assert!(compare_models(&[f64::NAN], &[f64::INFINITY], 10).is_err());
    }
}
