//! Resample-and-perturb proposal built from the previous population.

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use tau_core::stats::{normalize_weights, weighted_covariance, weighted_mean};
use tau_core::{Error, Population, Result};
use tau_prob::MvNormal;
use tau_prob::math::log_sum_exp;

/// Relative variance floor used by the diagonal fallback.
const VARIANCE_FLOOR: f64 = 1e-10;

/// Weighted mixture of Gaussians centred on the previous particles.
#[derive(Debug, Clone)]
pub struct PerturbationKernel {
    centers: Vec<Vec<f64>>,
    log_weights: Vec<f64>,
    picker: WeightedIndex<f64>,
    mvn: MvNormal,
    diagonal_fallback: bool,
}

impl PerturbationKernel {
    /// Fit to `population`: covariance `scale * Cov_w(particles)`.
    ///
    /// If that matrix is not positive definite (e.g. a collapsed parameter),
    /// falls back to a floored diagonal.
    pub fn fit(population: &Population, scale: f64) -> Result<Self> {
        if population.is_empty() {
            return Err(Error::Validation("cannot fit a kernel to an empty population".to_string()));
        }
        let centers = population.params();
        let w = normalize_weights(&population.weights())?;
        let dim = centers[0].len();

        let mut cov = weighted_covariance(&centers, &w)?;
        cov.iter_mut().for_each(|c| *c *= scale);

        let (mvn, diagonal_fallback) = match MvNormal::from_covariance(&cov, dim) {
            Ok(m) => (m, false),
            Err(Error::Computation(reason)) => {
                let variances: Vec<f64> = (0..dim)
                    .map(|i| {
                        let column: Vec<f64> = centers.iter().map(|c| c[i]).collect();
                        let m = weighted_mean(&column, &w);
                        cov[i * dim + i].max(VARIANCE_FLOOR * m.abs().max(1.0).powi(2))
                    })
                    .collect();
                log::warn!(
                    "round {}: kernel covariance unusable ({reason}); using diagonal {:?}",
                    population.round,
                    variances
                );
                (MvNormal::from_variances(&variances)?, true)
            }
            Err(e) => return Err(e),
        };

        let picker = WeightedIndex::new(&w)
            .map_err(|e| Error::Computation(format!("particle resampling weights: {e}")))?;
        let log_weights = w.iter().map(|wi| wi.ln()).collect();
        Ok(Self { centers, log_weights, picker, mvn, diagonal_fallback })
    }

    /// Resample one particle by weight and perturb it.
    pub fn propose<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        let idx = self.picker.sample(rng);
        self.mvn.sample_around(&self.centers[idx], rng)
    }

    /// `log sum_j w_j K(theta | theta_j)`.
    pub fn log_mixture_density(&self, theta: &[f64]) -> f64 {
        let terms: Vec<f64> = self
            .centers
            .iter()
            .zip(&self.log_weights)
            .map(|(c, lw)| lw + self.mvn.log_density(theta, c))
            .collect();
        log_sum_exp(&terms)
    }

    /// Whether the diagonal fallback is in use.
    pub fn is_diagonal_fallback(&self) -> bool {
        self.diagonal_fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tau_core::Particle;

    fn population(points: &[[f64; 2]]) -> Population {
        let w = 1.0 / points.len() as f64;
        Population {
            round: 1,
            threshold: 1.0,
            particles: points.iter().map(|p| Particle::new(p.to_vec(), 0.1, w)).collect(),
            complete: true,
        }
    }

    #[test]
    fn test_single_center_density_matches_mvn() {
        let pop = population(&[[0.0, 0.0], [2.0, 1.0], [1.0, 3.0]]);
        let k = PerturbationKernel::fit(&pop, 2.0).unwrap();
        assert!(!k.is_diagonal_fallback());
        let theta = [1.0, 1.0];
        let manual = log_sum_exp(
            &pop.particles
                .iter()
                .map(|p| (1.0f64 / 3.0).ln() + k.mvn.log_density(&theta, &p.params))
                .collect::<Vec<_>>(),
        );
        assert_relative_eq!(k.log_mixture_density(&theta), manual, epsilon = 1e-12);
    }

    #[test]
    fn test_collapsed_dimension_uses_diagonal_fallback() {
        let pop = population(&[[1.0, 5.0], [2.0, 5.0], [3.0, 5.0]]);
        let k = PerturbationKernel::fit(&pop, 2.0).unwrap();
        assert!(k.is_diagonal_fallback());
        let mut rng = StdRng::seed_from_u64(1);
        let theta = k.propose(&mut rng);
        assert_eq!(theta.len(), 2);
        assert!(k.log_mixture_density(&theta).is_finite());
    }
}
