//! Common data types for tau

use serde::{Deserialize, Serialize};

use crate::stats;

/// One accepted candidate: parameter vector, its distance and importance weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Parameter vector (immutable once drawn).
    pub params: Vec<f64>,
    /// Distance between the candidate's summary and the observed summary.
    pub distance: f64,
    /// Normalized importance weight.
    pub weight: f64,
}

impl Particle {
    /// Create a particle with the given weight.
    pub fn new(params: Vec<f64>, distance: f64, weight: f64) -> Self {
        Self { params, distance, weight }
    }
}

/// Accepted particles of one round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Population {
    /// 1-based round that produced this population.
    pub round: usize,
    /// Acceptance threshold the particles were accepted under.
    pub threshold: f64,
    /// Accepted particles, in slot order.
    pub particles: Vec<Particle>,
    /// `false` when the round was abandoned before filling every slot.
    pub complete: bool,
}

impl Population {
    /// Number of particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the population holds no particles.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Weights in particle order.
    pub fn weights(&self) -> Vec<f64> {
        self.particles.iter().map(|p| p.weight).collect()
    }

    /// Distances in particle order.
    pub fn distances(&self) -> Vec<f64> {
        self.particles.iter().map(|p| p.distance).collect()
    }

    /// Parameter vectors in particle order.
    pub fn params(&self) -> Vec<Vec<f64>> {
        self.particles.iter().map(|p| p.params.clone()).collect()
    }

    /// Values of one parameter across particles; `NaN` where `param_idx` is
    /// out of range.
    pub fn param_column(&self, param_idx: usize) -> Vec<f64> {
        self.particles.iter().map(|p| p.params.get(param_idx).copied().unwrap_or(f64::NAN)).collect()
    }
}

/// Per-round bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundDiagnostics {
    /// 1-based round index.
    pub round: usize,
    /// Acceptance threshold used in this round.
    pub threshold: f64,
    /// Number of simulations run (accepted + rejected + discarded).
    pub n_simulations: usize,
    /// Number of accepted particles.
    pub n_accepted: usize,
    /// Candidates discarded because of an invalid parameter or shape error.
    pub n_discarded: usize,
    /// `n_accepted / n_simulations`.
    pub acceptance_rate: f64,
    /// Kish effective sample size of the round's weights.
    pub ess: f64,
    /// Wall-clock seconds spent in the round.
    pub wall_time_secs: f64,
    /// Weighted posterior mean per parameter.
    pub param_means: Vec<f64>,
    /// 95% weighted credible interval per parameter.
    pub credible_intervals: Vec<(f64, f64)>,
}

/// Why a run stopped successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The configured number of rounds completed.
    MaxRounds,
    /// The relative threshold change fell below the tolerance.
    ThresholdConverged,
    /// The acceptance rate fell below the configured minimum.
    AcceptanceRate,
    /// The precomputed threshold schedule was exhausted.
    ScheduleExhausted,
}

/// Terminal status of an inference run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    /// The run converged.
    Converged {
        /// Stopping criterion that fired.
        reason: StopReason,
    },
    /// The run was cancelled; the last population may be incomplete.
    Cancelled,
    /// A round could not be filled within the attempt budget.
    Failed {
        /// 1-based round that failed.
        round: usize,
        /// Number of particles missing from that round.
        shortfall: usize,
    },
}

/// Posterior approximation returned by the ABC engine.
///
/// Read-only after the engine hands it back; owns its population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosteriorResult {
    /// Parameter names, in parameter-vector order.
    pub parameter_names: Vec<String>,
    /// Final (or partial) population.
    pub population: Population,
    /// Diagnostics for every round that ran, including a failed last round.
    pub rounds: Vec<RoundDiagnostics>,
    /// Terminal status.
    pub status: RunStatus,
    /// Root seed of the run.
    pub seed: u64,
}

impl PosteriorResult {
    /// Number of particles in the final population.
    pub fn n_particles(&self) -> usize {
        self.population.len()
    }

    /// Whether the final population is complete.
    pub fn is_complete(&self) -> bool {
        self.population.complete
    }

    /// Index of a named parameter.
    pub fn parameter_index(&self, name: &str) -> Option<usize> {
        self.parameter_names.iter().position(|n| n == name)
    }

    /// Samples of one parameter.
    pub fn samples(&self, param_idx: usize) -> Vec<f64> {
        self.population.param_column(param_idx)
    }

    /// Normalized weights of the final population.
    pub fn weights(&self) -> Vec<f64> {
        self.population.weights()
    }

    /// Weighted posterior mean of one parameter.
    pub fn mean(&self, param_idx: usize) -> f64 {
        stats::weighted_mean(&self.samples(param_idx), &self.weights())
    }

    /// Weighted posterior variance of one parameter.
    pub fn variance(&self, param_idx: usize) -> f64 {
        stats::weighted_variance(&self.samples(param_idx), &self.weights())
    }

    /// Weighted posterior quantile of one parameter.
    pub fn quantile(&self, param_idx: usize, q: f64) -> f64 {
        stats::weighted_quantile(&self.samples(param_idx), &self.weights(), q)
    }

    /// Equal-tailed credible interval at `level` (e.g. `0.95`).
    pub fn credible_interval(&self, param_idx: usize, level: f64) -> (f64, f64) {
        let alpha = (1.0 - level.clamp(0.0, 1.0)) / 2.0;
        (self.quantile(param_idx, alpha), self.quantile(param_idx, 1.0 - alpha))
    }

    /// Threshold used in each round.
    pub fn thresholds(&self) -> Vec<f64> {
        self.rounds.iter().map(|r| r.threshold).collect()
    }

    /// Acceptance rate of each round.
    pub fn acceptance_rates(&self) -> Vec<f64> {
        self.rounds.iter().map(|r| r.acceptance_rate).collect()
    }

    /// Total simulations across all rounds.
    pub fn total_simulations(&self) -> usize {
        self.rounds.iter().map(|r| r.n_simulations).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_result() -> PosteriorResult {
        let particles = (0..5)
            .map(|i| Particle::new(vec![i as f64, 10.0 + i as f64], 0.1 * i as f64, 0.2))
            .collect();
        PosteriorResult {
            parameter_names: vec!["tau".to_string(), "coeff".to_string()],
            population: Population { round: 2, threshold: 0.5, particles, complete: true },
            rounds: vec![],
            status: RunStatus::Converged { reason: StopReason::MaxRounds },
            seed: 1,
        }
    }

    #[test]
    fn test_posterior_accessors() {
        let r = make_result();
        assert_eq!(r.n_particles(), 5);
        assert_eq!(r.parameter_index("coeff"), Some(1));
        assert_eq!(r.parameter_index("missing"), None);
        assert_relative_eq!(r.mean(0), 2.0, epsilon = 1e-12);
        assert_relative_eq!(r.mean(1), 12.0, epsilon = 1e-12);
        let (lo, hi) = r.credible_interval(0, 0.95);
        assert!(lo <= r.mean(0) && r.mean(0) <= hi);
    }

    #[test]
    fn test_out_of_range_parameter_is_nan() {
        let r = make_result();
        assert!(r.samples(2).iter().all(|v| v.is_nan()));
        assert!(r.mean(2).is_nan());
        assert!(r.variance(2).is_nan());
        let (lo, hi) = r.credible_interval(7, 0.9);
        assert!(lo.is_nan() && hi.is_nan());
    }

    #[test]
    fn test_status_serde_tag() {
        let s = serde_json::to_string(&RunStatus::Failed { round: 3, shortfall: 7 }).unwrap();
        assert_eq!(s, r#"{"status":"failed","round":3,"shortfall":7}"#);
    }
}
