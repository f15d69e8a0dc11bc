//! ABC-SMC configuration.

use serde::{Deserialize, Serialize};
use tau_core::{Error, Result};

/// How the first-round threshold is chosen under an adaptive policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum InitialThreshold {
    /// Explicit `epsilon_1`.
    Value(f64),
    /// Accept the first `N` prior draws; `epsilon_1` is their largest distance.
    Quantile,
}

/// Threshold schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ThresholdPolicy {
    /// `epsilon_{r+1}` is the `quantile` of round `r`'s accepted distances.
    Adaptive {
        /// First-round threshold.
        initial: InitialThreshold,
        /// Shrink quantile in `(0, 1)`.
        quantile: f64,
    },
    /// Precomputed, non-increasing schedule; one entry per round.
    Fixed {
        /// Thresholds.
        schedule: Vec<f64>,
    },
}

/// Convergence criteria. The run stops at the first criterion that fires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoppingRule {
    /// Hard cap on the number of rounds.
    pub max_rounds: usize,
    /// Stop once `(eps_r - eps_{r+1}) / eps_r` falls below this.
    pub min_threshold_change: Option<f64>,
    /// Stop once a round's acceptance rate falls below this.
    pub min_acceptance_rate: Option<f64>,
}

/// Full engine configuration. Every knob is explicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbcConfig {
    /// Particles per round (`N`).
    pub population_size: usize,
    /// Threshold schedule.
    pub threshold: ThresholdPolicy,
    /// Convergence criteria.
    pub stopping: StoppingRule,
    /// Multiplier applied to the weighted particle covariance to form the
    /// perturbation kernel covariance.
    pub kernel_scale: f64,
    /// Proposals allowed per particle slot before the round fails.
    pub max_attempts: usize,
    /// Root seed.
    pub seed: u64,
    /// Worker threads; `0` uses every available core.
    pub n_threads: usize,
}

impl AbcConfig {
    /// Documented preset: adaptive median shrinkage, kernel scale 2
    /// (Beaumont et al. 2009), five rounds.
    pub fn preset(population_size: usize, seed: u64) -> Self {
        Self {
            population_size,
            threshold: ThresholdPolicy::Adaptive { initial: InitialThreshold::Quantile, quantile: 0.5 },
            stopping: StoppingRule {
                max_rounds: 5,
                min_threshold_change: None,
                min_acceptance_rate: None,
            },
            kernel_scale: 2.0,
            max_attempts: 1000,
            seed,
            n_threads: 0,
        }
    }

    /// Reject inconsistent configurations before any simulation runs.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(Error::Validation("population_size must be > 0".to_string()));
        }
        if self.stopping.max_rounds == 0 {
            return Err(Error::Validation("max_rounds must be > 0".to_string()));
        }
        if self.max_attempts == 0 {
            return Err(Error::Validation("max_attempts must be > 0".to_string()));
        }
        if !(self.kernel_scale.is_finite() && self.kernel_scale > 0.0) {
            return Err(Error::Validation(format!(
                "kernel_scale must be finite and > 0, got {}",
                self.kernel_scale
            )));
        }
        if let Some(tol) = self.stopping.min_threshold_change {
            if !(tol.is_finite() && tol >= 0.0) {
                return Err(Error::Validation(format!(
                    "min_threshold_change must be finite and >= 0, got {tol}"
                )));
            }
        }
        if let Some(rate) = self.stopping.min_acceptance_rate {
            if !(0.0..=1.0).contains(&rate) {
                return Err(Error::Validation(format!(
                    "min_acceptance_rate must lie in [0, 1], got {rate}"
                )));
            }
        }
        match &self.threshold {
            ThresholdPolicy::Adaptive { initial, quantile } => {
                if !(*quantile > 0.0 && *quantile < 1.0) {
                    return Err(Error::Validation(format!(
                        "threshold quantile must lie in (0, 1), got {quantile}"
                    )));
                }
                if let InitialThreshold::Value(eps) = initial {
                    if !(eps.is_finite() && *eps > 0.0) {
                        return Err(Error::Validation(format!(
                            "initial threshold must be finite and > 0, got {eps}"
                        )));
                    }
                }
            }
            ThresholdPolicy::Fixed { schedule } => {
                if schedule.is_empty() {
                    return Err(Error::Validation("threshold schedule is empty".to_string()));
                }
                if schedule.iter().any(|e| !(e.is_finite() && *e > 0.0)) {
                    return Err(Error::Validation(
                        "threshold schedule entries must be finite and > 0".to_string(),
                    ));
                }
                if schedule.windows(2).any(|w| w[1] > w[0]) {
                    return Err(Error::Validation(
                        "threshold schedule must be non-increasing".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}
