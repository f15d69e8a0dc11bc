//! Posterior post-processing: point estimates, summaries and
//! posterior-predictive distances.

use rand::SeedableRng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tau_core::stats::effective_sample_size;
use tau_core::{Error, GenerativeModel, PosteriorResult, Result, RunStatus};
use tau_prob::kde::kde_mode;

use crate::distance::DistanceMetric;

/// Grid resolution used for MAP estimates.
pub const DEFAULT_KDE_GRID: usize = 512;

/// Mode of the weighted Gaussian KDE of one parameter's marginal.
pub fn map_estimate(result: &PosteriorResult, param_idx: usize, n_grid: usize) -> Result<f64> {
    if param_idx >= result.parameter_names.len() {
        return Err(Error::Validation(format!(
            "parameter index {param_idx} out of range ({} parameters)",
            result.parameter_names.len()
        )));
    }
    kde_mode(&result.samples(param_idx), &result.weights(), n_grid)
}

/// Marginal summary of one parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSummary {
    /// Parameter name.
    pub name: String,
    /// Weighted mean.
    pub mean: f64,
    /// Weighted standard deviation.
    pub sd: f64,
    /// Lower end of the equal-tailed credible interval.
    pub ci_low: f64,
    /// Upper end of the equal-tailed credible interval.
    pub ci_high: f64,
    /// KDE mode.
    pub map: f64,
}

/// Compact, serializable view of a [`PosteriorResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosteriorSummary {
    /// Credible level of the intervals.
    pub level: f64,
    /// Per-parameter marginals.
    pub parameters: Vec<ParameterSummary>,
    /// Effective sample size of the final weights.
    pub ess: f64,
    /// Number of rounds run.
    pub n_rounds: usize,
    /// Total simulations over all rounds.
    pub total_simulations: usize,
    /// Terminal status.
    pub status: RunStatus,
}

impl PosteriorSummary {
    /// Summarize `result` at credible `level`.
    pub fn from_result(result: &PosteriorResult, level: f64) -> Result<Self> {
        if result.population.is_empty() {
            return Err(Error::Validation("cannot summarize an empty population".to_string()));
        }
        let parameters = result
            .parameter_names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let (ci_low, ci_high) = result.credible_interval(i, level);
                Ok(ParameterSummary {
                    name: name.clone(),
                    mean: result.mean(i),
                    sd: result.variance(i).sqrt(),
                    ci_low,
                    ci_high,
                    map: map_estimate(result, i, DEFAULT_KDE_GRID)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            level,
            parameters,
            ess: effective_sample_size(&result.weights()),
            n_rounds: result.rounds.len(),
            total_simulations: result.total_simulations(),
            status: result.status,
        })
    }
}

/// Distances to `observed_summary` of `n_draws` series simulated from
/// weight-resampled posterior particles.
///
/// Draw `i` uses its own RNG seeded with `seed + i`. Draws whose simulation
/// fails with a candidate-local error are skipped, so the output can be
/// shorter than `n_draws`.
pub fn posterior_predictive_distances<M: GenerativeModel>(
    model: &M,
    distance: DistanceMetric,
    observed_summary: &[f64],
    result: &PosteriorResult,
    n_draws: usize,
    seed: u64,
) -> Result<Vec<f64>> {
    if n_draws == 0 {
        return Err(Error::Validation("n_draws must be > 0".to_string()));
    }
    if result.population.is_empty() {
        return Err(Error::Validation("posterior population is empty".to_string()));
    }
    let picker = WeightedIndex::new(result.weights())
        .map_err(|e| Error::Computation(format!("posterior weights: {e}")))?;
    let particles = &result.population.particles;

    let draws: Vec<Option<f64>> = (0..n_draws)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
            let theta = &particles[picker.sample(&mut rng)].params;
            let scored = model
                .simulate(theta, model.series_length(), model.dt(), &mut rng)
                .and_then(|s| model.summary(&s))
                .and_then(|s| distance.compute(&s, observed_summary));
            match scored {
                Ok(d) => Ok(Some(d)),
                Err(e) if e.is_candidate_local() => Ok(None),
                Err(e) => Err(e),
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let out: Vec<f64> = draws.into_iter().flatten().collect();
    if out.len() < n_draws {
        log::warn!("posterior predictive: {} of {n_draws} draws discarded", n_draws - out.len());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ObservedData;
    use crate::distance::Norm;
    use crate::model::{ModelSpec, ProcessVariant, TimescaleModel};
    use crate::summary::SummaryStatistic;
    use tau_core::{Particle, Population, StopReason};
    use tau_prob::{JointPrior, ParamPrior, PriorSpec};

    fn result(values: &[f64]) -> PosteriorResult {
        let w = 1.0 / values.len() as f64;
        PosteriorResult {
            parameter_names: vec!["tau".to_string()],
            population: Population {
                round: 1,
                threshold: 1.0,
                particles: values.iter().map(|&v| Particle::new(vec![v], 0.1, w)).collect(),
                complete: true,
            },
            rounds: vec![],
            status: RunStatus::Converged { reason: StopReason::MaxRounds },
            seed: 0,
        }
    }

    #[test]
    fn test_summary_fields() {
        let r = result(&[9.0, 10.0, 10.0, 10.5, 11.0, 10.0]);
        let s = PosteriorSummary::from_result(&r, 0.9).unwrap();
        assert_eq!(s.parameters.len(), 1);
        let p = &s.parameters[0];
        assert_eq!(p.name, "tau");
        assert!((p.map - 10.0).abs() < 0.5, "map={}", p.map);
        assert!(p.ci_low <= p.mean && p.mean <= p.ci_high);
        assert!((s.ess - 6.0).abs() < 1e-9);
        assert!(map_estimate(&r, 3, 64).is_err());
    }

    #[test]
    fn test_predictive_distances_deterministic() {
        let obs: Vec<f64> = (0..200).map(|i| (i as f64 * 0.1).sin()).collect();
        let observed = ObservedData::new(obs, 1.0).unwrap();
        let prior = JointPrior::new(vec![PriorSpec::new(
            "tau",
            ParamPrior::Uniform { low: 1.0, high: 50.0 },
        )])
        .unwrap();
        let spec = ModelSpec {
            variant: ProcessVariant::OneTimescale,
            missing_data: false,
            bin_size: None,
            summary: SummaryStatistic::Acf { max_lag: 10, bias_corrected: false },
        };
        let model = TimescaleModel::new(&spec, prior, &observed).unwrap();
        let obs_summary = model.summary(observed.values()).unwrap();
        let r = result(&[5.0, 8.0, 12.0]);
        let d = DistanceMetric::Linear { norm: Norm::MeanSquared };
        let a = posterior_predictive_distances(&model, d, &obs_summary, &r, 50, 3).unwrap();
        let b = posterior_predictive_distances(&model, d, &obs_summary, &r, 50, 3).unwrap();
        assert_eq!(a.len(), 50);
        assert_eq!(a, b);
        assert!(a.iter().all(|v| *v >= 0.0));
    }
}
