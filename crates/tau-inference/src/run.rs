//! Composition root: one serializable document describes a complete run.
//!
//! [`RunSpec`] names the observed data, model variant, priors, distance and
//! engine configuration; [`run_inference`] wires them together and runs the
//! engine. Nothing here is global: each call builds its own components.

use serde::{Deserialize, Serialize};
use tau_core::{PosteriorResult, Result};
use tau_prob::{JointPrior, PriorSpec};

use crate::abc::{AbcConfig, AbcEngine, CancelToken};
use crate::data::ObservedData;
use crate::distance::DistanceMetric;
use crate::model::{ModelSpec, TimescaleModel};
use crate::posterior::{PosteriorSummary, posterior_predictive_distances};

/// Observed series as stored in JSON (`null` marks a missing sample).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedSpec {
    /// Samples.
    pub values: Vec<Option<f64>>,
    /// Sampling interval.
    pub dt: f64,
}

impl ObservedSpec {
    /// From dense samples (`NaN` = missing).
    pub fn from_series(values: &[f64], dt: f64) -> Self {
        Self { values: values.iter().map(|v| (!v.is_nan()).then_some(*v)).collect(), dt }
    }
}

/// Everything needed to fit one model to one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
    /// Observed data.
    pub observed: ObservedSpec,
    /// Model variant, binning and summary statistic.
    pub model: ModelSpec,
    /// One prior per model parameter, in parameter order.
    pub priors: Vec<PriorSpec>,
    /// Distance between summaries.
    pub distance: DistanceMetric,
    /// Engine configuration.
    pub abc: AbcConfig,
    /// Posterior-predictive draws to score after the fit (`None` skips them).
    pub predictive_draws: Option<usize>,
}

/// Result of [`run_inference`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    /// Compact marginal summary; `None` when nothing was accepted.
    pub summary: Option<PosteriorSummary>,
    /// Full posterior with per-round diagnostics.
    pub posterior: PosteriorResult,
    /// Posterior-predictive distances, when requested.
    pub predictive_distances: Option<Vec<f64>>,
}

impl RunSpec {
    /// Parse and validate the observed series.
    pub fn observed_data(&self) -> Result<ObservedData> {
        ObservedData::from_options(&self.observed.values, self.observed.dt)
    }

    /// Build the model for `observed`.
    pub fn build_model(&self, observed: &ObservedData) -> Result<TimescaleModel> {
        let prior = JointPrior::new(self.priors.clone())?;
        TimescaleModel::new(&self.model, prior, observed)
    }
}

/// Build every component from `spec` and run the engine.
pub fn run_inference(spec: &RunSpec) -> Result<RunOutput> {
    run_inference_with_cancel(spec, CancelToken::new())
}

/// [`run_inference`] with an external cancellation flag.
pub fn run_inference_with_cancel(spec: &RunSpec, cancel: CancelToken) -> Result<RunOutput> {
    let observed = spec.observed_data()?;
    let model = spec.build_model(&observed)?;
    log::info!(
        "fitting {:?} (missing_data={}, summary={}) to {} samples ({} missing)",
        spec.model.variant,
        spec.model.missing_data,
        spec.model.summary.name(),
        observed.len(),
        observed.n_missing()
    );

    let mut engine = AbcEngine::new(&model, spec.distance, observed.values(), spec.abc.clone())?
        .with_cancel_token(cancel);
    let posterior = engine.run()?;

    let predictive_distances = match spec.predictive_draws {
        Some(n) if !posterior.population.is_empty() => Some(posterior_predictive_distances(
            &model,
            spec.distance,
            engine.observed_summary(),
            &posterior,
            n,
            spec.abc.seed.wrapping_add(u64::MAX / 2),
        )?),
        _ => None,
    };
    let summary = if posterior.population.is_empty() {
        None
    } else {
        Some(PosteriorSummary::from_result(&posterior, 0.95)?)
    };
    Ok(RunOutput { summary, posterior, predictive_distances })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_spec_json() {
        let json = r#"{
            "observed": {"values": [1.0, null, 2.0, 3.0], "dt": 1.0},
            "model": {
                "variant": "one_timescale",
                "missing_data": true,
                "bin_size": null,
                "summary": {"kind": "lomb_scargle", "frequencies": [0.1, 0.2], "normalize": false}
            },
            "priors": [{"name": "tau", "dist": "uniform", "low": 1.0, "high": 20.0}],
            "distance": {"kind": "linear", "norm": "mean_squared"},
            "abc": {
                "population_size": 10,
                "threshold": {"kind": "adaptive", "initial": {"kind": "quantile"}, "quantile": 0.5},
                "stopping": {"max_rounds": 2},
                "kernel_scale": 2.0,
                "max_attempts": 100,
                "seed": 1,
                "n_threads": 1
            },
            "predictive_draws": null
        }"#;
        let spec: RunSpec = serde_json::from_str(json).unwrap();
        let observed = spec.observed_data().unwrap();
        assert_eq!(observed.n_missing(), 1);
        assert!(spec.build_model(&observed).is_ok());
        assert_eq!(ObservedSpec::from_series(observed.values(), 1.0), spec.observed);
    }
}
