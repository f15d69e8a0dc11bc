//! Timescale model variants.
//!
//! [`TimescaleModel`] binds a process variant to its prior, the configured
//! summary statistic and the preprocessing derived from the observed data
//! (rescaling to the observed mean and variance, optional binning and the
//! missing-entry mask).

use rand::Rng;
use serde::{Deserialize, Serialize};
use tau_core::{Error, GenerativeModel, Prior, Result};
use tau_prob::JointPrior;

use crate::data::{self, ObservedData};
use crate::simulate;
use crate::summary::SummaryStatistic;

/// Closed set of generative processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessVariant {
    /// One OU timescale: `[tau]`.
    OneTimescale,
    /// OU plus a sinusoid: `[tau, freq, coeff]`.
    OneTimescaleOscillation,
    /// Two OU timescales: `[tau1, tau2, coeff]`.
    TwoTimescales,
}

impl ProcessVariant {
    /// Number of parameters.
    pub fn n_params(self) -> usize {
        self.parameter_names().len()
    }

    /// Canonical parameter names, in parameter-vector order.
    pub fn parameter_names(self) -> &'static [&'static str] {
        match self {
            ProcessVariant::OneTimescale => &["tau"],
            ProcessVariant::OneTimescaleOscillation => &["tau", "freq", "coeff"],
            ProcessVariant::TwoTimescales => &["tau1", "tau2", "coeff"],
        }
    }

    /// Zero-mean, unit-variance realization.
    pub fn simulate<R: Rng + ?Sized>(
        self,
        theta: &[f64],
        length: usize,
        dt: f64,
        rng: &mut R,
    ) -> Result<Vec<f64>> {
        match self {
            ProcessVariant::OneTimescale => simulate::one_timescale(theta, length, dt, rng),
            ProcessVariant::OneTimescaleOscillation => {
                simulate::one_timescale_oscillation(theta, length, dt, rng)
            }
            ProcessVariant::TwoTimescales => simulate::two_timescales(theta, length, dt, rng),
        }
    }
}

/// Serializable model selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Process variant.
    pub variant: ProcessVariant,
    /// Missing-data form: simulated series receive the observed mask.
    pub missing_data: bool,
    /// Bin width in time units (a multiple of `dt`); `None` disables binning.
    pub bin_size: Option<f64>,
    /// Summary statistic applied to observed and simulated series.
    pub summary: SummaryStatistic,
}

/// A configured model variant, ready to be handed to the ABC engine.
#[derive(Debug, Clone)]
pub struct TimescaleModel {
    variant: ProcessVariant,
    prior: JointPrior,
    summary: SummaryStatistic,
    length: usize,
    dt: f64,
    mean: f64,
    std: f64,
    bin_factor: usize,
    mask: Option<Vec<bool>>,
}

impl TimescaleModel {
    /// Build a model for `observed`.
    ///
    /// The prior must have one entry per variant parameter, in variant order.
    /// Observed data with missing entries requires the missing-data form, and
    /// the missing-data form requires a statistic that handles missing entries.
    pub fn new(spec: &ModelSpec, prior: JointPrior, observed: &ObservedData) -> Result<Self> {
        let n_params = spec.variant.n_params();
        if prior.dim() != n_params {
            return Err(Error::ShapeMismatch { expected: n_params, actual: prior.dim() });
        }
        spec.summary.validate()?;
        if observed.has_missing() && !spec.missing_data {
            return Err(Error::UnsupportedInput(format!(
                "observed data has {} missing entries; select the missing-data form of {:?}",
                observed.n_missing(),
                spec.variant
            )));
        }
        if spec.missing_data && !spec.summary.supports_missing() {
            return Err(Error::UnsupportedInput(format!(
                "missing-data models need a statistic that handles missing entries, got {}",
                spec.summary.name()
            )));
        }
        let bin_factor = match spec.bin_size {
            Some(b) => data::bin_factor(observed.dt(), b)?,
            None => 1,
        };
        if observed.len() / bin_factor < 2 {
            return Err(Error::Validation(format!(
                "binning by {bin_factor} leaves fewer than 2 samples out of {}",
                observed.len()
            )));
        }
        Ok(Self {
            variant: spec.variant,
            prior,
            summary: spec.summary.clone(),
            length: observed.len(),
            dt: observed.dt(),
            mean: observed.mean(),
            std: observed.variance().sqrt(),
            bin_factor,
            mask: spec.missing_data.then(|| observed.missing_mask()),
        })
    }

    /// Process variant.
    pub fn variant(&self) -> ProcessVariant {
        self.variant
    }

    /// Configured summary statistic.
    pub fn summary_statistic(&self) -> &SummaryStatistic {
        &self.summary
    }

    /// Samples per bin (1 when binning is off).
    pub fn bin_factor(&self) -> usize {
        self.bin_factor
    }

    /// Whether simulated series receive the observed mask.
    pub fn is_missing_data(&self) -> bool {
        self.mask.is_some()
    }
}

impl GenerativeModel for TimescaleModel {
    type Prior = JointPrior;

    fn prior(&self) -> &JointPrior {
        &self.prior
    }

    fn parameter_names(&self) -> Vec<String> {
        self.prior.names()
    }

    fn series_length(&self) -> usize {
        self.length
    }

    fn dt(&self) -> f64 {
        self.dt
    }

    fn simulate<R: Rng + ?Sized>(
        &self,
        theta: &[f64],
        length: usize,
        dt: f64,
        rng: &mut R,
    ) -> Result<Vec<f64>> {
        let mut series = self.variant.simulate(theta, length, dt, rng)?;
        for x in series.iter_mut() {
            *x = self.mean + self.std * *x;
        }
        if let Some(m) = self.mask.as_deref() {
            data::apply_mask(&mut series, m)?;
        }
        if series.iter().any(|x| x.is_infinite()) {
            return Err(Error::InvalidParameter(format!("non-finite simulation for {theta:?}")));
        }
        Ok(series)
    }

    fn summary(&self, series: &[f64]) -> Result<Vec<f64>> {
        if series.len() != self.length {
            return Err(Error::ShapeMismatch { expected: self.length, actual: series.len() });
        }
        let binned = data::bin_series(series, self.bin_factor);
        let out = self.summary.compute(&binned, self.dt * self.bin_factor as f64)?;
        let expected = self.summary.output_len(binned.len());
        if out.len() != expected {
            return Err(Error::ShapeMismatch { expected, actual: out.len() });
        }
        Ok(out)
    }

    fn nonnegative_summary(&self) -> bool {
        self.summary.is_nonnegative()
    }
}
