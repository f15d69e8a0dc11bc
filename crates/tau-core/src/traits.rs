//! Core traits for tau
//!
//! The ABC engine is written against these two capabilities only. Concrete
//! priors live in `tau-prob`; concrete generative models (OU variants) live in
//! `tau-inference`.

use rand::Rng;

use crate::Result;

/// Prior distribution over a fixed-dimension parameter vector.
pub trait Prior: Send + Sync {
    /// Parameter dimension.
    fn dim(&self) -> usize;

    /// Draw one parameter vector.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64>;

    /// Joint log-density at `theta`; `-inf` outside the support.
    fn log_density(&self, theta: &[f64]) -> f64;

    /// Whether `theta` lies in the support (finite log-density).
    fn in_support(&self, theta: &[f64]) -> bool {
        theta.len() == self.dim() && self.log_density(theta).is_finite()
    }
}

/// Simulator-based statistical model: prior, simulator and summary reduction.
///
/// Implementations must not hold shared mutable state: the engine calls
/// `simulate` and `summary` concurrently from worker threads, each with its
/// own random source.
pub trait GenerativeModel: Send + Sync {
    /// Prior type.
    type Prior: Prior;

    /// The joint prior (deterministic given the model configuration).
    fn prior(&self) -> &Self::Prior;

    /// Parameter names, in parameter-vector order.
    fn parameter_names(&self) -> Vec<String>;

    /// Configured length of a simulated series, in samples.
    fn series_length(&self) -> usize;

    /// Configured sampling interval.
    fn dt(&self) -> f64;

    /// Produce one synthetic realization.
    ///
    /// Fails with [`crate::Error::InvalidParameter`] when `theta` violates a
    /// model-specific domain constraint.
    fn simulate<R: Rng + ?Sized>(
        &self,
        theta: &[f64],
        length: usize,
        dt: f64,
        rng: &mut R,
    ) -> Result<Vec<f64>>;

    /// Reduce a series to its summary vector.
    ///
    /// Fails with [`crate::Error::ShapeMismatch`] when the series length
    /// disagrees with [`GenerativeModel::series_length`].
    fn summary(&self, series: &[f64]) -> Result<Vec<f64>>;

    /// Whether every summary entry is `>= 0` for any input series.
    ///
    /// Distances that take logarithms require this.
    fn nonnegative_summary(&self) -> bool {
        false
    }

    /// Parameter dimension.
    fn dim(&self) -> usize {
        self.prior().dim()
    }
}
