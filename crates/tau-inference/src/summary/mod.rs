//! Summary statistics: reduce a series to a fixed-length vector.
//!
//! Every statistic is deterministic. Only [`SummaryStatistic::LombScargle`]
//! accepts series with missing (`NaN`) entries; the others fail with
//! [`Error::UnsupportedInput`].

pub mod acf;
pub mod lomb_scargle;
pub mod psd;

use serde::{Deserialize, Serialize};
use tau_core::{Error, Result};

pub use acf::acf;
pub use lomb_scargle::{linear_frequency_grid, lomb_scargle};
pub use psd::{Window, fourier_frequencies, periodogram, welch};

/// Configured summary statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SummaryStatistic {
    /// Autocorrelation at lags `0..=max_lag`.
    Acf {
        /// Largest lag (in samples).
        max_lag: usize,
        /// Divide lag-`k` autocovariance by `n - k` instead of `n`.
        bias_corrected: bool,
    },
    /// One-sided FFT periodogram.
    Periodogram {
        /// Divide by total power.
        normalize: bool,
    },
    /// Welch averaged periodogram.
    Welch {
        /// Samples per segment.
        segment_len: usize,
        /// Samples shared by consecutive segments.
        overlap: usize,
        /// Segment taper.
        window: Window,
        /// Divide by total power.
        normalize: bool,
    },
    /// Lomb-Scargle periodogram on an explicit frequency grid.
    LombScargle {
        /// Frequencies, in cycles per time unit.
        frequencies: Vec<f64>,
        /// Divide by total power.
        normalize: bool,
    },
}

impl SummaryStatistic {
    /// Check the configuration itself (independent of any series).
    pub fn validate(&self) -> Result<()> {
        match self {
            SummaryStatistic::Acf { .. } | SummaryStatistic::Periodogram { .. } => Ok(()),
            SummaryStatistic::Welch { segment_len, overlap, .. } => {
                psd::validate_welch(*segment_len, *overlap)
            }
            SummaryStatistic::LombScargle { frequencies, .. } => {
                lomb_scargle::validate_frequencies(frequencies)
            }
        }
    }

    /// Whether the statistic can be computed on a series with missing entries.
    pub fn supports_missing(&self) -> bool {
        matches!(self, SummaryStatistic::LombScargle { .. })
    }

    /// Power spectra are non-negative; autocorrelations are not.
    pub fn is_nonnegative(&self) -> bool {
        !matches!(self, SummaryStatistic::Acf { .. })
    }

    /// Summary length produced for a series of `series_len` samples.
    pub fn output_len(&self, series_len: usize) -> usize {
        match self {
            SummaryStatistic::Acf { max_lag, .. } => max_lag + 1,
            SummaryStatistic::Periodogram { .. } => series_len / 2,
            SummaryStatistic::Welch { segment_len, .. } => segment_len / 2,
            SummaryStatistic::LombScargle { frequencies, .. } => frequencies.len(),
        }
    }

    /// Short label for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            SummaryStatistic::Acf { .. } => "acf",
            SummaryStatistic::Periodogram { .. } => "periodogram",
            SummaryStatistic::Welch { .. } => "welch",
            SummaryStatistic::LombScargle { .. } => "lomb_scargle",
        }
    }

    /// Reduce `series` (sampling interval `dt`) to its summary vector.
    pub fn compute(&self, series: &[f64], dt: f64) -> Result<Vec<f64>> {
        if !self.supports_missing() && series.iter().any(|v| v.is_nan()) {
            return Err(Error::UnsupportedInput(format!(
                "{} cannot handle missing entries; use lomb_scargle",
                self.name()
            )));
        }
        match self {
            SummaryStatistic::Acf { max_lag, bias_corrected } => {
                acf(series, *max_lag, *bias_corrected)
            }
            SummaryStatistic::Periodogram { normalize } => {
                periodogram(series, dt).map(|p| maybe_normalize(p, *normalize))
            }
            SummaryStatistic::Welch { segment_len, overlap, window, normalize } => {
                welch(series, dt, *segment_len, *overlap, *window)
                    .map(|p| maybe_normalize(p, *normalize))
            }
            SummaryStatistic::LombScargle { frequencies, normalize } => {
                lomb_scargle(series, dt, frequencies).map(|p| maybe_normalize(p, *normalize))
            }
        }
    }
}

fn maybe_normalize(mut power: Vec<f64>, normalize: bool) -> Vec<f64> {
    if normalize {
        let total: f64 = power.iter().sum();
        if total > 0.0 && total.is_finite() {
            power.iter_mut().for_each(|p| *p /= total);
        }
    }
    power
}
