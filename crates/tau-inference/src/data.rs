//! Observed time series and the preprocessing shared by observed and
//! simulated data (binning, missing-entry masks).
//!
//! Missing entries are represented by `NaN`. Everything downstream treats a
//! `NaN` sample as "not observed", never as a numeric value.

use tau_core::{Error, Result};

/// Observed time series, read-only for the lifetime of an inference run.
#[derive(Debug, Clone)]
pub struct ObservedData {
    values: Vec<f64>,
    dt: f64,
}

impl ObservedData {
    /// Build from raw samples; `NaN` marks a missing entry.
    ///
    /// Requires `dt > 0`, no infinite samples and at least two observed
    /// (non-missing) samples.
    pub fn new(values: Vec<f64>, dt: f64) -> Result<Self> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(Error::Validation(format!("dt must be finite and > 0, got {dt}")));
        }
        if let Some(i) = values.iter().position(|v| v.is_infinite()) {
            return Err(Error::Validation(format!("sample {i} is infinite")));
        }
        let observed = values.iter().filter(|v| !v.is_nan()).count();
        if observed < 2 {
            return Err(Error::Validation(format!(
                "need at least 2 observed samples, got {observed}"
            )));
        }
        Ok(Self { values, dt })
    }

    /// Build from optional samples (`None` = missing), as parsed from JSON.
    pub fn from_options(values: &[Option<f64>], dt: f64) -> Result<Self> {
        Self::new(values.iter().map(|v| v.unwrap_or(f64::NAN)).collect(), dt)
    }

    /// Raw samples (`NaN` = missing).
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Sampling interval.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Number of samples, including missing ones.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series has no samples (never true for a constructed value).
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Total duration `len * dt`.
    pub fn duration(&self) -> f64 {
        self.values.len() as f64 * self.dt
    }

    /// `true` at missing positions.
    pub fn missing_mask(&self) -> Vec<bool> {
        self.values.iter().map(|v| v.is_nan()).collect()
    }

    /// Whether any entry is missing.
    pub fn has_missing(&self) -> bool {
        self.values.iter().any(|v| v.is_nan())
    }

    /// Number of missing entries.
    pub fn n_missing(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }

    /// Mean of the observed entries.
    pub fn mean(&self) -> f64 {
        let (sum, n) = self.observed().fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        sum / n as f64
    }

    /// Population variance (divide by `n`) of the observed entries.
    pub fn variance(&self) -> f64 {
        let m = self.mean();
        let (ss, n) = self.observed().fold((0.0, 0usize), |(s, n), v| (s + (v - m).powi(2), n + 1));
        ss / n as f64
    }

    fn observed(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied().filter(|v| !v.is_nan())
    }
}

/// Number of raw samples per bin for a bin width of `bin_size` time units.
///
/// `bin_size` must be a positive integer multiple of `dt`.
pub fn bin_factor(dt: f64, bin_size: f64) -> Result<usize> {
    if !bin_size.is_finite() || bin_size <= 0.0 {
        return Err(Error::Validation(format!("bin_size must be finite and > 0, got {bin_size}")));
    }
    let ratio = bin_size / dt;
    let factor = ratio.round();
    if factor < 1.0 || (ratio - factor).abs() > 1e-9 * ratio.max(1.0) {
        return Err(Error::Validation(format!(
            "bin_size ({bin_size}) must be an integer multiple of dt ({dt})"
        )));
    }
    Ok(factor as usize)
}

/// Sum consecutive groups of `factor` samples; a trailing partial bin is
/// dropped. A bin containing a missing sample is missing.
pub fn bin_series(values: &[f64], factor: usize) -> Vec<f64> {
    if factor <= 1 {
        return values.to_vec();
    }
    values.chunks_exact(factor).map(|c| c.iter().sum()).collect()
}

/// Overwrite masked positions with `NaN`.
pub fn apply_mask(series: &mut [f64], mask: &[bool]) -> Result<()> {
    if series.len() != mask.len() {
        return Err(Error::ShapeMismatch { expected: mask.len(), actual: series.len() });
    }
    for (x, &m) in series.iter_mut().zip(mask.iter()) {
        if m {
            *x = f64::NAN;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_observed_stats_skip_missing() {
        let d = ObservedData::new(vec![1.0, f64::NAN, 3.0, 5.0], 0.5).unwrap();
        assert_eq!(d.len(), 4);
        assert_eq!(d.n_missing(), 1);
        assert!(d.has_missing());
        assert_eq!(d.missing_mask(), vec![false, true, false, false]);
        assert_relative_eq!(d.mean(), 3.0, epsilon = 1e-12);
        assert_relative_eq!(d.variance(), 8.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(d.duration(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_from_options() {
        let d = ObservedData::from_options(&[Some(1.0), None, Some(2.0)], 1.0).unwrap();
        assert!(d.values()[1].is_nan());
    }

    #[test]
    fn test_invalid_observed() {
        assert!(ObservedData::new(vec![1.0, 2.0], 0.0).is_err());
        assert!(ObservedData::new(vec![1.0, f64::INFINITY], 1.0).is_err());
        assert!(ObservedData::new(vec![1.0, f64::NAN], 1.0).is_err());
    }

    #[test]
    fn test_bin_factor() {
        assert_eq!(bin_factor(1.0, 1.0).unwrap(), 1);
        assert_eq!(bin_factor(0.5, 2.0).unwrap(), 4);
        assert!(bin_factor(1.0, 1.5).is_err());
        assert!(bin_factor(1.0, 0.5).is_err());
    }

    #[test]
    fn test_bin_series_propagates_missing() {
        let b = bin_series(&[1.0, 2.0, f64::NAN, 4.0, 5.0], 2);
        assert_eq!(b.len(), 2);
        assert_relative_eq!(b[0], 3.0, epsilon = 1e-12);
        assert!(b[1].is_nan());
    }

    #[test]
    fn test_apply_mask() {
        let mut s = vec![1.0, 2.0, 3.0];
        apply_mask(&mut s, &[false, true, false]).unwrap();
        assert!(s[1].is_nan() && s[0] == 1.0);
        assert!(apply_mask(&mut s, &[true]).is_err());
    }
}
