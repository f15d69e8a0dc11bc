//! Continuous uniform distribution utilities.

use tau_core::{Error, Result};

/// Log-PDF of Uniform(low, high) at `x`; the support is the closed interval.
pub fn logpdf(x: f64, low: f64, high: f64) -> Result<f64> {
    if !(low.is_finite() && high.is_finite()) || high <= low {
        return Err(Error::Validation(format!(
            "uniform bounds must be finite with low < high, got [{}, {}]",
            low, high
        )));
    }
    if x < low || x > high || x.is_nan() {
        return Ok(f64::NEG_INFINITY);
    }
    Ok(-(high - low).ln())
}
