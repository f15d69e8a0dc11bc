//! Exponential distribution utilities.

use tau_core::{Error, Result};

/// Log-PDF of an Exponential distribution at `x` with rate `rate`.
///
/// Support: `x >= 0`.
pub fn logpdf(x: f64, rate: f64) -> Result<f64> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(Error::Validation(format!("rate must be finite and > 0, got {}", rate)));
    }
    if x < 0.0 {
        return Ok(f64::NEG_INFINITY);
    }
    Ok(rate.ln() - rate * x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timescale_prior_value() {
        // Exponential prior with mean 20 on a timescale.
        let lp = logpdf(20.0, 0.05).unwrap();
        assert!((lp - (0.05f64.ln() - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_negative_timescale_has_no_mass() {
        assert_eq!(logpdf(-0.1, 2.0).unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_invalid_rate() {
        assert!(logpdf(0.0, 0.0).is_err());
    }
}
