//! Log-normal distribution utilities.

use tau_core::{Error, Result};

/// Log-PDF of LogNormal(mu, sigma) at `x`.
///
/// Defined as: `ln X ~ Normal(mu, sigma)`. Support: `x > 0`.
pub fn logpdf(x: f64, mu: f64, sigma: f64) -> Result<f64> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(Error::Validation(format!("sigma must be finite and > 0, got {}", sigma)));
    }
    if !x.is_finite() || x <= 0.0 {
        return Ok(f64::NEG_INFINITY);
    }
    let lx = x.ln();
    Ok(crate::normal::logpdf(lx, mu, sigma)? - lx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_of_variables() {
        let x: f64 = 3.0;
        let lp = logpdf(x, 1.0, 0.5).unwrap();
        let reference = crate::normal::logpdf(x.ln(), 1.0, 0.5).unwrap() - x.ln();
        assert!((lp - reference).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_support_and_invalid() {
        assert_eq!(logpdf(0.0, 0.0, 1.0).unwrap(), f64::NEG_INFINITY);
        assert_eq!(logpdf(-1.0, 0.0, 1.0).unwrap(), f64::NEG_INFINITY);
        assert!(logpdf(1.0, 0.0, 0.0).is_err());
        assert!(logpdf(-1.0, 0.0, 0.0).is_err());
    }
}
