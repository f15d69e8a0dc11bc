//! Gamma distribution utilities.

use statrs::function::gamma::ln_gamma;
use tau_core::{Error, Result};

/// Log-PDF of a Gamma distribution with `shape` and `scale` at `x`.
///
/// Parameterization:
/// - `shape > 0`
/// - `scale > 0`
///
/// Support: `x >= 0`. The density at `x = 0` follows the limit for the given
/// shape (`+inf` for `shape < 1`, `-ln(scale)` for `shape == 1`).
pub fn logpdf_shape_scale(x: f64, shape: f64, scale: f64) -> Result<f64> {
    if !shape.is_finite() || shape <= 0.0 {
        return Err(Error::Validation(format!("shape must be finite and > 0, got {}", shape)));
    }
    if !scale.is_finite() || scale <= 0.0 {
        return Err(Error::Validation(format!("scale must be finite and > 0, got {}", scale)));
    }
    if x < 0.0 {
        return Ok(f64::NEG_INFINITY);
    }
    if x == 0.0 {
        return Ok(if shape < 1.0 {
            f64::INFINITY
        } else if shape > 1.0 {
            f64::NEG_INFINITY
        } else {
            -scale.ln()
        });
    }
    Ok((shape - 1.0) * x.ln() - x / scale - ln_gamma(shape) - shape * scale.ln())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_one_matches_exponential() {
        let lp_g = logpdf_shape_scale(0.7, 1.0, 0.5).unwrap();
        let lp_e = crate::exponential::logpdf(0.7, 2.0).unwrap();
        assert!((lp_g - lp_e).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_support() {
        assert_eq!(logpdf_shape_scale(-0.1, 2.0, 1.0).unwrap(), f64::NEG_INFINITY);
        assert_eq!(logpdf_shape_scale(0.0, 2.0, 1.0).unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_invalid_params() {
        assert!(logpdf_shape_scale(1.0, 0.0, 1.0).is_err());
        assert!(logpdf_shape_scale(1.0, 1.0, -2.0).is_err());
    }
}
