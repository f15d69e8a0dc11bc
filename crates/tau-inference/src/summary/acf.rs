//! Sample autocorrelation function.

use tau_core::{Error, Result};

/// Mean-removed sample ACF at lags `0..=max_lag`, normalised so lag 0 is 1.
///
/// With `bias_corrected` each lag-`k` autocovariance is divided by `n - k`
/// instead of `n`. A constant series has no variance; its ACF is reported as
/// `[1, 0, 0, ...]`.
pub fn acf(series: &[f64], max_lag: usize, bias_corrected: bool) -> Result<Vec<f64>> {
    let n = series.len();
    if max_lag >= n {
        return Err(Error::Validation(format!(
            "ACF max_lag ({max_lag}) must be < series length ({n})"
        )));
    }
    let mean = series.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = series.iter().map(|x| x - mean).collect();

    let autocov = |k: usize| -> f64 {
        let s: f64 = centered[..n - k].iter().zip(&centered[k..]).map(|(a, b)| a * b).sum();
        if bias_corrected { s / (n - k) as f64 } else { s / n as f64 }
    };

    let c0 = autocov(0);
    let mut out = vec![0.0; max_lag + 1];
    out[0] = 1.0;
    if c0 <= 0.0 || !c0.is_finite() {
        return Ok(out);
    }
    for (k, slot) in out.iter_mut().enumerate().skip(1) {
        *slot = autocov(k) / c0;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_acf_alternating() {
        let x: Vec<f64> = (0..100).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let r = acf(&x, 2, false).unwrap();
        assert_eq!(r.len(), 3);
        assert_relative_eq!(r[0], 1.0);
        assert_relative_eq!(r[1], -0.99, epsilon = 1e-12);
        assert_relative_eq!(r[2], 0.98, epsilon = 1e-12);

        let rc = acf(&x, 2, true).unwrap();
        assert_relative_eq!(rc[1], -1.0, epsilon = 1e-12);
        assert_relative_eq!(rc[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_acf_constant_series() {
        assert_eq!(acf(&[2.0; 10], 3, false).unwrap(), vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_acf_lag_too_large() {
        assert!(matches!(acf(&[1.0, 2.0, 3.0], 3, false), Err(Error::Validation(_))));
    }
}
