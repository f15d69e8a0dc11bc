//! Lomb-Scargle periodogram for unevenly sampled series.
//!
//! Missing samples (`NaN`) are dropped and the remaining samples keep their
//! original timestamps `i * dt`.

use tau_core::{Error, Result};

/// Classic Lomb-Scargle power, normalised by the sample variance, at each
/// frequency (cycles per time unit) of `frequencies`.
///
/// A series with zero variance has zero power everywhere.
pub fn lomb_scargle(series: &[f64], dt: f64, frequencies: &[f64]) -> Result<Vec<f64>> {
    validate_frequencies(frequencies)?;
    let (t, y): (Vec<f64>, Vec<f64>) = series
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .map(|(i, &v)| (i as f64 * dt, v))
        .unzip();
    if y.len() < 2 {
        return Err(Error::Validation(format!(
            "Lomb-Scargle needs >= 2 observed samples, got {}",
            y.len()
        )));
    }
    let n = y.len() as f64;
    let mean = y.iter().sum::<f64>() / n;
    let y: Vec<f64> = y.iter().map(|v| v - mean).collect();
    let var = y.iter().map(|v| v * v).sum::<f64>() / n;
    if var <= 0.0 {
        return Ok(vec![0.0; frequencies.len()]);
    }

    Ok(frequencies
        .iter()
        .map(|&f| {
            let w = 2.0 * std::f64::consts::PI * f;
            let (s2, c2) = t.iter().fold((0.0, 0.0), |(s, c), &ti| {
                let (sn, cs) = (2.0 * w * ti).sin_cos();
                (s + sn, c + cs)
            });
            let tau = s2.atan2(c2) / (2.0 * w);

            let (mut yc, mut ys, mut cc, mut ss) = (0.0, 0.0, 0.0, 0.0);
            for (&ti, &yi) in t.iter().zip(&y) {
                let (sn, cs) = (w * (ti - tau)).sin_cos();
                yc += yi * cs;
                ys += yi * sn;
                cc += cs * cs;
                ss += sn * sn;
            }
            let term = |num: f64, den: f64| if den > 1e-12 { num * num / den } else { 0.0 };
            (term(yc, cc) + term(ys, ss)) / (2.0 * var)
        })
        .collect())
}

pub(crate) fn validate_frequencies(frequencies: &[f64]) -> Result<()> {
    if frequencies.is_empty() {
        return Err(Error::Validation("Lomb-Scargle frequency grid is empty".to_string()));
    }
    if let Some(f) = frequencies.iter().find(|f| !(f.is_finite() && **f > 0.0)) {
        return Err(Error::Validation(format!("Lomb-Scargle frequency must be finite and > 0, got {f}")));
    }
    Ok(())
}

/// `n` evenly spaced frequencies from `f_min` to `f_max` inclusive.
pub fn linear_frequency_grid(f_min: f64, f_max: f64, n: usize) -> Result<Vec<f64>> {
    if !(f_min.is_finite() && f_max.is_finite()) || f_min <= 0.0 || f_max <= f_min || n < 2 {
        return Err(Error::Validation(format!(
            "frequency grid requires 0 < f_min < f_max and n >= 2, got ({f_min}, {f_max}, {n})"
        )));
    }
    let step = (f_max - f_min) / (n - 1) as f64;
    Ok((0..n).map(|i| f_min + step * i as f64).collect())
}
