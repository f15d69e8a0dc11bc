//! FFT power spectral density estimators (periodogram and Welch).
//!
//! Both return a one-sided density at the positive Fourier frequencies
//! `k / (m * dt)` for `k = 1..=m/2`, where `m` is the transform length. The DC
//! bin is dropped: every series is rescaled to the observed mean, so it
//! carries no timescale information.

use rustfft::{FftPlanner, num_complex::Complex};
use serde::{Deserialize, Serialize};
use tau_core::{Error, Result};

/// Taper applied to each Welch segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    /// Periodic Hann window.
    Hann,
    /// No taper.
    Rectangular,
}

impl Window {
    fn coefficients(self, m: usize) -> Vec<f64> {
        match self {
            Window::Rectangular => vec![1.0; m],
            Window::Hann => (0..m)
                .map(|i| {
                    let s = (std::f64::consts::PI * i as f64 / m as f64).sin();
                    s * s
                })
                .collect(),
        }
    }
}

/// One-sided power of an already-windowed segment, bins `1..=m/2`.
///
/// `scale` is the density normalisation (`dt / sum(w^2)`).
fn one_sided_power(
    planner: &mut FftPlanner<f64>,
    segment: &[f64],
    scale: f64,
) -> Vec<f64> {
    let m = segment.len();
    let fft = planner.plan_fft_forward(m);
    let mut buffer: Vec<Complex<f64>> = segment.iter().map(|&x| Complex::new(x, 0.0)).collect();
    fft.process(&mut buffer);

    let half = m / 2;
    (1..=half)
        .map(|k| {
            let p = buffer[k].norm_sqr() * scale;
            // Nyquist bin has no mirror image for even m.
            if m % 2 == 0 && k == half { p } else { 2.0 * p }
        })
        .collect()
}

/// Raw periodogram `2 |X_k|^2 dt / n`.
pub fn periodogram(series: &[f64], dt: f64) -> Result<Vec<f64>> {
    let n = series.len();
    if n < 2 {
        return Err(Error::Validation(format!("periodogram needs >= 2 samples, got {n}")));
    }
    let mut planner = FftPlanner::new();
    Ok(one_sided_power(&mut planner, series, dt / n as f64))
}

/// Welch's averaged modified periodogram.
///
/// Segments of `segment_len` samples overlap by `overlap` samples; each is
/// mean-removed and tapered before its periodogram is taken. A trailing
/// partial segment is ignored.
pub fn welch(
    series: &[f64],
    dt: f64,
    segment_len: usize,
    overlap: usize,
    window: Window,
) -> Result<Vec<f64>> {
    validate_welch(segment_len, overlap)?;
    let n = series.len();
    if n < segment_len {
        return Err(Error::Validation(format!(
            "Welch segment_len ({segment_len}) exceeds series length ({n})"
        )));
    }
    let step = segment_len - overlap;
    let w = window.coefficients(segment_len);
    let scale = dt / w.iter().map(|x| x * x).sum::<f64>();

    let mut planner = FftPlanner::new();
    let mut acc = vec![0.0; segment_len / 2];
    let mut n_segments = 0usize;
    let mut start = 0usize;
    while start + segment_len <= n {
        let seg = &series[start..start + segment_len];
        let mean = seg.iter().sum::<f64>() / segment_len as f64;
        let tapered: Vec<f64> = seg.iter().zip(&w).map(|(x, wi)| (x - mean) * wi).collect();
        for (a, p) in acc.iter_mut().zip(one_sided_power(&mut planner, &tapered, scale)) {
            *a += p;
        }
        n_segments += 1;
        start += step;
    }
    let inv = 1.0 / n_segments as f64;
    acc.iter_mut().for_each(|a| *a *= inv);
    Ok(acc)
}

pub(crate) fn validate_welch(segment_len: usize, overlap: usize) -> Result<()> {
    if segment_len < 2 {
        return Err(Error::Validation(format!("Welch segment_len must be >= 2, got {segment_len}")));
    }
    if overlap >= segment_len {
        return Err(Error::Validation(format!(
            "Welch overlap ({overlap}) must be < segment_len ({segment_len})"
        )));
    }
    Ok(())
}

/// Positive Fourier frequencies matching [`periodogram`] / [`welch`] output.
pub fn fourier_frequencies(m: usize, dt: f64) -> Vec<f64> {
    (1..=m / 2).map(|k| k as f64 / (m as f64 * dt)).collect()
}
