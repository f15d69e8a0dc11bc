//! Stochastic-process generators.
//!
//! All generators produce zero-mean, unit-variance (in the stationary limit)
//! paths sampled every `dt`:
//! - OU: `x_{t+1} = a x_t + sqrt(1 - a^2) xi_t`, `a = exp(-dt / tau)`, `x_0 ~ N(0, 1)`
//! - oscillation: `sqrt(c) OU(tau) + sqrt(2 (1 - c)) sin(2 pi f t + phi)`, `phi ~ U[0, 2 pi)`
//! - two timescales: `sqrt(c) OU(tau1) + sqrt(1 - c) OU(tau2)`

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use tau_core::{Error, Result};

fn check_timescale(name: &str, tau: f64) -> Result<()> {
    if !(tau.is_finite() && tau > 0.0) {
        return Err(Error::InvalidParameter(format!("{name} must be finite and > 0, got {tau}")));
    }
    Ok(())
}

fn check_coeff(c: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&c) {
        return Err(Error::InvalidParameter(format!("coeff must lie in [0, 1], got {c}")));
    }
    Ok(())
}

fn check_sampling(length: usize, dt: f64) -> Result<()> {
    if length == 0 {
        return Err(Error::Validation("series length must be > 0".to_string()));
    }
    if !(dt.is_finite() && dt > 0.0) {
        return Err(Error::Validation(format!("dt must be finite and > 0, got {dt}")));
    }
    Ok(())
}

/// Stationary Ornstein-Uhlenbeck path with timescale `tau`.
pub fn ou_path<R: Rng + ?Sized>(tau: f64, length: usize, dt: f64, rng: &mut R) -> Result<Vec<f64>> {
    check_timescale("tau", tau)?;
    check_sampling(length, dt)?;
    let a = (-dt / tau).exp();
    let b = (1.0 - a * a).sqrt();
    let mut out = Vec::with_capacity(length);
    let mut x: f64 = StandardNormal.sample(rng);
    out.push(x);
    for _ in 1..length {
        let xi: f64 = StandardNormal.sample(rng);
        x = a * x + b * xi;
        out.push(x);
    }
    Ok(out)
}

/// Single timescale: θ = `[tau]`.
pub fn one_timescale<R: Rng + ?Sized>(
    theta: &[f64],
    length: usize,
    dt: f64,
    rng: &mut R,
) -> Result<Vec<f64>> {
    let [tau] = unpack::<1>(theta)?;
    ou_path(tau, length, dt, rng)
}

/// Single timescale plus sinusoid: θ = `[tau, freq, coeff]`.
pub fn one_timescale_oscillation<R: Rng + ?Sized>(
    theta: &[f64],
    length: usize,
    dt: f64,
    rng: &mut R,
) -> Result<Vec<f64>> {
    let [tau, freq, coeff] = unpack::<3>(theta)?;
    if !(freq.is_finite() && freq > 0.0) {
        return Err(Error::InvalidParameter(format!("freq must be finite and > 0, got {freq}")));
    }
    check_coeff(coeff)?;
    let ou = ou_path(tau, length, dt, rng)?;
    let phase = rng.random::<f64>() * std::f64::consts::TAU;
    let (w_ou, w_osc) = (coeff.sqrt(), (2.0 * (1.0 - coeff)).sqrt());
    Ok(ou
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let t = i as f64 * dt;
            w_ou * x + w_osc * (std::f64::consts::TAU * freq * t + phase).sin()
        })
        .collect())
}

/// Mixture of two OU processes: θ = `[tau1, tau2, coeff]`.
///
/// No ordering between `tau1` and `tau2` is imposed.
pub fn two_timescales<R: Rng + ?Sized>(
    theta: &[f64],
    length: usize,
    dt: f64,
    rng: &mut R,
) -> Result<Vec<f64>> {
    let [tau1, tau2, coeff] = unpack::<3>(theta)?;
    check_timescale("tau1", tau1)?;
    check_timescale("tau2", tau2)?;
    check_coeff(coeff)?;
    let x1 = ou_path(tau1, length, dt, rng)?;
    let x2 = ou_path(tau2, length, dt, rng)?;
    let (w1, w2) = (coeff.sqrt(), (1.0 - coeff).sqrt());
    Ok(x1.iter().zip(&x2).map(|(a, b)| w1 * a + w2 * b).collect())
}

fn unpack<const N: usize>(theta: &[f64]) -> Result<[f64; N]> {
    <[f64; N]>::try_from(theta).map_err(|_| Error::ShapeMismatch { expected: N, actual: theta.len() })
}
