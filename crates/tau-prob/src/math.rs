//! Small numerically-stable math utilities used across probability code.

/// Stable `log(sum(exp(x_i)))`.
///
/// Returns `-inf` for empty input or when every term is `-inf`.
pub fn log_sum_exp(xs: &[f64]) -> f64 {
    let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    let s: f64 = xs.iter().map(|&x| (x - max).exp()).sum();
    max + s.ln()
}

/// Exponential with a conservative clamp to avoid overflow.
///
/// Importance weights are formed as `exp(log_w - max_log_w)`; the clamp keeps a
/// pathological `-inf` difference from producing NaN downstream.
#[inline]
pub fn exp_clamped(x: f64) -> f64 {
    x.clamp(-700.0, 700.0).exp()
}
