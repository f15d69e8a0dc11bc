//! Multivariate normal perturbation kernel.
//!
//! Stores the Cholesky factor of a covariance matrix once; sampling and
//! density evaluation around arbitrary centers reuse it.

use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use tau_core::{Error, Result};

/// Natural log of `2*pi`.
const LN_2PI: f64 = 1.837_877_066_409_345_3;

/// Zero-mean multivariate normal, evaluated around a caller-supplied center.
#[derive(Debug, Clone)]
pub struct MvNormal {
    l: DMatrix<f64>,
    log_norm: f64,
}

impl MvNormal {
    /// Build from a row-major `dim x dim` covariance matrix.
    ///
    /// Fails with [`Error::Computation`] when the matrix is not symmetric
    /// positive definite.
    pub fn from_covariance(cov: &[f64], dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::Validation("kernel dimension must be > 0".to_string()));
        }
        if cov.len() != dim * dim {
            return Err(Error::ShapeMismatch { expected: dim * dim, actual: cov.len() });
        }
        if cov.iter().any(|v| !v.is_finite()) {
            return Err(Error::Computation("kernel covariance has non-finite entries".to_string()));
        }
        let m = DMatrix::from_row_slice(dim, dim, cov);
        let chol = m.cholesky().ok_or_else(|| {
            Error::Computation("kernel covariance not SPD (Cholesky failed)".to_string())
        })?;
        let l = chol.l();
        if (0..dim).any(|i| !(l[(i, i)].is_finite() && l[(i, i)] > 0.0)) {
            return Err(Error::Computation("kernel covariance is singular".to_string()));
        }
        let log_det_half: f64 = (0..dim).map(|i| l[(i, i)].ln()).sum();
        let log_norm = -0.5 * dim as f64 * LN_2PI - log_det_half;
        Ok(Self { l, log_norm })
    }

    /// Build a diagonal kernel from per-dimension variances.
    pub fn from_variances(variances: &[f64]) -> Result<Self> {
        let dim = variances.len();
        let mut cov = vec![0.0; dim * dim];
        for (i, &v) in variances.iter().enumerate() {
            cov[i * dim + i] = v;
        }
        Self::from_covariance(&cov, dim)
    }

    /// Dimension.
    pub fn dim(&self) -> usize {
        self.l.nrows()
    }

    /// Draw `center + L z`, `z ~ N(0, I)`.
    pub fn sample_around<R: Rng + ?Sized>(&self, center: &[f64], rng: &mut R) -> Vec<f64> {
        let n = self.dim();
        let mut z = DVector::<f64>::zeros(n);
        for i in 0..n {
            z[i] = StandardNormal.sample(rng);
        }
        let step = &self.l * z;
        center.iter().zip(step.iter()).map(|(&c, &s)| c + s).collect()
    }

    /// Log-density of `x` under the kernel centered at `center`.
    pub fn log_density(&self, x: &[f64], center: &[f64]) -> f64 {
        let n = self.dim();
        if x.len() != n || center.len() != n {
            return f64::NEG_INFINITY;
        }
        let diff = DVector::from_iterator(n, x.iter().zip(center.iter()).map(|(&a, &b)| a - b));
        match self.l.solve_lower_triangular(&diff) {
            Some(y) => self.log_norm - 0.5 * y.norm_squared(),
            None => f64::NEG_INFINITY,
        }
    }
}
