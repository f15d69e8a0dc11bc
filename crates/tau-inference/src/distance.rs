//! Distances between summary vectors.

use serde::{Deserialize, Serialize};
use tau_core::{Error, Result};

/// Reduction applied to the element-wise differences of a linear distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Norm {
    /// `mean((a - b)^2)`
    MeanSquared,
    /// `mean(|a - b|)`
    MeanAbsolute,
    /// `sqrt(sum((a - b)^2))`
    Euclidean,
}

impl Norm {
    fn reduce(self, diffs: impl Iterator<Item = f64>, n: usize) -> f64 {
        match self {
            Norm::MeanSquared => diffs.map(|d| d * d).sum::<f64>() / n as f64,
            Norm::MeanAbsolute => diffs.map(f64::abs).sum::<f64>() / n as f64,
            Norm::Euclidean => diffs.map(|d| d * d).sum::<f64>().sqrt(),
        }
    }
}

/// Scalar dissimilarity between two summary vectors.
///
/// Symmetric, non-negative and zero for identical inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Norm of the raw differences.
    Linear {
        /// Difference reduction.
        norm: Norm,
    },
    /// Mean squared difference of natural logs; every entry must be `> 0`.
    Logarithmic,
}

impl DistanceMetric {
    /// Whether both summaries must be strictly positive.
    pub fn requires_positive(&self) -> bool {
        matches!(self, DistanceMetric::Logarithmic)
    }

    /// Distance between `a` and `b`.
    pub fn compute(&self, a: &[f64], b: &[f64]) -> Result<f64> {
        if a.len() != b.len() {
            return Err(Error::ShapeMismatch { expected: a.len(), actual: b.len() });
        }
        if a.is_empty() {
            return Err(Error::Validation("distance of empty summaries".to_string()));
        }
        match *self {
            DistanceMetric::Linear { norm } => {
                Ok(norm.reduce(a.iter().zip(b).map(|(x, y)| x - y), a.len()))
            }
            DistanceMetric::Logarithmic => {
                if let Some(v) = a.iter().chain(b).find(|v| v.is_nan() || **v <= 0.0) {
                    return Err(Error::DomainError(format!(
                        "logarithmic distance needs strictly positive summaries, got {v}"
                    )));
                }
                Ok(Norm::MeanSquared.reduce(a.iter().zip(b).map(|(x, y)| x.ln() - y.ln()), a.len()))
            }
        }
    }
}
