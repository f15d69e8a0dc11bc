//! Error types for tau

use thiserror::Error;

use crate::types::PosteriorResult;

/// tau error type
#[derive(Error, Debug)]
pub enum Error {
    /// A parameter violates a model-specific domain constraint.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Two vectors that must share a shape do not.
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Input the operation cannot handle (e.g. missing entries for an ACF).
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    /// Value outside the mathematical domain of an operation.
    #[error("Domain error: {0}")]
    DomainError(String),

    /// A round ran out of simulation attempts before filling its population.
    ///
    /// The partial population and all round diagnostics so far are attached.
    #[error("Convergence failure in round {round}: {shortfall} particles short")]
    ConvergenceFailure {
        /// 1-based round index that failed.
        round: usize,
        /// Number of particles missing from the population.
        shortfall: usize,
        /// Everything accepted before the failure.
        partial: Box<PosteriorResult>,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),
}

impl Error {
    /// Whether this error only invalidates a single candidate simulation.
    ///
    /// Such errors cause the candidate to be discarded and retried; they never
    /// abort a round.
    pub fn is_candidate_local(&self) -> bool {
        matches!(self, Error::InvalidParameter(_) | Error::ShapeMismatch { .. })
    }

    /// Partial posterior attached to a convergence failure, if any.
    pub fn partial_result(&self) -> Option<&PosteriorResult> {
        match self {
            Error::ConvergenceFailure { partial, .. } => Some(partial),
            _ => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_local_classification() {
        assert!(Error::InvalidParameter("tau <= 0".into()).is_candidate_local());
        assert!(Error::ShapeMismatch { expected: 3, actual: 2 }.is_candidate_local());
        assert!(!Error::DomainError("log(0)".into()).is_candidate_local());
        assert!(!Error::Validation("n = 0".into()).is_candidate_local());
    }

    #[test]
    fn test_display_shape_mismatch() {
        let e = Error::ShapeMismatch { expected: 31, actual: 30 };
        assert_eq!(e.to_string(), "Shape mismatch: expected 31, got 30");
    }
}
