//! # tau-core
//!
//! Shared foundation for the tau workspace.
//!
//! This crate provides:
//! - the error taxonomy used across inference ([`Error`])
//! - the capability traits the ABC engine is written against
//!   ([`Prior`], [`GenerativeModel`])
//! - plain result types handed back to callers ([`Particle`],
//!   [`Population`], [`PosteriorResult`])
//! - weighted sample statistics shared by the result types and the engine
//!
//! ## Architecture
//!
//! The engine in `tau-inference` depends only on the traits defined here, not
//! on concrete model variants. Models and priors live in the crates that know
//! how to build them.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Error types.
pub mod error;
/// Weighted sample statistics (mean, variance, quantiles, covariance).
pub mod stats;
/// Capability traits: priors and generative models.
pub mod traits;
/// Result types: particles, populations, posterior results.
pub mod types;

pub use error::{Error, Result};
pub use traits::{GenerativeModel, Prior};
pub use types::{
    Particle, Population, PosteriorResult, RoundDiagnostics, RunStatus, StopReason,
};
