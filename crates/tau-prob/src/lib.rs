//! Probability building blocks for tau.
//!
//! This crate hosts the probability math the ABC engine consumes:
//! - scalar log-densities for the supported prior families
//! - per-parameter and joint priors ([`prior::JointPrior`])
//! - the multivariate normal perturbation kernel ([`mvn::MvNormal`])
//! - weighted Gaussian kernel density estimation for MAP estimates
//! - small numeric helpers (stable log-sum-exp)

pub mod exponential;
pub mod gamma;
pub mod kde;
pub mod lognormal;
pub mod math;
pub mod mvn;
pub mod normal;
pub mod prior;
pub mod uniform;

pub use mvn::MvNormal;
pub use prior::{JointPrior, ParamPrior, PriorSpec};
