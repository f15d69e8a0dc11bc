//! Approximate Bayesian Computation via sequential Monte Carlo.

pub mod cancel;
pub mod config;
pub mod engine;
pub mod kernel;

pub use cancel::CancelToken;
pub use config::{AbcConfig, InitialThreshold, StoppingRule, ThresholdPolicy};
pub use engine::{AbcEngine, EngineState};
pub use kernel::PerturbationKernel;
