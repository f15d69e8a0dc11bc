//! Per-parameter and joint priors.
//!
//! A [`JointPrior`] is an independent product of named one-dimensional priors.
//! Specs are plain serde data; samplers are built (and validated) once when the
//! joint prior is constructed, so sampling itself cannot fail.

use rand::Rng;
use rand_distr::{Distribution, Exp, Gamma, LogNormal, Normal, Uniform};
use serde::{Deserialize, Serialize};
use tau_core::{Error, Prior, Result};

/// One-dimensional prior family with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dist", rename_all = "snake_case")]
pub enum ParamPrior {
    /// Uniform on the closed interval `[low, high]`.
    Uniform {
        /// Lower bound.
        low: f64,
        /// Upper bound.
        high: f64,
    },
    /// Normal `N(mean, sd)`.
    Normal {
        /// Mean.
        mean: f64,
        /// Standard deviation.
        sd: f64,
    },
    /// Log-normal: `ln X ~ N(mu, sigma)`.
    LogNormal {
        /// Mean of `ln X`.
        mu: f64,
        /// Standard deviation of `ln X`.
        sigma: f64,
    },
    /// Gamma with shape and scale.
    Gamma {
        /// Shape `k > 0`.
        shape: f64,
        /// Scale `theta > 0`.
        scale: f64,
    },
    /// Exponential with rate.
    Exponential {
        /// Rate `lambda > 0`.
        rate: f64,
    },
}

impl ParamPrior {
    /// Log-density at `x`; `-inf` outside the support.
    ///
    /// Invalid family parameters also yield `-inf`; [`JointPrior::new`]
    /// rejects them up front.
    pub fn logpdf(&self, x: f64) -> f64 {
        let lp = match *self {
            ParamPrior::Uniform { low, high } => crate::uniform::logpdf(x, low, high),
            ParamPrior::Normal { mean, sd } => crate::normal::logpdf(x, mean, sd),
            ParamPrior::LogNormal { mu, sigma } => crate::lognormal::logpdf(x, mu, sigma),
            ParamPrior::Gamma { shape, scale } => crate::gamma::logpdf_shape_scale(x, shape, scale),
            ParamPrior::Exponential { rate } => crate::exponential::logpdf(x, rate),
        };
        match lp {
            Ok(v) if !v.is_nan() => v,
            _ => f64::NEG_INFINITY,
        }
    }

    /// Support `(lower, upper)` of the family.
    pub fn support(&self) -> (f64, f64) {
        match *self {
            ParamPrior::Uniform { low, high } => (low, high),
            ParamPrior::Normal { .. } => (f64::NEG_INFINITY, f64::INFINITY),
            ParamPrior::LogNormal { .. }
            | ParamPrior::Gamma { .. }
            | ParamPrior::Exponential { .. } => (0.0, f64::INFINITY),
        }
    }

    fn sampler(&self) -> Result<Sampler> {
        let invalid = |e: &dyn std::fmt::Display| Error::Validation(format!("{self:?}: {e}"));
        Ok(match *self {
            ParamPrior::Uniform { low, high } => {
                if !(low.is_finite() && high.is_finite()) || high <= low {
                    return Err(Error::Validation(format!(
                        "uniform prior requires finite low < high, got [{low}, {high}]"
                    )));
                }
                Sampler::Uniform(Uniform::new_inclusive(low, high).map_err(|e| invalid(&e))?)
            }
            ParamPrior::Normal { mean, sd } => {
                if !(mean.is_finite() && sd.is_finite()) || sd <= 0.0 {
                    return Err(invalid(&"mean must be finite and sd > 0"));
                }
                Sampler::Normal(Normal::new(mean, sd).map_err(|e| invalid(&e))?)
            }
            ParamPrior::LogNormal { mu, sigma } => {
                if !(mu.is_finite() && sigma.is_finite()) || sigma <= 0.0 {
                    return Err(invalid(&"mu must be finite and sigma > 0"));
                }
                Sampler::LogNormal(LogNormal::new(mu, sigma).map_err(|e| invalid(&e))?)
            }
            ParamPrior::Gamma { shape, scale } => {
                if !(shape.is_finite() && scale.is_finite()) || shape <= 0.0 || scale <= 0.0 {
                    return Err(invalid(&"shape and scale must be finite and > 0"));
                }
                Sampler::Gamma(Gamma::new(shape, scale).map_err(|e| invalid(&e))?)
            }
            ParamPrior::Exponential { rate } => {
                if !rate.is_finite() || rate <= 0.0 {
                    return Err(invalid(&"rate must be finite and > 0"));
                }
                Sampler::Exponential(Exp::new(rate).map_err(|e| invalid(&e))?)
            }
        })
    }
}

/// Named one-dimensional prior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorSpec {
    /// Parameter name (e.g. `"tau"`).
    pub name: String,
    /// Prior family.
    #[serde(flatten)]
    pub prior: ParamPrior,
}

impl PriorSpec {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, prior: ParamPrior) -> Self {
        Self { name: name.into(), prior }
    }
}

#[derive(Debug, Clone)]
enum Sampler {
    Uniform(Uniform<f64>),
    Normal(Normal<f64>),
    LogNormal(LogNormal<f64>),
    Gamma(Gamma<f64>),
    Exponential(Exp<f64>),
}

impl Sampler {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Sampler::Uniform(d) => d.sample(rng),
            Sampler::Normal(d) => d.sample(rng),
            Sampler::LogNormal(d) => d.sample(rng),
            Sampler::Gamma(d) => d.sample(rng),
            Sampler::Exponential(d) => d.sample(rng),
        }
    }
}

/// Independent product of named one-dimensional priors.
#[derive(Debug, Clone)]
pub struct JointPrior {
    specs: Vec<PriorSpec>,
    samplers: Vec<Sampler>,
}

impl JointPrior {
    /// Build and validate a joint prior.
    pub fn new(specs: Vec<PriorSpec>) -> Result<Self> {
        if specs.is_empty() {
            return Err(Error::Validation("joint prior needs at least one parameter".to_string()));
        }
        for (i, s) in specs.iter().enumerate() {
            if specs[..i].iter().any(|o| o.name == s.name) {
                return Err(Error::Validation(format!("duplicate prior name '{}'", s.name)));
            }
        }
        let samplers = specs.iter().map(|s| s.prior.sampler()).collect::<Result<Vec<_>>>()?;
        Ok(Self { specs, samplers })
    }

    /// Per-parameter specs, in parameter-vector order.
    pub fn specs(&self) -> &[PriorSpec] {
        &self.specs
    }

    /// Parameter names, in parameter-vector order.
    pub fn names(&self) -> Vec<String> {
        self.specs.iter().map(|s| s.name.clone()).collect()
    }

    /// Per-parameter supports.
    pub fn supports(&self) -> Vec<(f64, f64)> {
        self.specs.iter().map(|s| s.prior.support()).collect()
    }
}

impl Prior for JointPrior {
    fn dim(&self) -> usize {
        self.specs.len()
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        self.samplers.iter().map(|s| s.sample(rng)).collect()
    }

    fn log_density(&self, theta: &[f64]) -> f64 {
        if theta.len() != self.specs.len() {
            return f64::NEG_INFINITY;
        }
        let mut lp = 0.0;
        for (spec, &x) in self.specs.iter().zip(theta.iter()) {
            lp += spec.prior.logpdf(x);
            if lp == f64::NEG_INFINITY {
                break;
            }
        }
        lp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    fn tau_prior() -> JointPrior {
        JointPrior::new(vec![
            PriorSpec::new("tau", ParamPrior::Uniform { low: 0.0, high: 60.0 }),
            PriorSpec::new("coeff", ParamPrior::Uniform { low: 0.0, high: 1.0 }),
        ])
        .unwrap()
    }

    #[test]
    fn test_samples_stay_in_support() {
        let prior = tau_prior();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let theta = prior.sample(&mut rng);
            assert_eq!(theta.len(), 2);
            assert!(prior.in_support(&theta), "sample outside support: {:?}", theta);
        }
    }

    #[test]
    fn test_joint_log_density_is_sum() {
        let prior = tau_prior();
        let lp = prior.log_density(&[10.0, 0.3]);
        assert_relative_eq!(lp, -(60f64.ln()), epsilon = 1e-12);
        assert_eq!(prior.log_density(&[-1.0, 0.3]), f64::NEG_INFINITY);
        assert_eq!(prior.log_density(&[10.0]), f64::NEG_INFINITY);
    }

    #[test]
    fn test_sampling_is_seed_deterministic() {
        let prior = JointPrior::new(vec![
            PriorSpec::new("tau", ParamPrior::Gamma { shape: 2.0, scale: 10.0 }),
            PriorSpec::new("amp", ParamPrior::LogNormal { mu: 0.0, sigma: 0.5 }),
            PriorSpec::new("shift", ParamPrior::Normal { mean: 0.0, sd: 1.0 }),
            PriorSpec::new("rate", ParamPrior::Exponential { rate: 0.1 }),
        ])
        .unwrap();
        let mut r1 = rand::rngs::StdRng::seed_from_u64(9);
        let mut r2 = rand::rngs::StdRng::seed_from_u64(9);
        assert_eq!(prior.sample(&mut r1), prior.sample(&mut r2));
    }

    #[test]
    fn test_invalid_specs_rejected() {
        assert!(JointPrior::new(vec![]).is_err());
        assert!(
            JointPrior::new(vec![PriorSpec::new(
                "tau",
                ParamPrior::Uniform { low: 5.0, high: 1.0 }
            )])
            .is_err()
        );
        assert!(
            JointPrior::new(vec![PriorSpec::new("tau", ParamPrior::Exponential { rate: 0.0 })])
                .is_err()
        );
        assert!(
            JointPrior::new(vec![
                PriorSpec::new("tau", ParamPrior::Exponential { rate: 1.0 }),
                PriorSpec::new("tau", ParamPrior::Exponential { rate: 2.0 }),
            ])
            .is_err()
        );
    }

    #[test]
    fn test_spec_serde_shape() {
        let spec: PriorSpec =
            serde_json::from_str(r#"{"name":"tau","dist":"uniform","low":0.0,"high":60.0}"#)
                .unwrap();
        assert_eq!(spec.prior, ParamPrior::Uniform { low: 0.0, high: 60.0 });
        assert_eq!(spec.prior.support(), (0.0, 60.0));
    }
}
