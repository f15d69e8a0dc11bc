//! Sequential Monte Carlo ABC sampler (Toni et al. 2009, Beaumont et al. 2009).
//!
//! Round 1 draws candidates from the prior. Later rounds resample the previous
//! population by weight and perturb with a Gaussian kernel; the accepted
//! particles are then reweighted by `prior(theta) / sum_j w_j K(theta | theta_j)`.
//!
//! Each particle slot of a round is filled independently: a slot keeps
//! proposing until it accepts a candidate or exhausts `max_attempts`. Slots
//! run on a rayon pool, each with its own RNG seeded from
//! `(seed, round, slot)`, and are merged in slot order by the coordinating
//! thread, so results do not depend on the number of worker threads.

use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tau_core::stats::{effective_sample_size, normalize_weights, quantile_linear, weighted_mean, weighted_quantile};
use tau_core::{
    Error, GenerativeModel, Particle, Population, PosteriorResult, Prior, Result,
    RoundDiagnostics, RunStatus, StopReason,
};
use tau_prob::math::exp_clamped;

use super::cancel::CancelToken;
use super::config::{AbcConfig, InitialThreshold, ThresholdPolicy};
use super::kernel::PerturbationKernel;
use crate::distance::DistanceMetric;

/// Engine lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EngineState {
    /// Constructed and validated; no simulation has run.
    Initialized,
    /// Candidates for `round` are being simulated.
    RoundRunning {
        /// 1-based round.
        round: usize,
    },
    /// `round` filled its population.
    RoundAccepted {
        /// 1-based round.
        round: usize,
    },
    /// A stopping criterion fired.
    Converged,
    /// A round exhausted its attempt budget.
    Failed,
    /// The run was cancelled.
    Cancelled,
}

/// Per-slot work record, merged by the coordinator.
#[derive(Debug, Default)]
struct SlotOutcome {
    accepted: Option<(Vec<f64>, f64)>,
    n_simulations: usize,
    n_discarded: usize,
    cancelled: bool,
}

/// ABC-SMC engine bound to one model, distance and observed summary.
pub struct AbcEngine<'a, M: GenerativeModel> {
    model: &'a M,
    distance: DistanceMetric,
    config: AbcConfig,
    observed_summary: Vec<f64>,
    state: EngineState,
    cancel: CancelToken,
}

impl<'a, M: GenerativeModel> AbcEngine<'a, M> {
    /// Validate everything that can be checked before simulating.
    ///
    /// The observed summary is computed here once and cached. A distance that
    /// cannot score the observed summary against itself (e.g. a logarithmic
    /// distance on a summary with non-positive entries) is rejected here too,
    /// as is a logarithmic distance paired with a summary that can go negative.
    pub fn new(
        model: &'a M,
        distance: DistanceMetric,
        observed: &[f64],
        config: AbcConfig,
    ) -> Result<Self> {
        config.validate()?;
        if distance.requires_positive() && !model.nonnegative_summary() {
            return Err(Error::Validation(
                "logarithmic distance needs a non-negative summary statistic".to_string(),
            ));
        }
        let names = model.parameter_names();
        if names.len() != model.dim() {
            return Err(Error::ShapeMismatch { expected: model.dim(), actual: names.len() });
        }
        let observed_summary = model.summary(observed)?;
        distance.compute(&observed_summary, &observed_summary)?;
        Ok(Self {
            model,
            distance,
            config,
            observed_summary,
            state: EngineState::Initialized,
            cancel: CancelToken::new(),
        })
    }

    /// Share an externally owned cancellation flag.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Handle that cancels this engine's run.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Cached observed summary vector.
    pub fn observed_summary(&self) -> &[f64] {
        &self.observed_summary
    }

    /// Engine configuration.
    pub fn config(&self) -> &AbcConfig {
        &self.config
    }

    /// Run rounds until a stopping criterion fires, the run is cancelled or
    /// a round fails.
    ///
    /// A failed round yields [`Error::ConvergenceFailure`] carrying the partial
    /// population and every round's diagnostics. Cancellation is not an error:
    /// the result has status [`RunStatus::Cancelled`].
    pub fn run(&mut self) -> Result<PosteriorResult> {
        let pool = if self.config.n_threads > 0 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(self.config.n_threads)
                    .build()
                    .map_err(|e| Error::Computation(format!("failed to create thread pool: {e}")))?,
            )
        } else {
            None
        };

        let n = self.config.population_size;
        let max_rounds = self.config.stopping.max_rounds;
        let parameter_names = self.model.parameter_names();
        let mut rounds: Vec<RoundDiagnostics> = Vec::with_capacity(max_rounds);
        let mut previous: Option<Population> = None;
        let mut threshold = match &self.config.threshold {
            ThresholdPolicy::Adaptive { initial: InitialThreshold::Value(eps), .. } => Some(*eps),
            ThresholdPolicy::Adaptive { initial: InitialThreshold::Quantile, .. } => None,
            ThresholdPolicy::Fixed { schedule } => schedule.first().copied(),
        };

        log::info!(
            "ABC-SMC: N={}, max_rounds={}, summary_len={}, threads={}",
            n,
            max_rounds,
            self.observed_summary.len(),
            pool.as_ref().map_or_else(rayon::current_num_threads, |p| p.current_num_threads())
        );

        for round in 1..=max_rounds {
            self.state = EngineState::RoundRunning { round };
            let started = Instant::now();

            let kernel = previous
                .as_ref()
                .map(|p| PerturbationKernel::fit(p, self.config.kernel_scale))
                .transpose()?;

            log::debug!("round {round}: dispatching {n} slots, threshold {threshold:?}");
            let this = &*self;
            let outcomes = match &pool {
                Some(p) => p.install(|| this.run_batch(round, threshold, kernel.as_ref())),
                None => this.run_batch(round, threshold, kernel.as_ref()),
            }?;

            let cancelled = outcomes.iter().any(|o| o.cancelled);
            let n_simulations: usize = outcomes.iter().map(|o| o.n_simulations).sum();
            let n_discarded: usize = outcomes.iter().map(|o| o.n_discarded).sum();
            let accepted: Vec<(Vec<f64>, f64)> =
                outcomes.into_iter().filter_map(|o| o.accepted).collect();
            let shortfall = n - accepted.len();

            // Round 1 under the quantile policy accepts every prior draw.
            let round_threshold = threshold.unwrap_or_else(|| {
                accepted.iter().map(|(_, d)| *d).fold(f64::NEG_INFINITY, f64::max)
            });
            let weights = self.importance_weights(&accepted, kernel.as_ref())?;
            let particles: Vec<Particle> = accepted
                .into_iter()
                .zip(weights)
                .map(|((params, d), w)| Particle::new(params, d, w))
                .collect();
            let population = Population {
                round,
                threshold: round_threshold,
                particles,
                complete: shortfall == 0,
            };
            let diag = diagnostics(&population, n_simulations, n_discarded, started);
            log::info!(
                "round {}: eps={:.4e}, accepted {}/{} ({:.2}%), discarded {}, ess={:.1}, {:.2}s",
                round,
                round_threshold,
                diag.n_accepted,
                diag.n_simulations,
                100.0 * diag.acceptance_rate,
                diag.n_discarded,
                diag.ess,
                diag.wall_time_secs
            );
            let acceptance_rate = diag.acceptance_rate;
            rounds.push(diag);

            if cancelled {
                log::warn!("ABC-SMC cancelled in round {round} with {shortfall} slots unfilled");
                self.state = EngineState::Cancelled;
                // Nothing accepted yet: hand back the last complete population.
                let population = match previous {
                    Some(prev) if population.is_empty() => prev,
                    _ => population,
                };
                return Ok(PosteriorResult {
                    parameter_names,
                    population,
                    rounds,
                    status: RunStatus::Cancelled,
                    seed: self.config.seed,
                });
            }

            if shortfall > 0 {
                log::warn!(
                    "round {round} failed: {shortfall} of {n} slots exhausted {} attempts",
                    self.config.max_attempts
                );
                self.state = EngineState::Failed;
                let partial = PosteriorResult {
                    parameter_names,
                    population,
                    rounds,
                    status: RunStatus::Failed { round, shortfall },
                    seed: self.config.seed,
                };
                return Err(Error::ConvergenceFailure { round, shortfall, partial: Box::new(partial) });
            }

            self.state = EngineState::RoundAccepted { round };

            let next = self.next_threshold(round, round_threshold, &population);
            let stop = self.stop_reason(round, round_threshold, next, acceptance_rate);
            if let Some(reason) = stop {
                log::info!("ABC-SMC converged after {round} rounds ({reason:?})");
                self.state = EngineState::Converged;
                return Ok(PosteriorResult {
                    parameter_names,
                    population,
                    rounds,
                    status: RunStatus::Converged { reason },
                    seed: self.config.seed,
                });
            }
            threshold = next;
            previous = Some(population);
        }

        // `stop_reason` always fires at `max_rounds`.
        Err(Error::Computation("ABC-SMC loop ended without a stopping decision".to_string()))
    }

    fn run_batch(
        &self,
        round: usize,
        threshold: Option<f64>,
        kernel: Option<&PerturbationKernel>,
    ) -> Result<Vec<SlotOutcome>> {
        (0..self.config.population_size)
            .into_par_iter()
            .map(|slot| self.fill_slot(round, slot, threshold, kernel))
            .collect()
    }

    fn fill_slot(
        &self,
        round: usize,
        slot: usize,
        threshold: Option<f64>,
        kernel: Option<&PerturbationKernel>,
    ) -> Result<SlotOutcome> {
        let prior = self.model.prior();
        let mut rng = StdRng::seed_from_u64(slot_seed(self.config.seed, round, slot));
        let mut out = SlotOutcome::default();

        for _ in 0..self.config.max_attempts {
            if self.cancel.is_cancelled() {
                out.cancelled = true;
                break;
            }
            let theta = match kernel {
                None => prior.sample(&mut rng),
                Some(k) => k.propose(&mut rng),
            };
            if !prior.in_support(&theta) {
                continue;
            }

            out.n_simulations += 1;
            let d = match self.score(&theta, &mut rng) {
                Ok(d) if d.is_finite() => d,
                Ok(d) => {
                    log::trace!("slot {slot}: non-finite distance {d} for {theta:?}");
                    out.n_discarded += 1;
                    continue;
                }
                Err(e) if e.is_candidate_local() => {
                    log::trace!("slot {slot}: discarded {theta:?}: {e}");
                    out.n_discarded += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };
            if threshold.is_none_or(|eps| d <= eps) {
                out.accepted = Some((theta, d));
                break;
            }
        }
        Ok(out)
    }

    /// simulate -> summarize -> distance for one candidate.
    fn score(&self, theta: &[f64], rng: &mut StdRng) -> Result<f64> {
        let series =
            self.model.simulate(theta, self.model.series_length(), self.model.dt(), rng)?;
        let summary = self.model.summary(&series)?;
        self.distance.compute(&summary, &self.observed_summary)
    }

    fn importance_weights(
        &self,
        accepted: &[(Vec<f64>, f64)],
        kernel: Option<&PerturbationKernel>,
    ) -> Result<Vec<f64>> {
        if accepted.is_empty() {
            return Ok(Vec::new());
        }
        let Some(kernel) = kernel else {
            return Ok(vec![1.0 / accepted.len() as f64; accepted.len()]);
        };
        let prior = self.model.prior();
        let log_w: Vec<f64> = accepted
            .par_iter()
            .map(|(theta, _)| prior.log_density(theta) - kernel.log_mixture_density(theta))
            .collect();
        let max = log_w.iter().copied().filter(|v| v.is_finite()).fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            return Err(Error::Computation("all importance weights are degenerate".to_string()));
        }
        let raw: Vec<f64> =
            log_w.iter().map(|&lw| if lw.is_nan() { 0.0 } else { exp_clamped(lw - max) }).collect();
        normalize_weights(&raw)
    }

    fn next_threshold(&self, round: usize, current: f64, population: &Population) -> Option<f64> {
        match &self.config.threshold {
            ThresholdPolicy::Adaptive { quantile, .. } => {
                let q = quantile_linear(&population.distances(), *quantile);
                if q >= current {
                    log::warn!(
                        "round {round}: threshold did not decrease ({current:.4e} -> {q:.4e})"
                    );
                }
                Some(q.min(current))
            }
            ThresholdPolicy::Fixed { schedule } => schedule.get(round).copied(),
        }
    }

    fn stop_reason(
        &self,
        round: usize,
        current: f64,
        next: Option<f64>,
        acceptance_rate: f64,
    ) -> Option<StopReason> {
        let rule = &self.config.stopping;
        if rule.min_acceptance_rate.is_some_and(|min| acceptance_rate < min) {
            return Some(StopReason::AcceptanceRate);
        }
        if round >= rule.max_rounds {
            return Some(StopReason::MaxRounds);
        }
        let Some(next) = next else {
            return Some(StopReason::ScheduleExhausted);
        };
        if let Some(tol) = rule.min_threshold_change {
            let change = if current > 0.0 { (current - next) / current } else { 0.0 };
            if change < tol {
                return Some(StopReason::ThresholdConverged);
            }
        }
        None
    }
}

/// RNG seed of one particle slot.
fn slot_seed(seed: u64, round: usize, slot: usize) -> u64 {
    seed.wrapping_add(((round as u64) << 32) | slot as u64)
}

fn diagnostics(
    population: &Population,
    n_simulations: usize,
    n_discarded: usize,
    started: Instant,
) -> RoundDiagnostics {
    let weights = population.weights();
    let dim = population.particles.first().map_or(0, |p| p.params.len());
    let (param_means, credible_intervals) = (0..dim)
        .map(|i| {
            let col = population.param_column(i);
            (
                weighted_mean(&col, &weights),
                (weighted_quantile(&col, &weights, 0.025), weighted_quantile(&col, &weights, 0.975)),
            )
        })
        .unzip();
    RoundDiagnostics {
        round: population.round,
        threshold: population.threshold,
        n_simulations,
        n_accepted: population.len(),
        n_discarded,
        acceptance_rate: if n_simulations > 0 {
            population.len() as f64 / n_simulations as f64
        } else {
            0.0
        },
        ess: if weights.is_empty() { 0.0 } else { effective_sample_size(&weights) },
        wall_time_secs: started.elapsed().as_secs_f64(),
        param_means,
        credible_intervals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abc::config::StoppingRule;
    use crate::distance::Norm;
    use rand::Rng;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tau_prob::{JointPrior, ParamPrior, PriorSpec};

    /// `y_i = mu + noise`, summarized by its mean.
    struct Location {
        prior: JointPrior,
    }

    impl Location {
        fn new() -> Self {
            let prior = JointPrior::new(vec![PriorSpec::new(
                "mu",
                ParamPrior::Uniform { low: -10.0, high: 10.0 },
            )])
            .unwrap();
            Self { prior }
        }
    }

    impl GenerativeModel for Location {
        type Prior = JointPrior;

        fn prior(&self) -> &JointPrior {
            &self.prior
        }

        fn parameter_names(&self) -> Vec<String> {
            self.prior.names()
        }

        fn series_length(&self) -> usize {
            20
        }

        fn dt(&self) -> f64 {
            1.0
        }

        fn simulate<R: rand::Rng + ?Sized>(
            &self,
            theta: &[f64],
            length: usize,
            _dt: f64,
            rng: &mut R,
        ) -> Result<Vec<f64>> {
            if theta[0] > 9.0 {
                return Err(Error::InvalidParameter("mu > 9".to_string()));
            }
            Ok((0..length).map(|_| theta[0] + rng.random::<f64>() - 0.5).collect())
        }

        fn summary(&self, series: &[f64]) -> Result<Vec<f64>> {
            if series.len() != 20 {
                return Err(Error::ShapeMismatch { expected: 20, actual: series.len() });
            }
            Ok(vec![series.iter().sum::<f64>() / 20.0])
        }
    }

    fn config(rounds: usize) -> AbcConfig {
        AbcConfig {
            population_size: 200,
            threshold: ThresholdPolicy::Adaptive {
                initial: InitialThreshold::Quantile,
                quantile: 0.5,
            },
            stopping: StoppingRule {
                max_rounds: rounds,
                min_threshold_change: None,
                min_acceptance_rate: None,
            },
            kernel_scale: 2.0,
            max_attempts: 1000,
            seed: 42,
            n_threads: 2,
        }
    }

    fn linear() -> DistanceMetric {
        DistanceMetric::Linear { norm: Norm::MeanSquared }
    }

    #[test]
    fn test_location_posterior_concentrates() {
        let model = Location::new();
        let observed = vec![3.0; 20];
        let mut engine = AbcEngine::new(&model, linear(), &observed, config(6)).unwrap();
        assert_eq!(engine.state(), EngineState::Initialized);
        let result = engine.run().unwrap();
        assert_eq!(engine.state(), EngineState::Converged);
        assert_eq!(result.status, RunStatus::Converged { reason: StopReason::MaxRounds });
        assert_eq!(result.rounds.len(), 6);
        assert_eq!(result.n_particles(), 200);
        assert!((result.mean(0) - 3.0).abs() < 0.5, "mean={}", result.mean(0));
        let w: f64 = result.weights().iter().sum();
        assert!((w - 1.0).abs() < 1e-9);
        for p in &result.population.particles {
            assert!(p.distance <= result.population.threshold);
        }
        let eps = result.thresholds();
        assert!(eps.windows(2).all(|w| w[1] <= w[0]), "{:?}", eps);
    }

    #[test]
    fn test_deterministic_across_thread_counts() {
        let model = Location::new();
        let observed = vec![-2.0; 20];
        let run = |threads| {
            let cfg = AbcConfig { n_threads: threads, ..config(3) };
            AbcEngine::new(&model, linear(), &observed, cfg).unwrap().run().unwrap()
        };
        let a = run(1);
        let b = run(4);
        assert_eq!(a.population.particles, b.population.particles);
        assert_eq!(a.thresholds(), b.thresholds());
    }

    #[test]
    fn test_candidate_local_errors_are_discarded() {
        let model = Location::new();
        let observed = vec![8.5; 20];
        let cfg = AbcConfig { population_size: 100, ..config(2) };
        let result = AbcEngine::new(&model, linear(), &observed, cfg).unwrap().run().unwrap();
        assert!(result.rounds.iter().map(|r| r.n_discarded).sum::<usize>() > 0);
        assert_eq!(result.n_particles(), 100);
    }

    #[test]
    fn test_fixed_schedule_exhausted() {
        let model = Location::new();
        let observed = vec![0.0; 20];
        let cfg = AbcConfig {
            threshold: ThresholdPolicy::Fixed { schedule: vec![20.0, 5.0] },
            ..config(10)
        };
        let result = AbcEngine::new(&model, linear(), &observed, cfg).unwrap().run().unwrap();
        assert_eq!(result.status, RunStatus::Converged { reason: StopReason::ScheduleExhausted });
        assert_eq!(result.thresholds(), vec![20.0, 5.0]);
    }

    #[test]
    fn test_failure_carries_partial_population() {
        let model = Location::new();
        let observed = vec![0.0; 20];
        let cfg = AbcConfig {
            threshold: ThresholdPolicy::Adaptive {
                initial: InitialThreshold::Value(1e-12),
                quantile: 0.5,
            },
            max_attempts: 1,
            ..config(3)
        };
        let mut engine = AbcEngine::new(&model, linear(), &observed, cfg).unwrap();
        match engine.run() {
            Err(Error::ConvergenceFailure { round, shortfall, partial }) => {
                assert_eq!(round, 1);
                assert_eq!(shortfall, 200 - partial.n_particles());
                assert!(!partial.is_complete());
                assert_eq!(partial.status, RunStatus::Failed { round: 1, shortfall });
                assert_eq!(partial.rounds.len(), 1);
            }
            other => panic!("expected convergence failure, got {:?}", other.map(|r| r.status)),
        }
        assert_eq!(engine.state(), EngineState::Failed);
    }

    /// Summary ignores the data, so every distance is zero.
    struct Flat(Location);

    impl GenerativeModel for Flat {
        type Prior = JointPrior;

        fn prior(&self) -> &JointPrior {
            self.0.prior()
        }

        fn parameter_names(&self) -> Vec<String> {
            self.0.parameter_names()
        }

        fn series_length(&self) -> usize {
            20
        }

        fn dt(&self) -> f64 {
            1.0
        }

        fn simulate<R: rand::Rng + ?Sized>(
            &self,
            theta: &[f64],
            length: usize,
            dt: f64,
            rng: &mut R,
        ) -> Result<Vec<f64>> {
            self.0.simulate(theta, length, dt, rng)
        }

        fn summary(&self, _series: &[f64]) -> Result<Vec<f64>> {
            Ok(vec![0.0])
        }
    }

    #[test]
    fn test_degenerate_threshold_stops_at_max_rounds() {
        let model = Flat(Location::new());
        let mut engine = AbcEngine::new(&model, linear(), &[0.0; 20], config(4)).unwrap();
        let result = engine.run().unwrap();
        assert_eq!(result.status, RunStatus::Converged { reason: StopReason::MaxRounds });
        assert_eq!(result.thresholds(), vec![0.0; 4]);
        assert_eq!(result.n_particles(), 200);
    }

    /// Cancels its own run once `limit` simulations have been requested.
    struct CancelAfter {
        inner: Location,
        calls: AtomicUsize,
        limit: usize,
        token: CancelToken,
    }

    impl GenerativeModel for CancelAfter {
        type Prior = JointPrior;

        fn prior(&self) -> &JointPrior {
            self.inner.prior()
        }

        fn parameter_names(&self) -> Vec<String> {
            self.inner.parameter_names()
        }

        fn series_length(&self) -> usize {
            20
        }

        fn dt(&self) -> f64 {
            1.0
        }

        fn simulate<R: rand::Rng + ?Sized>(
            &self,
            theta: &[f64],
            length: usize,
            dt: f64,
            rng: &mut R,
        ) -> Result<Vec<f64>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) + 1 == self.limit {
                self.token.cancel();
            }
            self.inner.simulate(theta, length, dt, rng)
        }

        fn summary(&self, series: &[f64]) -> Result<Vec<f64>> {
            self.inner.summary(series)
        }
    }

    #[test]
    fn test_cancel_mid_round_keeps_accepted_particles() {
        let model = CancelAfter {
            inner: Location::new(),
            calls: AtomicUsize::new(0),
            limit: 300,
            token: CancelToken::new(),
        };
        let cfg = AbcConfig { n_threads: 1, ..config(5) };
        let mut engine = AbcEngine::new(&model, linear(), &[3.0; 20], cfg)
            .unwrap()
            .with_cancel_token(model.token.clone());
        let result = engine.run().unwrap();

        assert_eq!(engine.state(), EngineState::Cancelled);
        assert_eq!(result.status, RunStatus::Cancelled);
        assert_eq!(result.rounds.len(), 2);
        assert_eq!(result.population.round, 2);
        assert!(!result.is_complete());
        let n = result.n_particles();
        assert!(n > 0 && n < 200, "n={}", n);
        let w: f64 = result.weights().iter().sum();
        assert!((w - 1.0).abs() < 1e-9, "wsum={}", w);
        for p in &result.population.particles {
            assert!(p.distance <= result.population.threshold);
        }
    }

    #[test]
    fn test_cancel_before_run() {
        let model = Location::new();
        let observed = vec![0.0; 20];
        let mut engine = AbcEngine::new(&model, linear(), &observed, config(3)).unwrap();
        engine.cancel_token().cancel();
        let result = engine.run().unwrap();
        assert_eq!(result.status, RunStatus::Cancelled);
        assert!(!result.is_complete());
        assert_eq!(engine.state(), EngineState::Cancelled);
    }

    #[test]
    fn test_eager_validation() {
        let model = Location::new();
        let bad = AbcConfig { population_size: 0, ..config(3) };
        assert!(matches!(
            AbcEngine::new(&model, linear(), &[0.0; 20], bad),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            AbcEngine::new(&model, linear(), &[0.0; 5], config(3)),
            Err(Error::ShapeMismatch { .. })
        ));
        // The mean can be negative, so a log distance is refused up front.
        assert!(matches!(
            AbcEngine::new(&model, DistanceMetric::Logarithmic, &[1.0; 20], config(3)),
            Err(Error::Validation(_))
        ));
    }
}
