//! tau CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tau_core::Error as TauError;
use tau_inference::run::ObservedSpec;
use tau_inference::{ProcessVariant, RunSpec, compare_models};

#[derive(Parser)]
#[command(name = "tau")]
#[command(about = "tau - Approximate Bayesian Computation for timescales of stochastic time series")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit a timescale model with ABC-SMC
    Fit {
        /// Run specification (JSON: observed, model, priors, distance, abc)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for results (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override `abc.n_threads` (0 = auto).
        #[arg(long)]
        threads: Option<usize>,

        /// Override `abc.seed`.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Simulate a series from a process variant
    Simulate {
        /// Process variant
        #[arg(long, value_enum)]
        variant: VariantArg,

        /// Parameter vector, comma separated (e.g. `20` or `5,80,0.4`)
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        params: Vec<f64>,

        /// Number of samples (>0)
        #[arg(long)]
        length: usize,

        /// Sampling interval (>0)
        #[arg(long, default_value = "1.0")]
        dt: f64,

        /// Output mean
        #[arg(long, default_value = "0.0")]
        mean: f64,

        /// Output standard deviation
        #[arg(long, default_value = "1.0")]
        std: f64,

        /// Fraction of samples to mark missing (null)
        #[arg(long, default_value = "0.0")]
        missing_fraction: f64,

        /// RNG seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output file for results (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare two fitted models via their posterior-predictive distances
    Compare {
        /// `tau fit` output (with predictive distances) or a JSON array of distances
        #[arg(short, long)]
        input: PathBuf,

        /// Second model, same format as `--input`
        #[arg(long)]
        input_b: PathBuf,

        /// Number of distance levels
        #[arg(long, default_value = "100")]
        grid: usize,

        /// Output file for results (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VariantArg {
    OneTimescale,
    OneTimescaleOscillation,
    TwoTimescales,
}

impl From<VariantArg> for ProcessVariant {
    fn from(v: VariantArg) -> Self {
        match v {
            VariantArg::OneTimescale => ProcessVariant::OneTimescale,
            VariantArg::OneTimescaleOscillation => ProcessVariant::OneTimescaleOscillation,
            VariantArg::TwoTimescales => ProcessVariant::TwoTimescales,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level)?;

    match cli.command {
        Commands::Fit { input, output, threads, seed } => {
            cmd_fit(&input, output.as_ref(), threads, seed)
        }
        Commands::Simulate {
            variant,
            params,
            length,
            dt,
            mean,
            std,
            missing_fraction,
            seed,
            output,
        } => cmd_simulate(
            variant.into(),
            &params,
            length,
            dt,
            (mean, std),
            missing_fraction,
            seed,
            output.as_ref(),
        ),
        Commands::Compare { input, input_b, grid, output } => {
            cmd_compare(&input, &input_b, grid, output.as_ref())
        }
    }
}

/// Library crates log through `log`; bridge those records into tracing.
fn init_logging(level: tracing::Level) -> Result<()> {
    tracing_log::LogTracer::init()?;
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn cmd_fit(
    input: &PathBuf,
    output: Option<&PathBuf>,
    threads: Option<usize>,
    seed: Option<u64>,
) -> Result<()> {
    tracing::info!(path = %input.display(), "loading run spec");
    let bytes = std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let mut spec: RunSpec = serde_json::from_slice(&bytes)?;
    if let Some(t) = threads {
        spec.abc.n_threads = t;
    }
    if let Some(s) = seed {
        spec.abc.seed = s;
    }

    match tau_inference::run_inference(&spec) {
        Ok(out) => {
            tracing::info!(
                rounds = out.posterior.rounds.len(),
                simulations = out.posterior.total_simulations(),
                "fit complete"
            );
            write_json(output, serde_json::to_value(&out)?)
        }
        Err(TauError::ConvergenceFailure { round, shortfall, partial }) => {
            // Keep the partial population for inspection, then fail.
            let failure = serde_json::json!({
                "error": "convergence_failure",
                "round": round,
                "shortfall": shortfall,
                "partial": partial,
            });
            write_json(output, failure)?;
            anyhow::bail!("Convergence failure in round {round}: {shortfall} particles short")
        }
        Err(e) => Err(e.into()),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_simulate(
    variant: ProcessVariant,
    params: &[f64],
    length: usize,
    dt: f64,
    (mean, std): (f64, f64),
    missing_fraction: f64,
    seed: u64,
    output: Option<&PathBuf>,
) -> Result<()> {
    if !(0.0..1.0).contains(&missing_fraction) {
        anyhow::bail!("--missing-fraction must lie in [0, 1), got {missing_fraction}");
    }
    if params.len() != variant.n_params() {
        anyhow::bail!(
            "{:?} takes {} parameters ({}), got {}",
            variant,
            variant.n_params(),
            variant.parameter_names().join(", "),
            params.len()
        );
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut series = variant.simulate(params, length, dt, &mut rng)?;
    for x in series.iter_mut() {
        *x = mean + std * *x;
        if missing_fraction > 0.0 && rand::Rng::random::<f64>(&mut rng) < missing_fraction {
            *x = f64::NAN;
        }
    }
    tracing::info!(?variant, length, "simulated series");

    let observed = ObservedSpec::from_series(&series, dt);
    let output_json = serde_json::json!({
        "variant": variant,
        "parameter_names": variant.parameter_names(),
        "params": params,
        "seed": seed,
        "values": observed.values,
        "dt": observed.dt,
    });
    write_json(output, output_json)
}

fn cmd_compare(input: &PathBuf, input_b: &PathBuf, grid: usize, output: Option<&PathBuf>) -> Result<()> {
    let a = load_distances(input)?;
    let b = load_distances(input_b)?;
    tracing::info!(n_a = a.len(), n_b = b.len(), "comparing models");
    let cmp = compare_models(&a, &b, grid)?;
    write_json(output, serde_json::to_value(&cmp)?)
}

/// Accept either a bare array of distances or a `tau fit` output.
fn load_distances(path: &PathBuf) -> Result<Vec<f64>> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_slice(&bytes)?;
    let array = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut map) => match map.remove("predictive_distances") {
            Some(v @ serde_json::Value::Array(_)) => v,
            _ => anyhow::bail!(
                "{}: no predictive_distances (set predictive_draws in the run spec)",
                path.display()
            ),
        },
        _ => anyhow::bail!("{}: expected a JSON array or object", path.display()),
    };
    Ok(serde_json::from_value(array)?)
}

fn write_json(output: Option<&PathBuf>, value: serde_json::Value) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&value)?)?;
    } else {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}
