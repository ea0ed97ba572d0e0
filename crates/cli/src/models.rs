//! `odflow rank` and `odflow predict`.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use ndarray::Array2;
use odflow_models::{
    intervening_opportunities, max_abs_diff, predict, row_normalize, verify_paths, ComputeMode,
    DecayLaw, ModelSpec, DEFAULT_TOLERANCE,
};

use crate::exit_codes::EXIT_PATH_DISAGREEMENT;
use crate::table::{read_matrix, read_vector, write_matrix};
use crate::CliError;

#[derive(Args)]
pub struct RankArgs {
    /// Feature (mass) vector, one value per line
    #[arg(long)]
    pub features: PathBuf,

    /// Square cost matrix, headerless CSV
    #[arg(long)]
    pub cost: PathBuf,

    /// Output file (omit for stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Use the element-by-element reference path
    #[arg(long)]
    pub reference: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModelKind {
    Radiation,
    ExtendedRadiation,
    Gravity,
}

#[derive(Args)]
pub struct PredictArgs {
    #[arg(long, value_enum)]
    pub model: ModelKind,

    /// Model exponent (required for extended-radiation and gravity)
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Gravity decay law
    #[arg(long, default_value = "power")]
    pub decay: DecayLaw,

    /// Origin masses, one value per line
    #[arg(long)]
    pub origins: PathBuf,

    /// Destination masses (defaults to the origin masses)
    #[arg(long)]
    pub destinations: Option<PathBuf>,

    /// Distance matrix, or opportunity matrix with --cost-is-opportunity
    #[arg(long)]
    pub cost: PathBuf,

    /// Treat --cost as precomputed intervening opportunities
    #[arg(long)]
    pub cost_is_opportunity: bool,

    /// Use the element-by-element reference path
    #[arg(long)]
    pub reference: bool,

    /// Also run the other path and fail if they disagree
    #[arg(long)]
    pub verify: bool,

    /// Divide each row by its sum
    #[arg(long)]
    pub normalize: bool,

    /// Output file (omit for stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

fn mode(reference: bool) -> ComputeMode {
    if reference {
        ComputeMode::Reference
    } else {
        ComputeMode::Vectorized
    }
}

pub fn cmd_rank(args: RankArgs) -> Result<(), CliError> {
    let features = read_vector(&args.features)?;
    let cost = read_matrix(&args.cost)?;
    let s = intervening_opportunities(features.view(), cost.view(), mode(args.reference))?;
    write_matrix(&s, args.output.as_ref())
}

/// Rank opportunities on both paths and report the largest difference.
fn verify_ranking(features: &Array2<f64>, cost: &Array2<f64>) -> Result<f64, CliError> {
    let fast = intervening_opportunities(features.view(), cost.view(), ComputeMode::Vectorized)?;
    let slow = intervening_opportunities(features.view(), cost.view(), ComputeMode::Reference)?;
    let diff = max_abs_diff(&fast.view(), &slow.view());
    eprintln!(
        "verify: intervening opportunities max |vectorized - reference| = {diff:e} (tolerance {DEFAULT_TOLERANCE:e})"
    );
    Ok(diff)
}

/// Resolve the model kind and its parameters into a [`ModelSpec`].
pub fn model_spec(kind: ModelKind, alpha: Option<f64>, decay: DecayLaw) -> Result<ModelSpec, CliError> {
    let require_alpha = |name: &str| {
        alpha.ok_or_else(|| {
            CliError::usage(format!("--alpha is required for {name}"))
                .with_hint("e.g. --alpha 1.0")
        })
    };
    Ok(match kind {
        ModelKind::Radiation => ModelSpec::Radiation,
        ModelKind::ExtendedRadiation => ModelSpec::ExtendedRadiation {
            alpha: require_alpha("extended-radiation")?,
        },
        ModelKind::Gravity => ModelSpec::Gravity { alpha: require_alpha("gravity")?, decay },
    })
}

pub fn cmd_predict(args: PredictArgs) -> Result<(), CliError> {
    let spec = model_spec(args.model, args.alpha, args.decay)?;
    let mode = mode(args.reference);

    let origins = read_vector(&args.origins)?;
    let destinations = match &args.destinations {
        Some(path) => read_vector(path)?,
        None => origins.clone(),
    };
    let raw_cost = read_matrix(&args.cost)?;
    let ranked = spec.uses_opportunities() && !args.cost_is_opportunity;

    let ranking_diff = if args.verify && ranked {
        Some(verify_ranking(&origins, &raw_cost)?)
    } else {
        None
    };
    let cost = if ranked {
        intervening_opportunities(origins.view(), raw_cost.view(), mode)?
    } else {
        raw_cost
    };

    if args.verify {
        let check = verify_paths(&spec, origins.view(), destinations.view(), cost.view())?;
        eprintln!(
            "verify: {} max |vectorized - reference| = {:e} (tolerance {:e})",
            check.model, check.max_abs_diff, check.tolerance
        );
        if let Some(diff) = ranking_diff.filter(|d| *d > DEFAULT_TOLERANCE) {
            return Err(CliError::new(
                EXIT_PATH_DISAGREEMENT,
                format!("intervening opportunities: computation paths disagree (max diff {diff:e})"),
            ));
        }
        if !check.within_tolerance {
            return Err(CliError::new(
                EXIT_PATH_DISAGREEMENT,
                format!("{}: computation paths disagree", check.model),
            ));
        }
    }

    let mut p = predict(&spec, origins.view(), destinations.view(), cost.view(), mode)?;
    if args.normalize {
        p = row_normalize(p.view());
    }
    write_matrix(&p, args.output.as_ref())
}
