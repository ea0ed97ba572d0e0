use std::fmt;

use ndarray::{Array2, ArrayView2, Zip};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::gravity::{gravity, DecayLaw};
use crate::radiation::{extended_radiation, radiation};

/// Largest element-wise difference allowed between the two paths.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Computation mode
// ---------------------------------------------------------------------------

/// Which of the two equivalent computation paths to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputeMode {
    /// Whole-matrix ndarray broadcasting.
    #[default]
    Vectorized,
    /// One cell at a time in a nested loop. Slow; used as the oracle.
    Reference,
}

impl fmt::Display for ComputeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vectorized => write!(f, "vectorized"),
            Self::Reference => write!(f, "reference"),
        }
    }
}

// ---------------------------------------------------------------------------
// Model selection
// ---------------------------------------------------------------------------

/// A fully parameterized interaction model.
///
/// Deserializes from e.g. `{ model = "gravity", alpha = 2.0, decay = "power" }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ModelSpec {
    Radiation,
    ExtendedRadiation { alpha: f64 },
    Gravity { alpha: f64, decay: DecayLaw },
}

impl ModelSpec {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Radiation => "radiation",
            Self::ExtendedRadiation { .. } => "extended_radiation",
            Self::Gravity { .. } => "gravity",
        }
    }

    /// Radiation-family models read an intervening-opportunity matrix;
    /// gravity reads distances directly.
    pub fn uses_opportunities(&self) -> bool {
        !matches!(self, Self::Gravity { .. })
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Radiation => write!(f, "radiation"),
            Self::ExtendedRadiation { alpha } => write!(f, "extended_radiation(alpha={alpha})"),
            Self::Gravity { alpha, decay } => write!(f, "gravity({decay}, alpha={alpha})"),
        }
    }
}

/// Run `spec` over the given inputs.
///
/// `cost` is the opportunity matrix for the radiation family and the
/// distance matrix for gravity.
pub fn predict(
    spec: &ModelSpec,
    origins: ArrayView2<'_, f64>,
    destinations: ArrayView2<'_, f64>,
    cost: ArrayView2<'_, f64>,
    mode: ComputeMode,
) -> Result<Array2<f64>, ModelError> {
    log::debug!(
        "predicting {spec} for {}x{} ({mode})",
        origins.nrows(),
        destinations.nrows()
    );
    match *spec {
        ModelSpec::Radiation => radiation(origins, destinations, cost, mode),
        ModelSpec::ExtendedRadiation { alpha } => {
            extended_radiation(origins, destinations, cost, alpha, mode)
        }
        ModelSpec::Gravity { alpha, decay } => {
            gravity(origins, destinations, cost, alpha, decay, mode)
        }
    }
}

// ---------------------------------------------------------------------------
// Path verification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct PathCheck {
    pub model: String,
    pub max_abs_diff: f64,
    pub tolerance: f64,
    pub within_tolerance: bool,
}

/// Run both computation paths for `spec` and compare them.
pub fn verify_paths(
    spec: &ModelSpec,
    origins: ArrayView2<'_, f64>,
    destinations: ArrayView2<'_, f64>,
    cost: ArrayView2<'_, f64>,
) -> Result<PathCheck, ModelError> {
    let fast = predict(spec, origins, destinations, cost, ComputeMode::Vectorized)?;
    let slow = predict(spec, origins, destinations, cost, ComputeMode::Reference)?;
    let diff = max_abs_diff(&fast.view(), &slow.view());

    let check = PathCheck {
        model: spec.to_string(),
        max_abs_diff: diff,
        tolerance: DEFAULT_TOLERANCE,
        within_tolerance: diff <= DEFAULT_TOLERANCE,
    };
    if check.within_tolerance {
        log::info!("{}: paths agree (max diff {diff:e})", check.model);
    } else {
        log::warn!("{}: paths disagree (max diff {diff:e})", check.model);
    }
    Ok(check)
}

/// Largest `|a - b|` over all cells. Infinite when the shapes differ.
pub fn max_abs_diff(a: &ArrayView2<'_, f64>, b: &ArrayView2<'_, f64>) -> f64 {
    if a.dim() != b.dim() {
        return f64::INFINITY;
    }
    let mut max = 0.0_f64;
    Zip::from(a).and(b).for_each(|&x, &y| {
        max = max.max((x - y).abs());
    });
    max
}
