use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::model::ComputeMode;
use crate::shape::{check_model_inputs, finish};

/// How interaction strength falls off with distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayLaw {
    /// `d^alpha`
    Power,
    /// `e^(d * alpha)`
    Exponential,
}

impl DecayLaw {
    /// The decay denominator for one distance.
    pub fn apply(self, distance: f64, alpha: f64) -> f64 {
        match self {
            Self::Power => distance.powf(alpha),
            Self::Exponential => (distance * alpha).exp(),
        }
    }
}

impl fmt::Display for DecayLaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Power => write!(f, "power"),
            Self::Exponential => write!(f, "exponential"),
        }
    }
}

impl FromStr for DecayLaw {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "power" => Ok(Self::Power),
            "exponential" => Ok(Self::Exponential),
            other => Err(ModelError::UnknownDecay(other.to_string())),
        }
    }
}

/// Gravity model: `P[i,j] = O_i D_j / decay(d_ij, alpha)`.
///
/// Self-pairs (`i == j`) are always `0`. Any other cell whose decay
/// denominator is zero is also `0`.
pub fn gravity(
    origins: ArrayView2<'_, f64>,
    destinations: ArrayView2<'_, f64>,
    distance: ArrayView2<'_, f64>,
    alpha: f64,
    decay: DecayLaw,
    mode: ComputeMode,
) -> Result<Array2<f64>, ModelError> {
    let (n, m) = check_model_inputs(&origins, &destinations, &distance)?;
    if !alpha.is_finite() {
        return Err(ModelError::InvalidParameter {
            name: "alpha",
            value: alpha,
            reason: "gravity requires a finite alpha",
        });
    }

    let p = match mode {
        ComputeMode::Vectorized => {
            let numerator = &origins * &destinations.t();
            let mut denominator = distance.mapv(|d| decay.apply(d, alpha));

            // Divide by 1 where the denominator is 0, then zero those cells.
            let mask = denominator.mapv(|v| v == 0.0);
            denominator.zip_mut_with(&mask, |v, &zero| {
                if zero {
                    *v = 1.0;
                }
            });
            let mut p = numerator / denominator;
            p.zip_mut_with(&mask, |v, &zero| {
                if zero {
                    *v = 0.0;
                }
            });
            p.diag_mut().fill(0.0);
            p
        }
        ComputeMode::Reference => {
            let mut p = Array2::zeros((n, m));
            for i in 0..n {
                for j in 0..m {
                    if i != j {
                        let o = origins[[i, 0]];
                        let d = destinations[[j, 0]];
                        p[[i, j]] = (o * d) / decay.apply(distance[[i, j]], alpha);
                    }
                }
            }
            p
        }
    };

    Ok(finish(p, "gravity"))
}
