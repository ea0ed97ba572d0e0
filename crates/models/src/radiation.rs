//! Radiation model and its extended, parameterized form.
//!
//! Both take the intervening-opportunity matrix `S` (see
//! [`crate::opportunity`]) in place of a raw cost matrix.

use ndarray::{Array2, ArrayView2};

use crate::error::ModelError;
use crate::model::ComputeMode;
use crate::shape::{check_model_inputs, finish};

/// Classic radiation model:
///
/// `P[i,j] = O_i D_j / ((S_ij + O_i)(S_ij + O_i + D_j))`
pub fn radiation(
    origins: ArrayView2<'_, f64>,
    destinations: ArrayView2<'_, f64>,
    opportunities: ArrayView2<'_, f64>,
    mode: ComputeMode,
) -> Result<Array2<f64>, ModelError> {
    let (n, m) = check_model_inputs(&origins, &destinations, &opportunities)?;

    let p = match mode {
        ComputeMode::Vectorized => {
            let dest_t = destinations.t();
            let numerator = &origins * &dest_t;
            let base = &opportunities + &origins;
            let denominator = &base * &(&base + &dest_t);
            numerator / denominator
        }
        ComputeMode::Reference => {
            let mut p = Array2::zeros((n, m));
            for i in 0..n {
                for j in 0..m {
                    let o = origins[[i, 0]];
                    let d = destinations[[j, 0]];
                    let s = opportunities[[i, j]];
                    p[[i, j]] = (o * d) / ((s + o) * (s + o + d));
                }
            }
            p
        }
    };

    Ok(finish(p, "radiation"))
}

/// Extended radiation model with exponent `alpha >= 0`:
///
/// `P[i,j] = ((O_i + D_j + S_ij)^a - (O_i + S_ij)^a)(O_i^a + 1)
///           / (((O_i + S_ij)^a + 1)((O_i + D_j + S_ij)^a + 1))`
///
/// At `alpha = 1` this is the radiation model with every mass shifted by
/// one, so it converges to [`radiation`] as masses grow. At `alpha = 0`
/// every power is `1` and the output is identically zero.
pub fn extended_radiation(
    origins: ArrayView2<'_, f64>,
    destinations: ArrayView2<'_, f64>,
    opportunities: ArrayView2<'_, f64>,
    alpha: f64,
    mode: ComputeMode,
) -> Result<Array2<f64>, ModelError> {
    let (n, m) = check_model_inputs(&origins, &destinations, &opportunities)?;
    if !alpha.is_finite() || alpha < 0.0 {
        return Err(ModelError::InvalidParameter {
            name: "alpha",
            value: alpha,
            reason: "extended radiation requires a finite alpha >= 0",
        });
    }

    let p = match mode {
        ComputeMode::Vectorized => {
            let inner = &opportunities + &origins;
            let outer = &inner + &destinations.t();
            let inner_a = inner.mapv(|v| v.powf(alpha));
            let outer_a = outer.mapv(|v| v.powf(alpha));
            let origin_a = origins.mapv(|v| v.powf(alpha) + 1.0);

            let numerator = &(&outer_a - &inner_a) * &origin_a;
            let denominator = (&inner_a + 1.0) * &(&outer_a + 1.0);
            numerator / denominator
        }
        ComputeMode::Reference => {
            let mut p = Array2::zeros((n, m));
            for i in 0..n {
                for j in 0..m {
                    let o = origins[[i, 0]];
                    let d = destinations[[j, 0]];
                    let s = opportunities[[i, j]];
                    let inner_a = (s + o).powf(alpha);
                    let outer_a = (s + o + d).powf(alpha);
                    let numerator = (outer_a - inner_a) * (o.powf(alpha) + 1.0);
                    let denominator = (inner_a + 1.0) * (outer_a + 1.0);
                    p[[i, j]] = numerator / denominator;
                }
            }
            p
        }
    };

    Ok(finish(p, "extended_radiation"))
}
