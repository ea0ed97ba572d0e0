//! Caller-side post-processing of model output. The models never call these.

use ndarray::{Array2, ArrayView2, Axis};

use crate::error::ModelError;
use crate::shape::{check_column, check_matrix, finish};

/// Fraction of a population assumed to move in one period.
pub const DEFAULT_PRODUCTION_RATE: f64 = 0.03;

/// Divide each row by its sum. Rows that sum to zero become all zero.
pub fn row_normalize(p: ArrayView2<'_, f64>) -> Array2<f64> {
    let sums = p.sum_axis(Axis(1)).insert_axis(Axis(1));
    finish(&p / &sums, "row_normalize")
}

/// Scale row `i` of `p` by `population[i] * rate`, turning per-origin
/// probabilities into expected trip counts.
pub fn production(
    population: ArrayView2<'_, f64>,
    p: ArrayView2<'_, f64>,
    rate: f64,
) -> Result<Array2<f64>, ModelError> {
    let n = check_column("population", &population)?;
    check_matrix("probabilities", &p, n, p.ncols())?;
    let produced = population.mapv(|v| v * rate);
    Ok(&p * &produced)
}
