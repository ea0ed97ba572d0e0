//! Input shape checks and the non-finite cleanup shared by every model.

use ndarray::{Array2, ArrayView2};

use crate::error::ModelError;

/// Require an `n x 1` column and return `n`.
pub fn check_column(name: &'static str, v: &ArrayView2<'_, f64>) -> Result<usize, ModelError> {
    let (rows, cols) = v.dim();
    if cols != 1 {
        return Err(ModelError::NotColumn {
            name,
            shape: (rows, cols),
        });
    }
    Ok(rows)
}

/// Require `m` to be exactly `rows x cols`.
pub fn check_matrix(
    name: &'static str,
    m: &ArrayView2<'_, f64>,
    rows: usize,
    cols: usize,
) -> Result<(), ModelError> {
    if m.dim() != (rows, cols) {
        return Err(ModelError::ShapeMismatch {
            name,
            expected: (rows, cols),
            found: m.dim(),
        });
    }
    Ok(())
}

/// Origin column, destination column and an `n x m` cost matrix.
/// Returns `(n, m)`.
pub fn check_model_inputs(
    origins: &ArrayView2<'_, f64>,
    destinations: &ArrayView2<'_, f64>,
    cost: &ArrayView2<'_, f64>,
) -> Result<(usize, usize), ModelError> {
    let n = check_column("origins", origins)?;
    let m = check_column("destinations", destinations)?;
    check_matrix("cost", cost, n, m)?;
    Ok((n, m))
}

/// Overwrite NaN and +/-inf with `0.0`. Returns how many cells were replaced.
pub fn clean_non_finite(p: &mut Array2<f64>) -> usize {
    let mut replaced = 0;
    p.map_inplace(|v| {
        if !v.is_finite() {
            *v = 0.0;
            replaced += 1;
        }
    });
    debug_assert!(p.iter().all(|v| v.is_finite()));
    replaced
}

/// Apply the cleanup to a finished model output and log what it replaced.
pub(crate) fn finish(mut p: Array2<f64>, model: &str) -> Array2<f64> {
    let replaced = clean_non_finite(&mut p);
    if replaced > 0 {
        log::debug!("{model}: zeroed {replaced} non-finite cells of {}x{}", p.nrows(), p.ncols());
    }
    p
}
