//! Intervening-opportunity ranking.
//!
//! For origin `i`, destinations are ranked by cost from `i` with a stable
//! sort, so ties keep index order. `S[i][j]` is the feature mass of the
//! destinations ranked strictly between the nearest location and `j`.
//! The nearest location (normally `i` itself at cost 0) and the one ranked
//! second both get `0`.
//!
//! The vectorized path builds each row as `[0, 0] ++ cumsum(ranked[1..n-1])`
//! and scatters it back through the sort order. The farthest-ranked feature
//! never enters a cumulative sum; it could only contribute to a position
//! past the end of the row.

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::error::ModelError;
use crate::model::ComputeMode;
use crate::shape::{check_column, check_matrix};

/// Cumulative intervening feature mass for every origin/destination pair.
///
/// `features` is an `n x 1` column, `cost` an `n x n` matrix.
pub fn intervening_opportunities(
    features: ArrayView2<'_, f64>,
    cost: ArrayView2<'_, f64>,
    mode: ComputeMode,
) -> Result<Array2<f64>, ModelError> {
    let n = check_column("features", &features)?;
    check_matrix("cost", &cost, n, n)?;

    log::debug!("ranking intervening opportunities for {n} locations ({mode})");

    Ok(match mode {
        ComputeMode::Vectorized => rank_vectorized(features.column(0), cost),
        ComputeMode::Reference => rank_reference(features, cost),
    })
}

fn rank_vectorized(features: ArrayView1<'_, f64>, cost: ArrayView2<'_, f64>) -> Array2<f64> {
    let n = features.len();
    let mut out = Array2::zeros((n, n));

    for (i, row) in cost.outer_iter().enumerate() {
        let order = argsort_stable(row);
        let ranked = features.select(Axis(0), &order);

        let mut cumulative = Array1::<f64>::zeros(n);
        if n > 2 {
            let mut inner = ranked.slice(s![1..n - 1]).to_owned();
            inner.accumulate_axis_inplace(Axis(0), |&prev, cur| *cur += prev);
            cumulative.slice_mut(s![2..]).assign(&inner);
        }

        let mut target = out.row_mut(i);
        for (rank, &j) in order.iter().enumerate() {
            target[j] = cumulative[rank];
        }
    }

    out
}

fn rank_reference(features: ArrayView2<'_, f64>, cost: ArrayView2<'_, f64>) -> Array2<f64> {
    let n = features.nrows();
    let mut out = Array2::zeros((n, n));

    for i in 0..n {
        let mut others: Vec<(f64, usize)> = (0..n).map(|j| (cost[[i, j]], j)).collect();
        // Vec::sort_by is stable
        others.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut cumulative = 0.0;
        for &(_, j) in others.iter().skip(1) {
            out[[i, j]] = cumulative;
            cumulative += features[[j, 0]];
        }
    }

    out
}

/// Indices that sort `row` ascending; equal values keep index order.
fn argsort_stable(row: ArrayView1<'_, f64>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..row.len()).collect();
    order.sort_by(|&a, &b| row[a].total_cmp(&row[b]));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn line_of_four() -> (Array2<f64>, Array2<f64>) {
        // Four locations on a line at x = 0, 1, 3, 6.
        let xs = [0.0_f64, 1.0, 3.0, 6.0];
        let cost = Array2::from_shape_fn((4, 4), |(i, j)| (xs[i] - xs[j]).abs());
        let features = array![[10.0], [20.0], [30.0], [40.0]];
        (features, cost)
    }

    #[test]
    fn ranks_by_distance_from_origin() {
        let (features, cost) = line_of_four();
        let s = intervening_opportunities(features.view(), cost.view(), ComputeMode::Vectorized)
            .unwrap();

        // From 0: order 0,1,2,3 -> [0, 0, f1, f1+f2]
        assert_eq!(s.row(0).to_vec(), vec![0.0, 0.0, 20.0, 50.0]);
        // From 3: order 3,2,1,0 -> 2 gets 0, 1 gets f2, 0 gets f2+f1
        assert_eq!(s.row(3).to_vec(), vec![50.0, 30.0, 0.0, 0.0]);
    }

    #[test]
    fn paths_agree_exactly() {
        let (features, cost) = line_of_four();
        let fast = intervening_opportunities(features.view(), cost.view(), ComputeMode::Vectorized)
            .unwrap();
        let slow = intervening_opportunities(features.view(), cost.view(), ComputeMode::Reference)
            .unwrap();
        assert_eq!(fast, slow);
    }

    #[test]
    fn ties_keep_index_order() {
        // 1 and 2 are equidistant from 0; 1 ranks first.
        let cost = array![[0.0, 5.0, 5.0], [5.0, 0.0, 1.0], [5.0, 1.0, 0.0]];
        let features = array![[1.0], [100.0], [1000.0]];
        for mode in [ComputeMode::Vectorized, ComputeMode::Reference] {
            let s = intervening_opportunities(features.view(), cost.view(), mode).unwrap();
            assert_eq!(s[[0, 1]], 0.0);
            assert_eq!(s[[0, 2]], 100.0);
        }
    }

    #[test]
    fn diagonal_is_zero() {
        let (features, cost) = line_of_four();
        let s = intervening_opportunities(features.view(), cost.view(), ComputeMode::Reference)
            .unwrap();
        for i in 0..4 {
            assert_eq!(s[[i, i]], 0.0);
        }
    }

    #[test]
    fn tiny_inputs() {
        let one = intervening_opportunities(
            array![[7.0]].view(),
            array![[0.0]].view(),
            ComputeMode::Vectorized,
        )
        .unwrap();
        assert_eq!(one, array![[0.0]]);

        let empty = intervening_opportunities(
            Array2::<f64>::zeros((0, 1)).view(),
            Array2::<f64>::zeros((0, 0)).view(),
            ComputeMode::Vectorized,
        )
        .unwrap();
        assert_eq!(empty.dim(), (0, 0));
    }

    #[test]
    fn rejects_non_square_cost() {
        let err = intervening_opportunities(
            array![[1.0], [2.0]].view(),
            Array2::<f64>::zeros((2, 3)).view(),
            ComputeMode::Vectorized,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch { name: "cost", .. }));
    }

    #[test]
    fn rejects_feature_length_mismatch() {
        let err = intervening_opportunities(
            array![[1.0], [2.0], [3.0]].view(),
            Array2::<f64>::zeros((2, 2)).view(),
            ComputeMode::Reference,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ModelError::ShapeMismatch {
                name: "cost",
                expected: (3, 3),
                found: (2, 2)
            }
        );
    }
}
