// Property-based tests: vectorized vs reference paths, and output invariants.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use ndarray::Array2;
use proptest::prelude::*;

use odflow_models::{
    extended_radiation, gravity, intervening_opportunities, max_abs_diff, radiation,
    ComputeMode, DecayLaw, DEFAULT_TOLERANCE,
};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Mass: sometimes exactly zero, otherwise a population-sized value.
fn arb_mass() -> impl Strategy<Value = f64> {
    prop_oneof![
        1 => Just(0.0),
        4 => 0.0..1e5f64,
    ]
}

/// Off-diagonal distance: small integers often, so ties are common.
fn arb_distance() -> impl Strategy<Value = f64> {
    prop_oneof![
        1 => (1u32..4).prop_map(f64::from),
        2 => 0.1..100.0f64,
    ]
}

fn arb_alpha() -> impl Strategy<Value = f64> {
    prop_oneof![
        1 => Just(0.0),
        1 => Just(1.0),
        3 => 0.0..3.0f64,
    ]
}

fn column(values: Vec<f64>) -> Array2<f64> {
    let n = values.len();
    Array2::from_shape_vec((n, 1), values).unwrap()
}

/// Masses plus a symmetric distance matrix with a zero diagonal.
fn arb_square() -> impl Strategy<Value = (Array2<f64>, Array2<f64>)> {
    (1usize..9)
        .prop_flat_map(|n| {
            (
                prop::collection::vec(arb_mass(), n),
                prop::collection::vec(arb_distance(), n * n),
            )
        })
        .prop_map(|(masses, raw)| {
            let n = masses.len();
            let dist = Array2::from_shape_fn((n, n), |(i, j)| {
                if i == j {
                    0.0
                } else {
                    raw[i.min(j) * n + i.max(j)]
                }
            });
            (column(masses), dist)
        })
}

/// Rectangular origin/destination masses with an arbitrary non-negative
/// opportunity matrix.
fn arb_rect() -> impl Strategy<Value = (Array2<f64>, Array2<f64>, Array2<f64>)> {
    (1usize..7, 1usize..7)
        .prop_flat_map(|(n, m)| {
            (
                prop::collection::vec(arb_mass(), n),
                prop::collection::vec(arb_mass(), m),
                prop::collection::vec(0.0..1e5f64, n * m),
            )
        })
        .prop_map(|(o, d, s)| {
            let (n, m) = (o.len(), d.len());
            let s = Array2::from_shape_vec((n, m), s).unwrap();
            (column(o), column(d), s)
        })
}

fn assert_clean(p: &Array2<f64>) -> Result<(), TestCaseError> {
    for &v in p.iter() {
        prop_assert!(v.is_finite(), "non-finite value {v}");
        prop_assert!(v >= 0.0, "negative value {v}");
    }
    Ok(())
}

fn both<F>(f: F) -> (Array2<f64>, Array2<f64>)
where
    F: Fn(ComputeMode) -> Array2<f64>,
{
    (f(ComputeMode::Vectorized), f(ComputeMode::Reference))
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn opportunities_paths_agree((pop, dist) in arb_square()) {
        let (fast, slow) = both(|mode| {
            intervening_opportunities(pop.view(), dist.view(), mode).unwrap()
        });
        prop_assert!(max_abs_diff(&fast.view(), &slow.view()) <= DEFAULT_TOLERANCE);
    }

    #[test]
    fn opportunities_invariants((pop, dist) in arb_square()) {
        let s = intervening_opportunities(pop.view(), dist.view(), ComputeMode::Vectorized).unwrap();
        let n = pop.nrows();
        for i in 0..n {
            prop_assert_eq!(s[[i, i]], 0.0);

            let mut order: Vec<usize> = (0..n).collect();
            order.sort_by(|&a, &b| dist[[i, a]].total_cmp(&dist[[i, b]]));
            let mut prev = 0.0;
            for &j in &order {
                prop_assert!(s[[i, j]] >= 0.0);
                prop_assert!(s[[i, j]] >= prev, "row {} not non-decreasing at {}", i, j);
                prev = s[[i, j]];
            }
        }
    }

    #[test]
    fn radiation_paths_agree((pop, dist) in arb_square()) {
        let s = intervening_opportunities(pop.view(), dist.view(), ComputeMode::Vectorized).unwrap();
        let (fast, slow) = both(|mode| radiation(pop.view(), pop.view(), s.view(), mode).unwrap());
        prop_assert!(max_abs_diff(&fast.view(), &slow.view()) <= DEFAULT_TOLERANCE);
        assert_clean(&fast)?;
        assert_clean(&slow)?;
    }

    #[test]
    fn radiation_rectangular_paths_agree((o, d, s) in arb_rect()) {
        let (fast, slow) = both(|mode| radiation(o.view(), d.view(), s.view(), mode).unwrap());
        prop_assert_eq!(fast.dim(), (o.nrows(), d.nrows()));
        prop_assert!(max_abs_diff(&fast.view(), &slow.view()) <= DEFAULT_TOLERANCE);
        assert_clean(&fast)?;
    }

    #[test]
    fn extended_radiation_paths_agree((pop, dist) in arb_square(), alpha in arb_alpha()) {
        let s = intervening_opportunities(pop.view(), dist.view(), ComputeMode::Vectorized).unwrap();
        let (fast, slow) = both(|mode| {
            extended_radiation(pop.view(), pop.view(), s.view(), alpha, mode).unwrap()
        });
        prop_assert!(max_abs_diff(&fast.view(), &slow.view()) <= DEFAULT_TOLERANCE);
        assert_clean(&fast)?;
        assert_clean(&slow)?;
    }

    #[test]
    fn extended_radiation_rectangular_paths_agree((o, d, s) in arb_rect(), alpha in arb_alpha()) {
        let (fast, slow) = both(|mode| {
            extended_radiation(o.view(), d.view(), s.view(), alpha, mode).unwrap()
        });
        prop_assert!(max_abs_diff(&fast.view(), &slow.view()) <= DEFAULT_TOLERANCE);
        assert_clean(&fast)?;
    }

    #[test]
    fn gravity_power_paths_agree((pop, dist) in arb_square(), alpha in arb_alpha()) {
        let (fast, slow) = both(|mode| {
            gravity(pop.view(), pop.view(), dist.view(), alpha, DecayLaw::Power, mode).unwrap()
        });
        prop_assert!(max_abs_diff(&fast.view(), &slow.view()) <= DEFAULT_TOLERANCE);
        assert_clean(&fast)?;
        assert_clean(&slow)?;
    }

    #[test]
    fn gravity_exponential_paths_agree((pop, dist) in arb_square(), alpha in arb_alpha()) {
        let (fast, slow) = both(|mode| {
            gravity(pop.view(), pop.view(), dist.view(), alpha, DecayLaw::Exponential, mode).unwrap()
        });
        prop_assert!(max_abs_diff(&fast.view(), &slow.view()) <= DEFAULT_TOLERANCE);
        assert_clean(&fast)?;
        assert_clean(&slow)?;
    }

    #[test]
    fn gravity_self_pairs_are_zero(
        (pop, dist) in arb_square(),
        alpha in arb_alpha(),
        exponential in any::<bool>(),
    ) {
        let decay = if exponential { DecayLaw::Exponential } else { DecayLaw::Power };
        for mode in [ComputeMode::Vectorized, ComputeMode::Reference] {
            let p = gravity(pop.view(), pop.view(), dist.view(), alpha, decay, mode).unwrap();
            for i in 0..pop.nrows() {
                prop_assert_eq!(p[[i, i]], 0.0);
            }
        }
    }

    #[test]
    fn extended_at_alpha_one_tracks_radiation_for_large_masses((pop, dist) in arb_square()) {
        // Shift masses far from zero so the +1 terms of the extended form vanish.
        let pop = pop.mapv(|v| (v + 1.0) * 1e6);
        let s = intervening_opportunities(pop.view(), dist.view(), ComputeMode::Vectorized).unwrap();
        let plain = radiation(pop.view(), pop.view(), s.view(), ComputeMode::Vectorized).unwrap();
        let ext = extended_radiation(pop.view(), pop.view(), s.view(), 1.0, ComputeMode::Vectorized).unwrap();
        for ((i, j), &a) in plain.indexed_iter() {
            let b = ext[[i, j]];
            prop_assert!((a - b).abs() <= 1e-5 * a, "({}, {}): {} vs {}", i, j, a, b);
        }
    }
}
