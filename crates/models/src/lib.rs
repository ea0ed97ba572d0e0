//! Spatial-interaction models over dense arrays.
//!
//! Pure engine crate: mass vectors and a cost matrix in, a flow-probability
//! matrix out. No IO.
//!
//! Every model has two computation paths selected by [`ComputeMode`]: a
//! vectorized path built from ndarray broadcasting and a reference path that
//! evaluates each cell in a nested loop. Both paths must agree element-wise
//! within [`DEFAULT_TOLERANCE`]; [`verify_paths`] runs both and reports the
//! largest difference.

pub mod error;
pub mod gravity;
pub mod model;
pub mod normalize;
pub mod opportunity;
pub mod radiation;
pub mod shape;

pub use error::ModelError;
pub use gravity::{gravity, DecayLaw};
pub use model::{max_abs_diff, predict, verify_paths, ComputeMode, ModelSpec, PathCheck, DEFAULT_TOLERANCE};
pub use normalize::{production, row_normalize, DEFAULT_PRODUCTION_RATE};
pub use opportunity::intervening_opportunities;
pub use radiation::{extended_radiation, radiation};
