//! Point estimates from feasible ranges.

mod estimator;

pub use estimator::{QuantileEstimator, DEFAULT_QUANTILE};
