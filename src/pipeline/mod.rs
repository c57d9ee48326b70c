//! Complete estimation runs.
//!
//! [`LineageEstimator`] compiles a pedigree, solves every bound and
//! applies the quantile estimator, returning an [`EstimationReport`].
//! Individuals whose range stays open are reported as
//! [`BirthEstimate::Unbounded`] rather than failing the run.

mod config;
mod runner;

pub use config::LineageConfig;
pub use runner::{BirthEstimate, EstimationReport, LineageEstimator};
