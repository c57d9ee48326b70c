//! Error types for birth-year estimation.
//!
//! Construction-time problems ([`ConfigurationError`]) abort before any
//! solving happens. Solve-time problems are reported through
//! [`LineageError`]; an infeasible system is a data-level failure that
//! covers every individual, not a per-individual quirk.

use crate::bounds::BirthRange;
use crate::lp::LpStatus;
use crate::pedigree::Gender;
use thiserror::Error;

/// A malformed input record or configuration value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// A relationship or constraint refers to an undeclared individual.
    #[error("individual not declared: {id}")]
    UnknownIndividual { id: String },

    /// The same identifier was declared twice.
    #[error("individual declared more than once: {id}")]
    DuplicateIndividual { id: String },

    /// The parent's declared gender disagrees with the relationship.
    #[error("parent {parent} of {child} is declared {declared} but recorded as {recorded}")]
    GenderMismatch {
        child: String,
        parent: String,
        declared: Gender,
        recorded: Gender,
    },

    /// A child already has a parent of this gender.
    #[error("{child} already has a {gender} parent ({existing}), cannot add {parent}")]
    DuplicateParent {
        child: String,
        gender: Gender,
        existing: String,
        parent: String,
    },

    /// An age-gap rule with `min_age > max_age` or a negative bound.
    #[error("invalid age rule for {gender} parents: {reason}")]
    InvalidAgeRule { gender: Gender, reason: String },

    /// Quantile outside `[0, 1]` or not finite.
    #[error("quantile must lie in [0, 1], got {0}")]
    InvalidQuantile(f64),

    /// Year window with `lo > hi`.
    #[error("invalid year window [{lo}, {hi}]")]
    InvalidYearWindow { lo: i64, hi: i64 },

    /// Solver parameters out of range.
    #[error("invalid solver configuration: {0}")]
    InvalidSolverConfig(String),
}

/// Main error type for estimation runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LineageError {
    /// The input could not be assembled into a constraint system.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// No assignment of birth years satisfies every constraint.
    ///
    /// `target` names the query that exposed the contradiction; the
    /// contradiction itself belongs to the whole input.
    #[error("constraint system is infeasible (detected while solving {target})")]
    InfeasibleSystem { target: String },

    /// A point estimate was requested for a range open on one or both sides.
    #[error("{id} is insufficiently constrained: range {range}")]
    InsufficientConstraint { id: String, range: BirthRange },

    /// Estimator input violates `min <= max`, or its span overflows.
    #[error("invalid estimator range [{min}, {max}]")]
    Domain { min: i64, max: i64 },

    /// The LP oracle failed for a reason other than infeasibility or
    /// unboundedness.
    #[error("LP oracle returned {status:?} while solving {target}")]
    Solver { target: String, status: LpStatus },
}

/// Result type alias for estimation operations.
pub type Result<T> = std::result::Result<T, LineageError>;
