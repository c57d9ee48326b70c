//! Linear programming layer.
//!
//! # Key Components
//!
//! - **Model**: [`LpModel`]: real variables with optional bounds and
//!   [`LinearConstraint`]s; no objective
//! - **Oracle**: [`LpOracle`] trait: minimize or maximize one variable
//!   of a model, optionally through a [`PreparedLp`] that reuses work
//!   across queries
//! - **Simplex**: [`SimplexSolver`]: dense two-phase simplex oracle
//!
//! # Design
//!
//! The estimation core depends only on the [`LpOracle`] contract. Any
//! conforming solver can be plugged in, and tests substitute mocks.

mod model;
mod simplex;
mod solver;

pub use model::{LinearConstraint, LpModel, Relation, VarBounds};
pub use simplex::SimplexSolver;
pub use solver::{Direction, LpOracle, LpSolution, LpStatus, PreparedLp, SolverConfig};
