//! Birth-year bound solving.
//!
//! For every individual, two LP optimizations over the shared
//! [`ConstraintSystem`](crate::constraint::ConstraintSystem) give the
//! earliest and latest feasible birth year. Queries are independent and
//! read-only, so [`BoundSolver::solve_all`] runs them on the rayon pool.

mod runner;
mod types;

pub use runner::BoundSolver;
pub use types::BirthRange;
