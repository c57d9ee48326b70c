//! LP oracle interface.

use super::model::LpModel;
use crate::error::ConfigurationError;

/// Optimization direction for the single-variable objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Minimize,
    Maximize,
}

/// Status of the oracle after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LpStatus {
    /// Proven optimal value found.
    Optimal,
    /// No assignment satisfies the constraints.
    Infeasible,
    /// The objective can be improved without limit.
    Unbounded,
    /// Solver exceeded its iteration budget.
    IterationLimit,
    /// Model is invalid or malformed.
    ModelInvalid,
}

/// Solution from an LP oracle.
#[derive(Debug, Clone)]
pub struct LpSolution {
    /// Solver status.
    pub status: LpStatus,
    /// Objective value, present iff `status == Optimal`.
    pub objective_value: Option<f64>,
    /// An optimal vertex (one value per model variable), when the oracle
    /// reports one. Only the objective value is consumed by the bound
    /// solver; the vertex is for diagnostics and tests.
    pub values: Vec<f64>,
    /// Pivots performed.
    pub iterations: usize,
}

impl LpSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: LpStatus) -> Self {
        Self {
            status,
            objective_value: None,
            values: Vec::new(),
            iterations: 0,
        }
    }

    /// Creates an optimal solution.
    pub fn optimal(value: f64, values: Vec<f64>) -> Self {
        Self {
            status: LpStatus::Optimal,
            objective_value: Some(value),
            values,
            iterations: 0,
        }
    }

    /// Whether an optimal value was found.
    pub fn is_optimal(&self) -> bool {
        self.status == LpStatus::Optimal
    }
}

/// Solver configuration.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SolverConfig {
    /// Maximum number of pivots per optimization (both phases combined).
    pub max_iterations: usize,
    /// Pivot and optimality tolerance.
    pub tolerance: f64,
    /// Distance from an integer under which an optimal value is treated
    /// as that integer before outward rounding.
    pub integrality_tolerance: f64,
    /// Whether to solve individuals in parallel using rayon.
    pub parallel: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50_000,
            tolerance: 1e-9,
            integrality_tolerance: 1e-6,
            parallel: true,
        }
    }
}

impl SolverConfig {
    /// Sets the pivot budget per optimization.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the pivot and optimality tolerance.
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Sets the snapping distance used before outward rounding.
    pub fn with_integrality_tolerance(mut self, tol: f64) -> Self {
        self.integrality_tolerance = tol;
        self
    }

    /// Enables or disables parallel bound solving.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_iterations == 0 {
            return Err(ConfigurationError::InvalidSolverConfig(
                "max_iterations must be positive".into(),
            ));
        }
        if !(self.tolerance > 0.0 && self.tolerance < 1e-3) {
            return Err(ConfigurationError::InvalidSolverConfig(format!(
                "tolerance must be in (0, 1e-3), got {}",
                self.tolerance
            )));
        }
        if !(self.integrality_tolerance >= 0.0 && self.integrality_tolerance < 0.5) {
            return Err(ConfigurationError::InvalidSolverConfig(format!(
                "integrality_tolerance must be in [0, 0.5), got {}",
                self.integrality_tolerance
            )));
        }
        Ok(())
    }
}

/// A model prepared for repeated single-variable optimizations.
///
/// Produced by [`LpOracle::prepare`]. Queries share whatever work the
/// oracle did up front and may run concurrently.
pub trait PreparedLp: Send + Sync {
    /// Optimizes `x[objective]` in `direction`.
    fn optimize(&self, direction: Direction, objective: usize) -> LpSolution;
}

/// Trait for LP oracle implementations.
///
/// An oracle minimizes or maximizes a single variable of the model
/// subject to all of its constraints and bounds. Implementations must be
/// deterministic in the objective value they report and free of side
/// effects, so the same model can be queried from several threads.
pub trait LpOracle: Send + Sync {
    /// Optimizes `x[objective]` in `direction` over `model`.
    fn solve(
        &self,
        model: &LpModel,
        direction: Direction,
        objective: usize,
        config: &SolverConfig,
    ) -> LpSolution;

    /// Prepares `model` for many queries.
    ///
    /// Fails with the status that makes every query fail, e.g.
    /// [`LpStatus::Infeasible`]. The default keeps no state and forwards
    /// each query to [`solve`](LpOracle::solve).
    fn prepare<'a>(
        &'a self,
        model: &'a LpModel,
        config: &'a SolverConfig,
    ) -> Result<Box<dyn PreparedLp + 'a>, LpStatus> {
        Ok(Box::new(Forwarding {
            oracle: self,
            model,
            config,
        }))
    }
}

impl<O: LpOracle + ?Sized> LpOracle for &O {
    fn solve(
        &self,
        model: &LpModel,
        direction: Direction,
        objective: usize,
        config: &SolverConfig,
    ) -> LpSolution {
        (**self).solve(model, direction, objective, config)
    }

    fn prepare<'a>(
        &'a self,
        model: &'a LpModel,
        config: &'a SolverConfig,
    ) -> Result<Box<dyn PreparedLp + 'a>, LpStatus> {
        (**self).prepare(model, config)
    }
}

/// Stateless preparation: every query is a full solve.
struct Forwarding<'a, O: ?Sized> {
    oracle: &'a O,
    model: &'a LpModel,
    config: &'a SolverConfig,
}

impl<O: LpOracle + ?Sized> PreparedLp for Forwarding<'_, O> {
    fn optimize(&self, direction: Direction, objective: usize) -> LpSolution {
        self.oracle.solve(self.model, direction, objective, self.config)
    }
}
