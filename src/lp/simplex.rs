//! Dense two-phase primal simplex.
//!
//! Free variables are split as `x = x⁺ - x⁻` with `x⁺, x⁻ >= 0`;
//! variable bounds become ordinary rows. Phase 1 minimizes the sum of
//! artificial variables to find a feasible basis, phase 2 optimizes the
//! requested variable from that basis. Bland's rule is used for both
//! entering and leaving choices, which rules out cycling and makes the
//! pivot sequence a deterministic function of the model.
//!
//! # References
//!
//! - Dantzig (1963), "Linear Programming and Extensions"
//! - Bland (1977), "New finite pivoting rules for the simplex method"

use super::model::{LpModel, Relation};
use super::solver::{Direction, LpOracle, LpSolution, LpStatus, PreparedLp, SolverConfig};
use tracing::trace;

/// Dense tableau simplex oracle.
///
/// Suited to the sparse, small-coefficient systems produced by
/// genealogical constraints (a few hundred individuals). [`LpOracle::solve`]
/// builds a fresh tableau per call; [`LpOracle::prepare`] finds a feasible
/// basis once and answers each later query with phase 2 from that basis.
/// The oracle itself holds no state, so one instance can serve concurrent
/// queries.
///
/// # Examples
///
/// ```
/// use u_lineage::lp::{Direction, LinearConstraint, LpModel, LpOracle, Relation,
///     SimplexSolver, SolverConfig};
///
/// let mut model = LpModel::new("pair");
/// let parent = model.add_variable("parent");
/// let child = model.add_variable("child");
/// model.add_constraint(LinearConstraint::fix(parent, 1900.0));
/// model.add_constraint(LinearConstraint::difference(child, parent, Relation::GreaterEq, 15.0));
/// model.add_constraint(LinearConstraint::difference(child, parent, Relation::LessEq, 70.0));
///
/// let solver = SimplexSolver::new();
/// let config = SolverConfig::default();
/// let earliest = solver.solve(&model, Direction::Minimize, child, &config);
/// let latest = solver.solve(&model, Direction::Maximize, child, &config);
/// assert_eq!(earliest.objective_value.map(f64::round), Some(1915.0));
/// assert_eq!(latest.objective_value.map(f64::round), Some(1970.0));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SimplexSolver;

impl SimplexSolver {
    /// Creates the oracle.
    pub fn new() -> Self {
        Self
    }
}

impl LpOracle for SimplexSolver {
    fn solve(
        &self,
        model: &LpModel,
        direction: Direction,
        objective: usize,
        config: &SolverConfig,
    ) -> LpSolution {
        match PreparedSimplex::new(model, config) {
            Ok(prepared) => prepared.optimize(direction, objective),
            Err(failure) => failure,
        }
    }

    /// Runs phase 1 once; each query then clones the feasible tableau
    /// and runs phase 2 only.
    fn prepare<'a>(
        &'a self,
        model: &'a LpModel,
        config: &'a SolverConfig,
    ) -> Result<Box<dyn PreparedLp + 'a>, LpStatus> {
        match PreparedSimplex::new(model, config) {
            Ok(prepared) => Ok(Box::new(prepared)),
            Err(failure) => Err(failure.status),
        }
    }
}

/// A model with a feasible basis, artificial columns removed.
struct PreparedSimplex<'a> {
    model: &'a LpModel,
    config: &'a SolverConfig,
    tableau: Tableau,
    phase1_iterations: usize,
}

impl<'a> PreparedSimplex<'a> {
    /// Builds the tableau and runs phase 1. The error is the solution to
    /// report for any query.
    fn new(model: &'a LpModel, config: &'a SolverConfig) -> Result<Self, LpSolution> {
        if model.validate().is_err() {
            return Err(LpSolution::empty(LpStatus::ModelInvalid));
        }

        let mut tableau = Tableau::from_model(model, config.tolerance);
        let mut iterations = 0usize;

        // Phase 1: minimize the sum of artificials.
        if tableau.artificial_start < tableau.width {
            let mut cost = vec![0.0; tableau.width];
            for c in cost.iter_mut().skip(tableau.artificial_start) {
                *c = 1.0;
            }
            tableau.set_objective(&cost);
            match tableau.run(tableau.width, config.max_iterations, &mut iterations) {
                Outcome::Optimal => {}
                Outcome::IterationLimit => return Err(limit_reached(iterations)),
                // Sum of nonnegative artificials is bounded below.
                Outcome::Unbounded => return Err(LpSolution::empty(LpStatus::ModelInvalid)),
            }
            let infeasibility = tableau.objective_value();
            trace!(
                model = %model.name,
                infeasibility,
                iterations,
                "simplex phase 1 finished"
            );
            if infeasibility > tableau.feasibility_tolerance() {
                return Err(LpSolution {
                    iterations,
                    ..LpSolution::empty(LpStatus::Infeasible)
                });
            }
            tableau.drive_out_artificials();
        }
        tableau.drop_artificials();

        Ok(Self {
            model,
            config,
            tableau,
            phase1_iterations: iterations,
        })
    }
}

impl PreparedLp for PreparedSimplex<'_> {
    fn optimize(&self, direction: Direction, objective: usize) -> LpSolution {
        if objective >= self.model.variable_count() {
            return LpSolution::empty(LpStatus::ModelInvalid);
        }
        let mut tableau = self.tableau.clone();
        let mut iterations = self.phase1_iterations;

        // Phase 2: optimize the requested variable. Maximization runs as
        // minimization of the negated variable.
        let sign = match direction {
            Direction::Minimize => 1.0,
            Direction::Maximize => -1.0,
        };
        let mut cost = vec![0.0; tableau.width];
        cost[2 * objective] = sign;
        cost[2 * objective + 1] = -sign;
        tableau.set_objective(&cost);

        let outcome = tableau.run(tableau.width, self.config.max_iterations, &mut iterations);
        trace!(
            model = %self.model.name,
            variable = %self.model.variables[objective],
            ?direction,
            ?outcome,
            iterations,
            "simplex phase 2 finished"
        );
        match outcome {
            Outcome::Optimal => {
                let value = sign * tableau.objective_value();
                LpSolution {
                    iterations,
                    ..LpSolution::optimal(value, tableau.primal_values(self.model.variable_count()))
                }
            }
            Outcome::Unbounded => LpSolution {
                iterations,
                ..LpSolution::empty(LpStatus::Unbounded)
            },
            Outcome::IterationLimit => limit_reached(iterations),
        }
    }
}

fn limit_reached(iterations: usize) -> LpSolution {
    LpSolution {
        iterations,
        ..LpSolution::empty(LpStatus::IterationLimit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Optimal,
    Unbounded,
    IterationLimit,
}

/// Simplex tableau in canonical form.
///
/// Column layout: `[x⁺/x⁻ pairs | slack & surplus | artificial | rhs]`.
/// Artificial columns are dropped once phase 1 succeeds.
#[derive(Debug, Clone)]
struct Tableau {
    rows: Vec<Vec<f64>>,
    basis: Vec<usize>,
    /// Reduced costs; the last entry holds minus the objective value.
    cost: Vec<f64>,
    /// Number of columns, excluding the rhs.
    width: usize,
    artificial_start: usize,
    max_rhs: f64,
    tol: f64,
}

impl Tableau {
    fn from_model(model: &LpModel, tol: f64) -> Self {
        let structural = 2 * model.variable_count();

        // Gather rows over structural columns, rhs normalized to >= 0.
        let mut raw: Vec<(Vec<(usize, f64)>, Relation, f64)> = Vec::new();
        let mut push_row = |terms: Vec<(usize, f64)>, relation: Relation, rhs: f64| {
            let split: Vec<(usize, f64)> = terms
                .into_iter()
                .flat_map(|(v, c)| [(2 * v, c), (2 * v + 1, -c)])
                .collect();
            if rhs < 0.0 {
                let negated = split.into_iter().map(|(col, c)| (col, -c)).collect();
                raw.push((negated, relation.flipped(), -rhs));
            } else {
                raw.push((split, relation, rhs));
            }
        };
        for c in &model.constraints {
            push_row(c.terms.clone(), c.relation, c.rhs);
        }
        for (v, b) in model.bounds.iter().enumerate() {
            if let Some(lo) = b.lower {
                push_row(vec![(v, 1.0)], Relation::GreaterEq, lo);
            }
            if let Some(hi) = b.upper {
                push_row(vec![(v, 1.0)], Relation::LessEq, hi);
            }
        }

        let slack_count = raw
            .iter()
            .filter(|(_, r, _)| *r != Relation::Equal)
            .count();
        let artificial_count = raw
            .iter()
            .filter(|(_, r, _)| *r != Relation::LessEq)
            .count();
        let artificial_start = structural + slack_count;
        let width = artificial_start + artificial_count;

        let mut rows = Vec::with_capacity(raw.len());
        let mut basis = Vec::with_capacity(raw.len());
        let mut next_slack = structural;
        let mut next_artificial = artificial_start;
        let mut max_rhs = 0.0f64;

        for (terms, relation, rhs) in raw {
            let mut row = vec![0.0; width + 1];
            for (col, c) in terms {
                row[col] += c;
            }
            row[width] = rhs;
            max_rhs = max_rhs.max(rhs);
            match relation {
                Relation::LessEq => {
                    row[next_slack] = 1.0;
                    basis.push(next_slack);
                    next_slack += 1;
                }
                Relation::GreaterEq => {
                    row[next_slack] = -1.0;
                    next_slack += 1;
                    row[next_artificial] = 1.0;
                    basis.push(next_artificial);
                    next_artificial += 1;
                }
                Relation::Equal => {
                    row[next_artificial] = 1.0;
                    basis.push(next_artificial);
                    next_artificial += 1;
                }
            }
            rows.push(row);
        }

        Self {
            rows,
            basis,
            cost: vec![0.0; width + 1],
            width,
            artificial_start,
            max_rhs,
            tol,
        }
    }

    /// Installs cost vector `c` and prices out the current basis.
    fn set_objective(&mut self, c: &[f64]) {
        self.cost.clear();
        self.cost.extend_from_slice(c);
        self.cost.push(0.0);
        for (row, &b) in self.rows.iter().zip(&self.basis) {
            let cb = c[b];
            if cb != 0.0 {
                for (k, value) in self.cost.iter_mut().enumerate() {
                    *value -= cb * row[k];
                }
            }
        }
    }

    fn objective_value(&self) -> f64 {
        -self.cost[self.width]
    }

    fn feasibility_tolerance(&self) -> f64 {
        self.tol * 1e3 * (1.0 + self.max_rhs)
    }

    /// Minimizes the installed objective; only columns below `allowed`
    /// may enter the basis.
    fn run(&mut self, allowed: usize, max_iterations: usize, iterations: &mut usize) -> Outcome {
        loop {
            let Some(col) = (0..allowed).find(|&j| self.cost[j] < -self.tol) else {
                return Outcome::Optimal;
            };

            let mut leaving: Option<(usize, f64)> = None;
            for (i, row) in self.rows.iter().enumerate() {
                let a = row[col];
                if a <= self.tol {
                    continue;
                }
                let ratio = row[self.width] / a;
                let better = match leaving {
                    None => true,
                    Some((best, best_ratio)) => {
                        ratio < best_ratio - self.tol
                            || ((ratio - best_ratio).abs() <= self.tol
                                && self.basis[i] < self.basis[best])
                    }
                };
                if better {
                    leaving = Some((i, ratio));
                }
            }

            let Some((row, _)) = leaving else {
                return Outcome::Unbounded;
            };
            if *iterations >= max_iterations {
                return Outcome::IterationLimit;
            }
            self.pivot(row, col);
            *iterations += 1;
        }
    }

    fn pivot(&mut self, r: usize, col: usize) {
        let p = self.rows[r][col];
        for value in self.rows[r].iter_mut() {
            *value /= p;
        }
        let pivot_row = self.rows[r].clone();

        for (i, row) in self.rows.iter_mut().enumerate() {
            if i == r {
                continue;
            }
            let f = row[col];
            if f != 0.0 {
                for (value, &pv) in row.iter_mut().zip(&pivot_row) {
                    *value -= f * pv;
                }
                row[col] = 0.0;
                if row[self.width].abs() < self.tol {
                    row[self.width] = 0.0;
                }
            }
        }

        let f = self.cost[col];
        if f != 0.0 {
            for (value, &pv) in self.cost.iter_mut().zip(&pivot_row) {
                *value -= f * pv;
            }
            self.cost[col] = 0.0;
        }
        self.basis[r] = col;
    }

    /// After a successful phase 1, replaces every artificial left in the
    /// basis (all at value zero) by a real column, or drops its row when
    /// the row is a linear combination of the others.
    fn drive_out_artificials(&mut self) {
        let mut i = 0;
        while i < self.rows.len() {
            if self.basis[i] < self.artificial_start {
                i += 1;
                continue;
            }
            let replacement = (0..self.artificial_start).find(|&j| self.rows[i][j].abs() > self.tol);
            match replacement {
                Some(col) => {
                    self.pivot(i, col);
                    i += 1;
                }
                None => {
                    self.rows.remove(i);
                    self.basis.remove(i);
                }
            }
        }
    }

    /// Removes the artificial columns. Every basic column must already
    /// be a real one.
    fn drop_artificials(&mut self) {
        let keep = self.artificial_start;
        for row in &mut self.rows {
            row[keep] = row[self.width];
            row.truncate(keep + 1);
        }
        self.width = keep;
        self.cost = vec![0.0; keep + 1];
    }

    /// Values of the model variables at the current basis.
    fn primal_values(&self, variable_count: usize) -> Vec<f64> {
        let mut column_values = vec![0.0; self.width];
        for (row, &b) in self.rows.iter().zip(&self.basis) {
            column_values[b] = row[self.width];
        }
        (0..variable_count)
            .map(|v| column_values[2 * v] - column_values[2 * v + 1])
            .collect()
    }
}
