//! Per-individual bound solving.
//!
//! [`BoundSolver`] runs two optimizations per individual (minimize and
//! maximize its birth year) over one shared [`ConstraintSystem`].

use super::types::BirthRange;
use crate::constraint::ConstraintSystem;
use crate::error::{ConfigurationError, LineageError, Result};
use crate::lp::{Direction, LpOracle, LpStatus, PreparedLp, SolverConfig};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Computes feasible birth-year ranges.
///
/// Rounding policy: an optimal minimum is rounded down and an optimal
/// maximum up, so no feasible boundary year is ever excluded. Values
/// within [`SolverConfig::integrality_tolerance`] of an integer are first
/// snapped to it.
///
/// # Usage
///
/// ```
/// use u_lineage::bounds::BoundSolver;
/// use u_lineage::constraint::ConstraintCompiler;
/// use u_lineage::lp::{SimplexSolver, SolverConfig};
/// use u_lineage::pedigree::{Individual, Registry, RelationshipGraph};
///
/// let mut registry = Registry::new();
/// registry.add(Individual::female("rebekah").with_known_birth_year(1800)).unwrap();
/// registry.add(Individual::male("jacob")).unwrap();
/// let mut graph = RelationshipGraph::new();
/// graph.add_mother("jacob", "rebekah").unwrap();
///
/// let system = ConstraintCompiler::default().compile(&registry, &graph).unwrap();
/// let solver = BoundSolver::new(&system, SimplexSolver::new(), SolverConfig::default()).unwrap();
/// let range = solver.solve_individual("jacob").unwrap();
/// assert_eq!(range.as_finite(), Some((1815, 1850)));
/// ```
pub struct BoundSolver<'a, O: LpOracle> {
    system: &'a ConstraintSystem,
    oracle: O,
    config: SolverConfig,
}

impl<'a, O: LpOracle> BoundSolver<'a, O> {
    /// Creates a solver after validating `config`.
    pub fn new(
        system: &'a ConstraintSystem,
        oracle: O,
        config: SolverConfig,
    ) -> std::result::Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            system,
            oracle,
            config,
        })
    }

    /// The system being solved.
    pub fn system(&self) -> &ConstraintSystem {
        self.system
    }

    /// Feasible range of one individual.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::UnknownIndividual`] if `id` has no variable
    /// - [`LineageError::InfeasibleSystem`] if the whole system is
    ///   contradictory
    /// - [`LineageError::Solver`] if the oracle gives up
    pub fn solve_individual(&self, id: &str) -> Result<BirthRange> {
        let var = self
            .system
            .index_of(id)
            .ok_or_else(|| ConfigurationError::UnknownIndividual { id: id.to_string() })?;
        let prepared = self.prepare(id)?;
        self.bound(prepared.as_ref(), id, var)
    }

    /// Feasible ranges of every individual in the system.
    ///
    /// The model is prepared once and shared by every query. The first
    /// individual is then solved alone: if the system is infeasible,
    /// preparation or that query exposes it and the run stops before any
    /// other work. The remaining individuals are solved independently,
    /// in parallel when [`SolverConfig::parallel`] is set.
    pub fn solve_all(&self) -> Result<BTreeMap<String, BirthRange>> {
        let start = Instant::now();
        let ids: Vec<(usize, &str)> = self.system.ids().enumerate().collect();
        let Some((&(first_var, first), rest)) = ids.split_first() else {
            return Ok(BTreeMap::new());
        };

        let prepared = self.prepare(first)?;
        let prepared = prepared.as_ref();
        let first_range = self.bound(prepared, first, first_var)?;

        let solve = |&(var, id): &(usize, &str)| {
            self.bound(prepared, id, var).map(|r| (id.to_string(), r))
        };
        let solved: Vec<(String, BirthRange)> = if self.config.parallel {
            rest.par_iter().map(solve).collect::<Result<_>>()?
        } else {
            rest.iter().map(solve).collect::<Result<_>>()?
        };

        let mut ranges: BTreeMap<String, BirthRange> = solved.into_iter().collect();
        ranges.insert(first.to_string(), first_range);

        let finite = ranges.values().filter(|r| r.is_finite()).count();
        info!(
            individuals = ranges.len(),
            finite,
            open = ranges.len() - finite,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "bounds solved"
        );
        Ok(ranges)
    }

    /// Prepares the shared model; `target` names the query in errors.
    fn prepare(&self, target: &str) -> Result<Box<dyn PreparedLp + '_>> {
        self.oracle
            .prepare(self.system.model(), &self.config)
            .map_err(|status| self.failure(target, None, status))
    }

    fn bound(&self, prepared: &dyn PreparedLp, id: &str, var: usize) -> Result<BirthRange> {
        let tol = self.config.integrality_tolerance;
        let earliest = self
            .optimize(prepared, id, var, Direction::Minimize)?
            .map(|v| round_outward(v, Direction::Minimize, tol));
        let latest = self
            .optimize(prepared, id, var, Direction::Maximize)?
            .map(|v| round_outward(v, Direction::Maximize, tol));

        let range = BirthRange::new(earliest, latest);
        debug!(id, %range, "bound solved");
        Ok(range)
    }

    /// Optimal value of `x[var]` in `direction`; `None` when unbounded.
    fn optimize(
        &self,
        prepared: &dyn PreparedLp,
        id: &str,
        var: usize,
        direction: Direction,
    ) -> Result<Option<f64>> {
        let solution = prepared.optimize(direction, var);
        match (solution.status, solution.objective_value) {
            (LpStatus::Optimal, Some(value)) => Ok(Some(value)),
            (LpStatus::Unbounded, _) => Ok(None),
            (status, _) => Err(self.failure(id, Some(direction), status)),
        }
    }

    fn failure(&self, target: &str, direction: Option<Direction>, status: LpStatus) -> LineageError {
        if status == LpStatus::Infeasible {
            warn!(id = target, ?direction, "constraint system is infeasible");
            LineageError::InfeasibleSystem {
                target: target.to_string(),
            }
        } else {
            LineageError::Solver {
                target: target.to_string(),
                status,
            }
        }
    }
}

/// Rounds a relaxed optimum outward to an integer year.
fn round_outward(value: f64, direction: Direction, tolerance: f64) -> i64 {
    let nearest = value.round();
    let snapped = if (value - nearest).abs() <= tolerance {
        nearest
    } else {
        value
    };
    match direction {
        Direction::Minimize => snapped.floor() as i64,
        Direction::Maximize => snapped.ceil() as i64,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{AuxiliaryConstraint, CompilerConfig, ConstraintCompiler};
    use crate::lp::{LpModel, LpSolution, Relation, SimplexSolver};
    use crate::pedigree::{Individual, Registry, RelationshipGraph};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn compile(registry: &Registry, graph: &RelationshipGraph) -> ConstraintSystem {
        ConstraintCompiler::default().compile(registry, graph).unwrap()
    }

    fn simplex(system: &ConstraintSystem) -> BoundSolver<'_, SimplexSolver> {
        BoundSolver::new(system, SimplexSolver::new(), SolverConfig::default()).unwrap()
    }

    /// terah (1700) → abraham; abraham + sarah → isaac; isaac → jacob.
    fn patriarchs() -> (Registry, RelationshipGraph) {
        let mut registry = Registry::new();
        registry.add(Individual::male("terah").with_known_birth_year(1700)).unwrap();
        registry.add(Individual::male("abraham")).unwrap();
        registry.add(Individual::female("sarah")).unwrap();
        registry.add(Individual::male("isaac")).unwrap();
        registry.add(Individual::male("jacob").with_known_birth_year(1800)).unwrap();

        let mut graph = RelationshipGraph::new();
        graph.add_father("abraham", "terah").unwrap();
        graph.add_father("isaac", "abraham").unwrap();
        graph.add_mother("isaac", "sarah").unwrap();
        graph.add_father("jacob", "isaac").unwrap();
        (registry, graph)
    }

    #[test]
    fn test_known_year_isolated() {
        let mut registry = Registry::new();
        registry.add(Individual::female("leah").with_known_birth_year(1234)).unwrap();
        let system = compile(&registry, &RelationshipGraph::new());

        let range = simplex(&system).solve_individual("leah").unwrap();
        assert_eq!(range, BirthRange::finite(1234, 1234));
    }

    #[test]
    fn test_single_edge() {
        let mut registry = Registry::new();
        registry.add(Individual::male("abraham").with_known_birth_year(1900)).unwrap();
        registry.add(Individual::male("isaac")).unwrap();
        let mut graph = RelationshipGraph::new();
        graph.add_father("isaac", "abraham").unwrap();
        let system = compile(&registry, &graph);

        let range = simplex(&system).solve_individual("isaac").unwrap();
        assert_eq!(range, BirthRange::finite(1915, 1970));
    }

    #[test]
    fn test_transitive_bounds() {
        let (registry, graph) = patriarchs();
        let system = compile(&registry, &graph);
        let ranges = simplex(&system).solve_all().unwrap();

        // abraham: >= 1715 from terah, >= 1800 - 140 = 1660 from jacob;
        // <= 1770 from terah, <= 1800 - 30 = 1770 from jacob.
        assert_eq!(ranges["abraham"], BirthRange::finite(1715, 1770));
        // isaac: [1730, 1840] via abraham, [1730, 1785] via jacob.
        assert_eq!(ranges["isaac"], BirthRange::finite(1730, 1785));
        // sarah: isaac - 50 ..= isaac - 15.
        assert_eq!(ranges["sarah"], BirthRange::finite(1680, 1770));
        assert_eq!(ranges["jacob"], BirthRange::finite(1800, 1800));
        assert_eq!(ranges["terah"], BirthRange::finite(1700, 1700));
    }

    #[test]
    fn test_unbounded_isolated() {
        let mut registry = Registry::new();
        registry.add(Individual::male("melchizedek")).unwrap();
        let system = compile(&registry, &RelationshipGraph::new());

        let range = simplex(&system).solve_individual("melchizedek").unwrap();
        assert_eq!(range, BirthRange::unbounded());
    }

    #[test]
    fn test_bounds_propagate_both_directions() {
        let mut registry = Registry::new();
        registry.add(Individual::male("noah").with_known_birth_year(100)).unwrap();
        registry.add(Individual::male("shem")).unwrap();
        registry.add(Individual::male("arphaxad")).unwrap();
        let mut graph = RelationshipGraph::new();
        graph.add_father("shem", "noah").unwrap();
        graph.add_father("arphaxad", "shem").unwrap();
        registry.add(Individual::male("ancestor")).unwrap();
        graph.add_father("noah", "ancestor").unwrap();
        let system = compile(&registry, &graph);
        let solver = simplex(&system);

        assert_eq!(
            solver.solve_individual("arphaxad").unwrap(),
            BirthRange::finite(130, 240)
        );
        assert_eq!(
            solver.solve_individual("ancestor").unwrap(),
            BirthRange::finite(30, 85)
        );
    }

    #[test]
    fn test_infeasible_system() {
        let mut registry = Registry::new();
        registry.add(Individual::male("parent").with_known_birth_year(500)).unwrap();
        registry.add(Individual::male("child").with_known_birth_year(510)).unwrap();
        let mut graph = RelationshipGraph::new();
        graph.add_father("child", "parent").unwrap();
        let system = compile(&registry, &graph);
        let solver = simplex(&system);

        assert!(matches!(
            solver.solve_all(),
            Err(LineageError::InfeasibleSystem { .. })
        ));
        assert!(matches!(
            solver.solve_individual("parent"),
            Err(LineageError::InfeasibleSystem { .. })
        ));
    }

    #[test]
    fn test_unknown_target() {
        let (registry, graph) = patriarchs();
        let system = compile(&registry, &graph);
        assert!(matches!(
            simplex(&system).solve_individual("esau"),
            Err(LineageError::Configuration(ConfigurationError::UnknownIndividual { .. }))
        ));
    }

    #[test]
    fn test_idempotent() {
        let (registry, graph) = patriarchs();
        let system = compile(&registry, &graph);
        let solver = simplex(&system);

        assert_eq!(solver.solve_all().unwrap(), solver.solve_all().unwrap());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (registry, graph) = patriarchs();
        let system = compile(&registry, &graph);
        let parallel = simplex(&system).solve_all().unwrap();
        let sequential = BoundSolver::new(
            &system,
            SimplexSolver::new(),
            SolverConfig::default().with_parallel(false),
        )
        .unwrap()
        .solve_all()
        .unwrap();

        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_earliest_child_year_is_achievable() {
        let (registry, graph) = patriarchs();
        let system = compile(&registry, &graph);
        let ranges = simplex(&system).solve_all().unwrap();
        let rules = CompilerConfig::default().rules;

        for rel in graph.relationships() {
            let child_min = ranges[&rel.child].earliest.unwrap();
            let parent_range = ranges[&rel.parent];
            let rule = rules.for_gender(rel.parent_gender);

            // Pin the child at its earliest year; the system must stay
            // feasible and leave the parent a year inside its own range
            // that respects the age gap.
            let pin = [AuxiliaryConstraint::new(
                vec![(rel.child.clone(), 1.0)],
                Relation::Equal,
                child_min as f64,
            )];
            let pinned = ConstraintCompiler::default()
                .compile_with(&registry, &graph, &pin)
                .unwrap();
            let parent = simplex(&pinned).solve_individual(&rel.parent).unwrap();
            let (lo, hi) = parent.as_finite().unwrap();

            assert!(parent.is_within(&parent_range));
            assert!((lo..=hi).any(|p| {
                let gap = child_min - p;
                gap >= rule.min_age && gap <= rule.max_age
            }));
        }
    }

    #[test]
    fn test_round_outward() {
        let tol = 1e-6;
        assert_eq!(round_outward(1914.9999999, Direction::Minimize, tol), 1915);
        assert_eq!(round_outward(1915.0000001, Direction::Maximize, tol), 1915);
        assert_eq!(round_outward(1914.5, Direction::Minimize, tol), 1914);
        assert_eq!(round_outward(1970.2, Direction::Maximize, tol), 1971);
        assert_eq!(round_outward(-10.5, Direction::Minimize, tol), -11);
    }

    // ---- Mock oracles ----

    struct CountingOracle {
        status: LpStatus,
        value: f64,
        calls: AtomicUsize,
    }

    impl CountingOracle {
        fn new(status: LpStatus, value: f64) -> Self {
            Self {
                status,
                value,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl LpOracle for CountingOracle {
        fn solve(
            &self,
            _model: &LpModel,
            direction: Direction,
            _objective: usize,
            _config: &SolverConfig,
        ) -> LpSolution {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.status {
                LpStatus::Optimal => {
                    let offset = match direction {
                        Direction::Minimize => -0.5,
                        Direction::Maximize => 0.5,
                    };
                    LpSolution::optimal(self.value + offset, Vec::new())
                }
                status => LpSolution::empty(status),
            }
        }
    }

    #[test]
    fn test_infeasible_short_circuits() {
        let (registry, graph) = patriarchs();
        let system = compile(&registry, &graph);
        let oracle = CountingOracle::new(LpStatus::Infeasible, 0.0);
        let solver = BoundSolver::new(&system, &oracle, SolverConfig::default()).unwrap();

        let err = solver.solve_all().unwrap_err();
        assert_eq!(
            err,
            LineageError::InfeasibleSystem {
                target: "abraham".into()
            }
        );
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_two_queries_per_individual() {
        let (registry, graph) = patriarchs();
        let system = compile(&registry, &graph);
        let oracle = CountingOracle::new(LpStatus::Optimal, 1000.0);
        let solver = BoundSolver::new(&system, &oracle, SolverConfig::default()).unwrap();

        let ranges = solver.solve_all().unwrap();
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 2 * system.variable_count());
        // 999.5 rounds down, 1000.5 rounds up.
        assert!(ranges.values().all(|r| *r == BirthRange::finite(999, 1001)));
    }

    #[test]
    fn test_oracle_failure() {
        let (registry, graph) = patriarchs();
        let system = compile(&registry, &graph);
        let oracle = CountingOracle::new(LpStatus::IterationLimit, 0.0);
        let solver = BoundSolver::new(&system, oracle, SolverConfig::default()).unwrap();

        assert!(matches!(
            solver.solve_individual("isaac"),
            Err(LineageError::Solver {
                status: LpStatus::IterationLimit,
                ..
            })
        ));
    }

    #[test]
    fn test_empty_system() {
        let system = compile(&Registry::new(), &RelationshipGraph::new());
        assert!(simplex(&system).solve_all().unwrap().is_empty());
    }
    /// Delegates to the simplex oracle, counting calls.
    #[derive(Default)]
    struct TallyOracle {
        inner: SimplexSolver,
        prepares: AtomicUsize,
        solves: AtomicUsize,
    }

    impl LpOracle for TallyOracle {
        fn solve(
            &self,
            model: &LpModel,
            direction: Direction,
            objective: usize,
            config: &SolverConfig,
        ) -> LpSolution {
            self.solves.fetch_add(1, Ordering::SeqCst);
            self.inner.solve(model, direction, objective, config)
        }

        fn prepare<'a>(
            &'a self,
            model: &'a LpModel,
            config: &'a SolverConfig,
        ) -> std::result::Result<Box<dyn PreparedLp + 'a>, LpStatus> {
            self.prepares.fetch_add(1, Ordering::SeqCst);
            self.inner.prepare(model, config)
        }
    }

    #[test]
    fn test_solve_all_prepares_once() {
        let (registry, graph) = patriarchs();
        let system = compile(&registry, &graph);
        let oracle = TallyOracle::default();
        let ranges = BoundSolver::new(&system, &oracle, SolverConfig::default())
            .unwrap()
            .solve_all()
            .unwrap();

        assert_eq!(oracle.prepares.load(Ordering::SeqCst), 1);
        assert_eq!(oracle.solves.load(Ordering::SeqCst), 0);
        assert_eq!(ranges["isaac"], BirthRange::finite(1730, 1785));
        assert_eq!(ranges, simplex(&system).solve_all().unwrap());
    }

    #[test]
    fn test_prepare_failure_is_infeasible() {
        let mut registry = Registry::new();
        registry.add(Individual::female("mother").with_known_birth_year(500)).unwrap();
        registry.add(Individual::male("son").with_known_birth_year(560)).unwrap();
        let mut graph = RelationshipGraph::new();
        graph.add_mother("son", "mother").unwrap();
        let system = compile(&registry, &graph);
        let oracle = TallyOracle::default();
        let solver = BoundSolver::new(&system, &oracle, SolverConfig::default()).unwrap();

        assert_eq!(
            solver.solve_all().unwrap_err(),
            LineageError::InfeasibleSystem {
                target: "mother".into()
            }
        );
        assert_eq!(oracle.solves.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_wide_chain_matches_longest_paths() {
        // A 60-generation male line with the first and last years known:
        // each generation is pinned between its distance to both ends.
        let n = 60i64;
        let mut registry = Registry::new();
        let mut graph = RelationshipGraph::new();
        for g in 0..n {
            let mut ind = Individual::male(format!("g{g:02}"));
            if g == 0 {
                ind = ind.with_known_birth_year(0);
            }
            if g == n - 1 {
                ind = ind.with_known_birth_year(40 * (n - 1));
            }
            registry.add(ind).unwrap();
            if g > 0 {
                graph.add_father(format!("g{g:02}"), format!("g{:02}", g - 1)).unwrap();
            }
        }
        let system = compile(&registry, &graph);
        let ranges = simplex(&system).solve_all().unwrap();

        let last = 40 * (n - 1);
        for g in 0..n {
            let lo = (15 * g).max(last - 70 * (n - 1 - g));
            let hi = (70 * g).min(last - 15 * (n - 1 - g));
            assert_eq!(ranges[&format!("g{g:02}")], BirthRange::finite(lo, hi), "g{g}");
        }
    }
}
