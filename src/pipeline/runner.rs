//! End-to-end estimation run.
//!
//! [`LineageEstimator`] chains the stages:
//! compile → solve bounds → estimate.

use super::config::LineageConfig;
use crate::bounds::{BirthRange, BoundSolver};
use crate::constraint::{AuxiliaryConstraint, ConstraintCompiler};
use crate::error::{ConfigurationError, Result};
use crate::estimate::QuantileEstimator;
use crate::lp::LpOracle;
use crate::pedigree::{Registry, RelationshipGraph};
use std::collections::BTreeMap;
use tracing::info;

/// Result for one individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BirthEstimate {
    /// Finite range with a point estimate.
    Estimated {
        earliest: i64,
        latest: i64,
        estimate: i64,
    },
    /// Range open on at least one side; no point estimate.
    Unbounded { range: BirthRange },
}

impl BirthEstimate {
    /// The feasible range.
    pub fn range(&self) -> BirthRange {
        match *self {
            BirthEstimate::Estimated {
                earliest, latest, ..
            } => BirthRange::finite(earliest, latest),
            BirthEstimate::Unbounded { range } => range,
        }
    }

    /// The point estimate, if the range is finite.
    pub fn estimate(&self) -> Option<i64> {
        match *self {
            BirthEstimate::Estimated { estimate, .. } => Some(estimate),
            BirthEstimate::Unbounded { .. } => None,
        }
    }
}

/// Per-individual results of a run, ordered by id.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EstimationReport {
    results: BTreeMap<String, BirthEstimate>,
}

impl EstimationReport {
    /// Result for `id`, if it was estimated.
    pub fn get(&self, id: &str) -> Option<&BirthEstimate> {
        self.results.get(id)
    }

    /// Results in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BirthEstimate)> {
        self.results.iter().map(|(id, e)| (id.as_str(), e))
    }

    /// Number of individuals reported.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the report is empty.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Individuals with a point estimate.
    pub fn estimated_count(&self) -> usize {
        self.results.values().filter(|e| e.estimate().is_some()).count()
    }

    /// Individuals whose range is open on some side.
    pub fn unbounded_count(&self) -> usize {
        self.len() - self.estimated_count()
    }
}

/// Runs the full estimation for a registry and graph.
///
/// # Usage
///
/// ```
/// use u_lineage::lp::SimplexSolver;
/// use u_lineage::pedigree::{Individual, Registry, RelationshipGraph};
/// use u_lineage::pipeline::{BirthEstimate, LineageConfig, LineageEstimator};
///
/// let mut registry = Registry::new();
/// registry.add(Individual::male("abraham").with_known_birth_year(1900)).unwrap();
/// registry.add(Individual::male("isaac")).unwrap();
/// registry.add(Individual::male("eliezer")).unwrap();
/// let mut graph = RelationshipGraph::new();
/// graph.add_father("isaac", "abraham").unwrap();
///
/// let estimator = LineageEstimator::new(LineageConfig::default(), SimplexSolver::new()).unwrap();
/// let report = estimator.estimate_all(&registry, &graph).unwrap();
///
/// // [1915, 1970]: 1970 - floor(55 * 0.4) = 1948
/// assert_eq!(report.get("isaac").and_then(|e| e.estimate()), Some(1948));
/// assert!(matches!(report.get("eliezer"), Some(BirthEstimate::Unbounded { .. })));
/// ```
pub struct LineageEstimator<O: LpOracle> {
    config: LineageConfig,
    compiler: ConstraintCompiler,
    estimator: QuantileEstimator,
    oracle: O,
}

impl<O: LpOracle> LineageEstimator<O> {
    /// Creates an estimator after validating `config`.
    pub fn new(config: LineageConfig, oracle: O) -> std::result::Result<Self, ConfigurationError> {
        config.solver.validate()?;
        Ok(Self {
            compiler: ConstraintCompiler::new(config.compiler.clone())?,
            estimator: QuantileEstimator::new(config.quantile)?,
            config,
            oracle,
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &LineageConfig {
        &self.config
    }

    /// Estimates every individual in the registry.
    pub fn estimate_all(
        &self,
        registry: &Registry,
        graph: &RelationshipGraph,
    ) -> Result<EstimationReport> {
        self.estimate_all_with(registry, graph, &[])
    }

    /// Estimates every individual, with extra caller constraints.
    pub fn estimate_all_with(
        &self,
        registry: &Registry,
        graph: &RelationshipGraph,
        auxiliary: &[AuxiliaryConstraint],
    ) -> Result<EstimationReport> {
        let system = self.compiler.compile_with(registry, graph, auxiliary)?;
        let solver = BoundSolver::new(&system, &self.oracle, self.config.solver.clone())?;
        let ranges = solver.solve_all()?;

        let results = ranges
            .into_iter()
            .map(|(id, range)| self.classify(&id, range).map(|e| (id, e)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        let report = EstimationReport { results };

        info!(
            individuals = report.len(),
            estimated = report.estimated_count(),
            unbounded = report.unbounded_count(),
            "estimation finished"
        );
        Ok(report)
    }

    /// Estimates a single individual.
    pub fn estimate_target(
        &self,
        registry: &Registry,
        graph: &RelationshipGraph,
        target: &str,
    ) -> Result<BirthEstimate> {
        registry.require(target)?;
        let system = self.compiler.compile(registry, graph)?;
        let solver = BoundSolver::new(&system, &self.oracle, self.config.solver.clone())?;
        let range = solver.solve_individual(target)?;
        let estimate = self.classify(target, range)?;
        info!(id = target, %range, estimate = ?estimate.estimate(), "target estimated");
        Ok(estimate)
    }

    fn classify(&self, id: &str, range: BirthRange) -> Result<BirthEstimate> {
        match range.as_finite() {
            Some((earliest, latest)) => Ok(BirthEstimate::Estimated {
                earliest,
                latest,
                estimate: self.estimator.estimate(id, &range)?,
            }),
            None => Ok(BirthEstimate::Unbounded { range }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
