//! End-to-end run configuration.

use crate::constraint::{AgeRules, CompilerConfig, LineageLimits};
use crate::error::ConfigurationError;
use crate::estimate::{QuantileEstimator, DEFAULT_QUANTILE};
use crate::lp::SolverConfig;

/// Configuration for a complete estimation run.
///
/// # Defaults
///
/// ```
/// use u_lineage::pipeline::LineageConfig;
///
/// let config = LineageConfig::default();
/// assert_eq!(config.compiler.rules.male.max_age, 70);
/// assert!((config.quantile - 0.4).abs() < 1e-12);
/// assert!(config.validate().is_ok());
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_lineage::constraint::{AgeGapRule, AgeRules};
/// use u_lineage::pipeline::LineageConfig;
///
/// let config = LineageConfig::default()
///     .with_rules(AgeRules {
///         male: AgeGapRule::new(16, 65),
///         female: AgeGapRule::new(16, 45),
///     })
///     .with_quantile(0.5)
///     .with_parallel(false);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LineageConfig {
    /// Constraint compilation settings.
    pub compiler: CompilerConfig,
    /// Oracle and driver settings.
    pub solver: SolverConfig,
    /// Quantile from the latest feasible year, in `[0, 1]`.
    pub quantile: f64,
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self {
            compiler: CompilerConfig::default(),
            solver: SolverConfig::default(),
            quantile: DEFAULT_QUANTILE,
        }
    }
}

impl LineageConfig {
    /// Sets both age-gap rules.
    pub fn with_rules(mut self, rules: AgeRules) -> Self {
        self.compiler.rules = rules;
        self
    }

    /// Enables lineage-average limits.
    pub fn with_lineage_limits(mut self, limits: LineageLimits) -> Self {
        self.compiler.lineage_limits = Some(limits);
        self
    }

    /// Bounds every birth year to `[lo, hi]`.
    pub fn with_year_window(mut self, lo: i64, hi: i64) -> Self {
        self.compiler.year_window = Some((lo, hi));
        self
    }

    /// Sets the estimator quantile.
    pub fn with_quantile(mut self, q: f64) -> Self {
        self.quantile = q;
        self
    }

    /// Replaces the solver settings.
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Enables or disables parallel bound solving.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.solver.parallel = parallel;
        self
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.compiler.validate()?;
        self.solver.validate()?;
        QuantileEstimator::new(self.quantile)?;
        Ok(())
    }
}
