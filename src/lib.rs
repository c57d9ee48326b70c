//! Birth-year range estimation for genealogies.
//!
//! Given individuals with a gender and an optional known birth year, and
//! child → parent relationships, computes for every individual the
//! earliest and latest birth year consistent with parental age limits,
//! then derives a single point estimate from that range.
//!
//! - **Pedigree**: registry of individuals and the relationship graph.
//! - **Constraint**: compiles the pedigree into a linear system over
//!   birth-year variables, one pair of age-gap inequalities per edge.
//! - **LP**: model types, the [`lp::LpOracle`] contract and a dense
//!   simplex implementation.
//! - **Bounds**: per-individual minimize/maximize queries, rounded
//!   outward to whole years and run in parallel.
//! - **Estimate**: skewed-quantile point estimate within a range.
//! - **Pipeline**: end-to-end runs with one validated configuration.
//!
//! # Example
//!
//! ```
//! use u_lineage::lp::SimplexSolver;
//! use u_lineage::pedigree::{Individual, Registry, RelationshipGraph};
//! use u_lineage::pipeline::{LineageConfig, LineageEstimator};
//!
//! let mut registry = Registry::new();
//! registry.add(Individual::male("terah").with_known_birth_year(1700)).unwrap();
//! registry.add(Individual::male("abraham")).unwrap();
//! let mut graph = RelationshipGraph::new();
//! graph.add_father("abraham", "terah").unwrap();
//!
//! let estimator = LineageEstimator::new(LineageConfig::default(), SimplexSolver::new()).unwrap();
//! let report = estimator.estimate_all(&registry, &graph).unwrap();
//! let abraham = report.get("abraham").unwrap();
//! assert_eq!(abraham.range().as_finite(), Some((1715, 1770)));
//! assert_eq!(abraham.estimate(), Some(1748));
//! ```
//!
//! # Logging
//!
//! Progress is emitted through [`tracing`]; install any subscriber to
//! see compile summaries, per-run counts and infeasibility warnings.

pub mod bounds;
pub mod constraint;
pub mod error;
pub mod estimate;
pub mod lp;
pub mod pedigree;
pub mod pipeline;

pub use error::{ConfigurationError, LineageError, Result};
