//! Registry + graph → constraint system.

use super::config::CompilerConfig;
use super::system::ConstraintSystem;
use crate::error::{ConfigurationError, Result};
use crate::lp::{LinearConstraint, LpModel, Relation, VarBounds};
use crate::pedigree::{Gender, Registry, RelationshipGraph};
use std::collections::HashMap;
use tracing::{debug, info};

/// A caller-supplied linear constraint over individual ids, e.g.
/// `isaac - ishmael >= 14` for a known age difference between siblings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuxiliaryConstraint {
    /// (individual id, coefficient) pairs.
    pub terms: Vec<(String, f64)>,
    /// Relation.
    pub relation: Relation,
    /// Right-hand side.
    pub rhs: f64,
}

impl AuxiliaryConstraint {
    /// `sum(coef * birth(id)) <relation> rhs`.
    pub fn new(terms: Vec<(String, f64)>, relation: Relation, rhs: f64) -> Self {
        Self {
            terms,
            relation,
            rhs,
        }
    }

    /// `birth(a) - birth(b) <relation> rhs`.
    pub fn difference(
        a: impl Into<String>,
        b: impl Into<String>,
        relation: Relation,
        rhs: f64,
    ) -> Self {
        Self::new(vec![(a.into(), 1.0), (b.into(), -1.0)], relation, rhs)
    }
}

/// Translates a genealogical record into a [`ConstraintSystem`].
///
/// For each edge (child C, parent P of gender G):
///
/// ```text
/// birth(C) - birth(P) >= MinAge(G)
/// birth(C) - birth(P) <= MaxAge(G)
/// ```
///
/// and for each known year `birth(I) == year`. Structural errors fail
/// the compilation; contradictory data does not, it surfaces as an
/// infeasible system at solve time.
///
/// # Examples
///
/// ```
/// use u_lineage::constraint::{CompilerConfig, ConstraintCompiler};
/// use u_lineage::pedigree::{Individual, Registry, RelationshipGraph};
///
/// let mut registry = Registry::new();
/// registry.add(Individual::male("abraham").with_known_birth_year(1900)).unwrap();
/// registry.add(Individual::male("isaac")).unwrap();
/// let mut graph = RelationshipGraph::new();
/// graph.add_father("isaac", "abraham").unwrap();
///
/// let compiler = ConstraintCompiler::new(CompilerConfig::default()).unwrap();
/// let system = compiler.compile(&registry, &graph).unwrap();
/// assert_eq!(system.variable_count(), 2);
/// assert_eq!(system.constraint_count(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConstraintCompiler {
    config: CompilerConfig,
}

impl ConstraintCompiler {
    /// Creates a compiler after validating `config`.
    pub fn new(config: CompilerConfig) -> std::result::Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The validated configuration.
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compiles registry and graph.
    pub fn compile(&self, registry: &Registry, graph: &RelationshipGraph) -> Result<ConstraintSystem> {
        self.compile_with(registry, graph, &[])
    }

    /// Compiles registry and graph plus auxiliary constraints.
    pub fn compile_with(
        &self,
        registry: &Registry,
        graph: &RelationshipGraph,
        auxiliary: &[AuxiliaryConstraint],
    ) -> Result<ConstraintSystem> {
        let mut model = LpModel::new("birth-years");
        let bounds = match self.config.year_window {
            Some((lo, hi)) => VarBounds::between(lo as f64, hi as f64),
            None => VarBounds::free(),
        };
        let index: HashMap<&str, usize> = registry
            .iter()
            .map(|ind| (ind.id.as_str(), model.add_bounded_variable(ind.id.as_str(), bounds)))
            .collect();
        let lookup = |id: &str| {
            index
                .get(id)
                .copied()
                .ok_or_else(|| ConfigurationError::UnknownIndividual { id: id.to_string() })
        };

        // Age-gap rules.
        let mut relationship_count = 0;
        for rel in graph.relationships() {
            let child = lookup(rel.child.as_str())?;
            let parent = lookup(rel.parent.as_str())?;
            let declared = registry.require(&rel.parent)?.gender;
            if declared != rel.parent_gender {
                return Err(ConfigurationError::GenderMismatch {
                    child: rel.child,
                    parent: rel.parent,
                    declared,
                    recorded: rel.parent_gender,
                }
                .into());
            }
            let rule = self.config.rules.for_gender(rel.parent_gender);
            model.add_constraint(LinearConstraint::difference(
                child,
                parent,
                Relation::GreaterEq,
                rule.min_age as f64,
            ));
            model.add_constraint(LinearConstraint::difference(
                child,
                parent,
                Relation::LessEq,
                rule.max_age as f64,
            ));
            relationship_count += 1;
        }

        // Known birth years.
        let mut known_count = 0;
        for ind in registry.iter() {
            if let Some(year) = ind.known_birth_year {
                model.add_constraint(LinearConstraint::fix(lookup(ind.id.as_str())?, year as f64));
                known_count += 1;
            }
        }

        // Lineage averages along father and mother lines.
        if let Some(limits) = &self.config.lineage_limits {
            let before = model.constraint_count();
            for gender in [Gender::Male, Gender::Female] {
                let average = limits.for_gender(gender);
                for ind in registry.iter() {
                    let child = lookup(ind.id.as_str())?;
                    for (step, ancestor) in graph.ancestors(&ind.id, gender).into_iter().enumerate() {
                        if let Some(limit) = average.limit(step + 1) {
                            model.add_constraint(LinearConstraint::difference(
                                child,
                                lookup(ancestor)?,
                                Relation::LessEq,
                                limit as f64,
                            ));
                        }
                    }
                }
            }
            debug!(
                added = model.constraint_count() - before,
                "lineage average constraints"
            );
        }

        for aux in auxiliary {
            let terms = aux
                .terms
                .iter()
                .map(|(id, coef)| lookup(id.as_str()).map(|v| (v, *coef)))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            model.add_constraint(LinearConstraint::new(terms, aux.relation, aux.rhs));
        }

        info!(
            individuals = model.variable_count(),
            relationships = relationship_count,
            known_years = known_count,
            auxiliary = auxiliary.len(),
            constraints = model.constraint_count(),
            "constraint system compiled"
        );

        Ok(ConstraintSystem::new(model, relationship_count, known_count))
    }
}
