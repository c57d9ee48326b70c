//! Immutable constraint system.

use crate::lp::LpModel;
use std::collections::HashMap;

/// The linear system over birth-year variables, one per individual.
///
/// Built once by [`ConstraintCompiler`](super::ConstraintCompiler) and
/// never mutated afterwards. Every bound query borrows it, possibly from
/// several threads at once.
#[derive(Debug, Clone)]
pub struct ConstraintSystem {
    model: LpModel,
    index: HashMap<String, usize>,
    relationship_count: usize,
    known_count: usize,
}

impl ConstraintSystem {
    pub(crate) fn new(model: LpModel, relationship_count: usize, known_count: usize) -> Self {
        let index = model
            .variables
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            model,
            index,
            relationship_count,
            known_count,
        }
    }

    /// The underlying LP model.
    pub fn model(&self) -> &LpModel {
        &self.model
    }

    /// Variable index of an individual.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Individual ids in variable order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.model.variables.iter().map(String::as_str)
    }

    /// Number of variables (individuals).
    pub fn variable_count(&self) -> usize {
        self.model.variable_count()
    }

    /// Number of linear constraints, variable bounds excluded.
    pub fn constraint_count(&self) -> usize {
        self.model.constraint_count()
    }

    /// Number of relationship edges encoded.
    pub fn relationship_count(&self) -> usize {
        self.relationship_count
    }

    /// Number of known-year equalities encoded.
    pub fn known_count(&self) -> usize {
        self.known_count
    }
}
