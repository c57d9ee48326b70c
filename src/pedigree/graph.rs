//! Child → parent relationship graph.

use super::types::{Gender, Relationship};
use crate::error::ConfigurationError;
use std::collections::{BTreeMap, HashSet};

/// Directed child → parent edges, at most one father and one mother
/// per child.
///
/// The graph checks only its own structural invariant (one parent of
/// each gender). Whether the ids exist and whether the recorded gender
/// matches the registry is checked when the constraint system is
/// compiled.
#[derive(Debug, Clone, Default)]
pub struct RelationshipGraph {
    fathers: BTreeMap<String, String>,
    mothers: BTreeMap<String, String>,
}

impl RelationshipGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an edge. Fails if the child already has a parent of the
    /// same gender.
    pub fn add(&mut self, relationship: Relationship) -> Result<(), ConfigurationError> {
        let Relationship {
            child,
            parent,
            parent_gender,
        } = relationship;
        let parents = self.parents_mut(parent_gender);
        if let Some(existing) = parents.get(&child) {
            return Err(ConfigurationError::DuplicateParent {
                child,
                gender: parent_gender,
                existing: existing.clone(),
                parent,
            });
        }
        parents.insert(child, parent);
        Ok(())
    }

    /// Convenience: add a father edge.
    pub fn add_father(
        &mut self,
        child: impl Into<String>,
        father: impl Into<String>,
    ) -> Result<(), ConfigurationError> {
        self.add(Relationship::father(child, father))
    }

    /// Convenience: add a mother edge.
    pub fn add_mother(
        &mut self,
        child: impl Into<String>,
        mother: impl Into<String>,
    ) -> Result<(), ConfigurationError> {
        self.add(Relationship::mother(child, mother))
    }

    /// The child's father, if recorded.
    pub fn father_of(&self, child: &str) -> Option<&str> {
        self.fathers.get(child).map(String::as_str)
    }

    /// The child's mother, if recorded.
    pub fn mother_of(&self, child: &str) -> Option<&str> {
        self.mothers.get(child).map(String::as_str)
    }

    /// The child's parent of the given gender.
    pub fn parent_of(&self, child: &str, gender: Gender) -> Option<&str> {
        match gender {
            Gender::Male => self.father_of(child),
            Gender::Female => self.mother_of(child),
        }
    }

    /// All edges: father edges first, then mother edges, each ordered by
    /// child id.
    pub fn relationships(&self) -> impl Iterator<Item = Relationship> + '_ {
        let fathers = self
            .fathers
            .iter()
            .map(|(c, p)| Relationship::new(c.as_str(), p.as_str(), Gender::Male));
        let mothers = self
            .mothers
            .iter()
            .map(|(c, p)| Relationship::new(c.as_str(), p.as_str(), Gender::Female));
        fathers.chain(mothers)
    }

    /// Same-gender line above `child`: parent, grandparent, and so on.
    ///
    /// Walking stops at the first repeated id, so a cyclic input yields
    /// a finite line.
    pub fn ancestors(&self, child: &str, gender: Gender) -> Vec<&str> {
        let mut line = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(child);
        let mut current = child;
        while let Some(parent) = self.parent_of(current, gender) {
            if !seen.insert(parent) {
                break;
            }
            line.push(parent);
            current = parent;
        }
        line
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.fathers.len() + self.mothers.len()
    }

    /// Whether the graph has no edges.
    pub fn is_empty(&self) -> bool {
        self.fathers.is_empty() && self.mothers.is_empty()
    }

    fn parents_mut(&mut self, gender: Gender) -> &mut BTreeMap<String, String> {
        match gender {
            Gender::Male => &mut self.fathers,
            Gender::Female => &mut self.mothers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_parents() {
        let mut graph = RelationshipGraph::new();
        graph.add_father("isaac", "abraham").unwrap();
        graph.add_mother("isaac", "sarah").unwrap();

        assert_eq!(graph.father_of("isaac"), Some("abraham"));
        assert_eq!(graph.mother_of("isaac"), Some("sarah"));
        assert_eq!(graph.parent_of("isaac", Gender::Female), Some("sarah"));
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_duplicate_father_rejected() {
        let mut graph = RelationshipGraph::new();
        graph.add_father("isaac", "abraham").unwrap();
        let err = graph.add_father("isaac", "terah").unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::DuplicateParent {
                child: "isaac".into(),
                gender: Gender::Male,
                existing: "abraham".into(),
                parent: "terah".into(),
            }
        );
        assert_eq!(graph.father_of("isaac"), Some("abraham"));
    }

    #[test]
    fn test_relationships_order() {
        let mut graph = RelationshipGraph::new();
        graph.add_mother("b", "m").unwrap();
        graph.add_father("b", "f").unwrap();
        graph.add_father("a", "f").unwrap();

        let edges: Vec<Relationship> = graph.relationships().collect();
        assert_eq!(
            edges,
            vec![
                Relationship::father("a", "f"),
                Relationship::father("b", "f"),
                Relationship::mother("b", "m"),
            ]
        );
    }

    #[test]
    fn test_ancestors_line() {
        let mut graph = RelationshipGraph::new();
        graph.add_father("jacob", "isaac").unwrap();
        graph.add_father("isaac", "abraham").unwrap();
        graph.add_mother("isaac", "sarah").unwrap();
        graph.add_father("abraham", "terah").unwrap();

        assert_eq!(
            graph.ancestors("jacob", Gender::Male),
            vec!["isaac", "abraham", "terah"]
        );
        assert!(graph.ancestors("jacob", Gender::Female).is_empty());
    }

    #[test]
    fn test_ancestors_cycle_terminates() {
        let mut graph = RelationshipGraph::new();
        graph.add_father("a", "b").unwrap();
        graph.add_father("b", "a").unwrap();

        assert_eq!(graph.ancestors("a", Gender::Male), vec!["b"]);
    }
}
