//! Individual registry.

use super::types::Individual;
use crate::error::ConfigurationError;
use std::collections::BTreeMap;

/// Every declared individual, keyed by id.
///
/// Iteration is ordered by id so that variable indices, and therefore
/// solver behaviour, are reproducible across runs.
///
/// # Examples
///
/// ```
/// use u_lineage::pedigree::{Individual, Registry};
///
/// let mut registry = Registry::new();
/// registry.add(Individual::male("abraham")).unwrap();
/// registry.add(Individual::female("sarah").with_known_birth_year(1900)).unwrap();
/// assert_eq!(registry.len(), 2);
/// assert!(registry.add(Individual::male("abraham")).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    individuals: BTreeMap<String, Individual>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from `individuals`, failing on the first
    /// duplicate id.
    pub fn from_individuals(
        individuals: impl IntoIterator<Item = Individual>,
    ) -> Result<Self, ConfigurationError> {
        let mut registry = Self::new();
        for individual in individuals {
            registry.add(individual)?;
        }
        Ok(registry)
    }

    /// Declares an individual.
    pub fn add(&mut self, individual: Individual) -> Result<(), ConfigurationError> {
        if self.individuals.contains_key(&individual.id) {
            return Err(ConfigurationError::DuplicateIndividual { id: individual.id });
        }
        self.individuals.insert(individual.id.clone(), individual);
        Ok(())
    }

    /// Looks up an individual.
    pub fn get(&self, id: &str) -> Option<&Individual> {
        self.individuals.get(id)
    }

    /// Looks up an individual, failing on unknown ids.
    pub fn require(&self, id: &str) -> Result<&Individual, ConfigurationError> {
        self.get(id)
            .ok_or_else(|| ConfigurationError::UnknownIndividual { id: id.to_string() })
    }

    /// Whether `id` is declared.
    pub fn contains(&self, id: &str) -> bool {
        self.individuals.contains_key(id)
    }

    /// Number of declared individuals.
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Individuals in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.values()
    }

    /// Ids in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.individuals.keys().map(String::as_str)
    }

    /// Number of individuals with a known birth year.
    pub fn known_count(&self) -> usize {
        self.iter().filter(|i| i.is_fixed()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let mut registry = Registry::new();
        registry.add(Individual::male("jacob")).unwrap();
        assert!(registry.contains("jacob"));
        assert_eq!(registry.get("jacob").unwrap().id, "jacob");
        assert!(registry.get("esau").is_none());
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = Registry::new();
        registry.add(Individual::male("jacob")).unwrap();
        let err = registry.add(Individual::female("jacob")).unwrap_err();
        assert_eq!(err, ConfigurationError::DuplicateIndividual { id: "jacob".into() });
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_require_unknown() {
        let registry = Registry::new();
        assert!(matches!(
            registry.require("nobody"),
            Err(ConfigurationError::UnknownIndividual { .. })
        ));
    }

    #[test]
    fn test_ids_sorted() {
        let registry = Registry::from_individuals([
            Individual::male("levi"),
            Individual::female("dinah"),
            Individual::male("asher").with_known_birth_year(50),
        ])
        .unwrap();

        let ids: Vec<&str> = registry.ids().collect();
        assert_eq!(ids, vec!["asher", "dinah", "levi"]);
        assert_eq!(registry.known_count(), 1);
    }

    #[test]
    fn test_from_individuals_rejects_duplicate() {
        let result = Registry::from_individuals([
            Individual::male("esau").with_known_birth_year(1),
            Individual::female("esau"),
        ]);
        assert_eq!(
            result.unwrap_err(),
            ConfigurationError::DuplicateIndividual { id: "esau".into() }
        );
    }
}
