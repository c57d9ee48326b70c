//! Individual and relationship types.

use std::fmt;

/// Gender of an individual. Selects the age-gap rule applied when the
/// individual appears as a parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Gender {
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => f.write_str("male"),
            Gender::Female => f.write_str("female"),
        }
    }
}

/// A person in the genealogical record.
///
/// The birth year is the decision variable of the estimation problem.
/// When the year is known it is fixed, in the same way a fixed
/// integer variable collapses its domain to a single value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Individual {
    /// Identifier (unique within a registry).
    pub id: String,
    /// Gender.
    pub gender: Gender,
    /// Known birth year, if any.
    pub known_birth_year: Option<i64>,
}

impl Individual {
    /// Creates an individual with unknown birth year.
    pub fn new(id: impl Into<String>, gender: Gender) -> Self {
        Self {
            id: id.into(),
            gender,
            known_birth_year: None,
        }
    }

    /// Creates a male individual.
    pub fn male(id: impl Into<String>) -> Self {
        Self::new(id, Gender::Male)
    }

    /// Creates a female individual.
    pub fn female(id: impl Into<String>) -> Self {
        Self::new(id, Gender::Female)
    }

    /// Fixes the birth year.
    pub fn with_known_birth_year(mut self, year: i64) -> Self {
        self.known_birth_year = Some(year);
        self
    }

    /// Whether the birth year is known.
    pub fn is_fixed(&self) -> bool {
        self.known_birth_year.is_some()
    }
}

/// A directed child → parent edge tagged with the parent's gender.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Relationship {
    /// The child.
    pub child: String,
    /// The parent.
    pub parent: String,
    /// Gender of the parent as recorded on the edge. Must agree with
    /// the parent's declared gender.
    pub parent_gender: Gender,
}

impl Relationship {
    /// Creates a relationship.
    pub fn new(child: impl Into<String>, parent: impl Into<String>, parent_gender: Gender) -> Self {
        Self {
            child: child.into(),
            parent: parent.into(),
            parent_gender,
        }
    }

    /// `child`'s father is `parent`.
    pub fn father(child: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::new(child, parent, Gender::Male)
    }

    /// `child`'s mother is `parent`.
    pub fn mother(child: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::new(child, parent, Gender::Female)
    }
}
