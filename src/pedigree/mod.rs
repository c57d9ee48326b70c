//! Genealogical input model.
//!
//! - **Registry**: [`Registry`]: declared individuals with gender and
//!   optional known birth year
//! - **Graph**: [`RelationshipGraph`]: child → parent edges, one father
//!   and one mother at most
//!
//! Both are built through the API; no textual data format is parsed here.

mod graph;
mod registry;
mod types;

pub use graph::RelationshipGraph;
pub use registry::Registry;
pub use types::{Gender, Individual, Relationship};
