//! Constraint compilation.
//!
//! Turns a [`Registry`](crate::pedigree::Registry) and
//! [`RelationshipGraph`](crate::pedigree::RelationshipGraph) into an
//! immutable [`ConstraintSystem`]: one birth-year variable per
//! individual, two age-gap inequalities per relationship, one equality
//! per known year.
//!
//! # Key Components
//!
//! - **Rules**: [`AgeRules`], [`LineageLimits`]: numeric age limits per
//!   parent gender
//! - **Compiler**: [`ConstraintCompiler`]: assembly and structural
//!   validation
//! - **System**: [`ConstraintSystem`]: read-only result shared by every
//!   bound query

mod compiler;
mod config;
mod system;

pub use compiler::{AuxiliaryConstraint, ConstraintCompiler};
pub use config::{AgeGapRule, AgeRules, CompilerConfig, LineageAverage, LineageLimits};
pub use system::ConstraintSystem;
