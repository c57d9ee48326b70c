//! LP model definition.

use std::fmt;

/// Relation between the left-hand side and the right-hand side of a
/// linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relation {
    /// `lhs <= rhs`
    LessEq,
    /// `lhs >= rhs`
    GreaterEq,
    /// `lhs == rhs`
    Equal,
}

impl Relation {
    /// The relation obtained by multiplying both sides by -1.
    pub fn flipped(self) -> Self {
        match self {
            Relation::LessEq => Relation::GreaterEq,
            Relation::GreaterEq => Relation::LessEq,
            Relation::Equal => Relation::Equal,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relation::LessEq => "<=",
            Relation::GreaterEq => ">=",
            Relation::Equal => "==",
        })
    }
}

/// A linear constraint `sum(coef * x[var]) <relation> rhs`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearConstraint {
    /// (variable index, coefficient) pairs.
    pub terms: Vec<(usize, f64)>,
    /// Relation.
    pub relation: Relation,
    /// Right-hand side.
    pub rhs: f64,
}

impl LinearConstraint {
    /// Creates a constraint.
    pub fn new(terms: Vec<(usize, f64)>, relation: Relation, rhs: f64) -> Self {
        Self {
            terms,
            relation,
            rhs,
        }
    }

    /// `x[a] - x[b] <relation> rhs`.
    pub fn difference(a: usize, b: usize, relation: Relation, rhs: f64) -> Self {
        Self::new(vec![(a, 1.0), (b, -1.0)], relation, rhs)
    }

    /// `x[var] == value`.
    pub fn fix(var: usize, value: f64) -> Self {
        Self::new(vec![(var, 1.0)], Relation::Equal, value)
    }

    /// Evaluates the left-hand side at `x`.
    pub fn lhs(&self, x: &[f64]) -> f64 {
        self.terms.iter().map(|&(v, c)| c * x[v]).sum()
    }

    /// Whether `x` satisfies the constraint within `tol`.
    pub fn is_satisfied(&self, x: &[f64], tol: f64) -> bool {
        let lhs = self.lhs(x);
        match self.relation {
            Relation::LessEq => lhs <= self.rhs + tol,
            Relation::GreaterEq => lhs >= self.rhs - tol,
            Relation::Equal => (lhs - self.rhs).abs() <= tol,
        }
    }
}

/// Bounds of a single variable. `None` means unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarBounds {
    /// Lower bound.
    pub lower: Option<f64>,
    /// Upper bound.
    pub upper: Option<f64>,
}

impl VarBounds {
    /// A free variable.
    pub fn free() -> Self {
        Self::default()
    }

    /// A variable restricted to `[lower, upper]`.
    pub fn between(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }
}

/// A linear program over real variables: constraints and per-variable
/// bounds, without an objective.
///
/// The objective is supplied per solve call so one model can serve any
/// number of minimize/maximize queries.
///
/// # Examples
///
/// ```
/// use u_lineage::lp::{LinearConstraint, LpModel, Relation};
///
/// let mut model = LpModel::new("example");
/// let a = model.add_variable("a");
/// let b = model.add_variable("b");
/// model.add_constraint(LinearConstraint::difference(b, a, Relation::GreaterEq, 15.0));
/// model.add_constraint(LinearConstraint::fix(a, 1900.0));
/// assert!(model.validate().is_ok());
/// assert_eq!(model.variable_count(), 2);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LpModel {
    /// Model name.
    pub name: String,
    /// Variable names, by index.
    pub variables: Vec<String>,
    /// Variable bounds, parallel to `variables`.
    pub bounds: Vec<VarBounds>,
    /// Constraints.
    pub constraints: Vec<LinearConstraint>,
}

impl LpModel {
    /// Creates a new empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            bounds: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Adds a free variable and returns its index.
    pub fn add_variable(&mut self, name: impl Into<String>) -> usize {
        self.add_bounded_variable(name, VarBounds::free())
    }

    /// Adds a bounded variable and returns its index.
    pub fn add_bounded_variable(&mut self, name: impl Into<String>, bounds: VarBounds) -> usize {
        self.variables.push(name.into());
        self.bounds.push(bounds);
        self.variables.len() - 1
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    /// Validates the model for consistency.
    ///
    /// Checks that every referenced variable exists and that all
    /// numbers are finite.
    pub fn validate(&self) -> Result<(), String> {
        if self.bounds.len() != self.variables.len() {
            return Err("variables and bounds length mismatch".into());
        }
        for (i, b) in self.bounds.iter().enumerate() {
            let finite = b.lower.map_or(true, f64::is_finite) && b.upper.map_or(true, f64::is_finite);
            if !finite {
                return Err(format!("non-finite bound on {}", self.variables[i]));
            }
            if let (Some(lo), Some(hi)) = (b.lower, b.upper) {
                if lo > hi {
                    return Err(format!("empty bounds on {}: [{lo}, {hi}]", self.variables[i]));
                }
            }
        }
        for (k, c) in self.constraints.iter().enumerate() {
            if !c.rhs.is_finite() {
                return Err(format!("constraint {k}: non-finite rhs"));
            }
            for &(var, coef) in &c.terms {
                if var >= self.variables.len() {
                    return Err(format!("constraint {k}: undefined variable index {var}"));
                }
                if !coef.is_finite() {
                    return Err(format!("constraint {k}: non-finite coefficient"));
                }
            }
        }
        Ok(())
    }

    /// Returns the number of variables.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Whether `x` satisfies every constraint and bound within `tol`.
    pub fn is_feasible_point(&self, x: &[f64], tol: f64) -> bool {
        if x.len() != self.variables.len() {
            return false;
        }
        let in_bounds = self.bounds.iter().zip(x).all(|(b, &v)| {
            b.lower.map_or(true, |lo| v >= lo - tol) && b.upper.map_or(true, |hi| v <= hi + tol)
        });
        in_bounds && self.constraints.iter().all(|c| c.is_satisfied(x, tol))
    }
}
