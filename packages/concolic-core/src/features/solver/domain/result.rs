//! Solver query and result types

use crate::features::symbolic::{total_size, Constraint, VarName};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// A conjunction of constraints handed to a solver.
///
/// Order is irrelevant for equivalence (see the solver cache) but is kept as
/// produced by the reduction.
#[derive(Debug, Clone)]
pub struct SolverQuery {
    constraints: Arc<[Constraint]>,
}

impl SolverQuery {
    pub fn new(constraints: Vec<Constraint>) -> Self {
        Self {
            constraints: constraints.into(),
        }
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Total node count
    pub fn size(&self) -> usize {
        total_size(&self.constraints)
    }

    pub fn variables(&self) -> BTreeSet<VarName> {
        self.constraints
            .iter()
            .flat_map(|c| c.variables())
            .collect()
    }
}

impl fmt::Display for SolverQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.constraints.iter().enumerate() {
            if i > 0 {
                write!(f, " && ")?;
            }
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// Value assigned to a variable by a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelValue {
    /// Every integer-domain variable (boolean through long)
    Long(i64),
    /// float and double
    Double(f64),
    String(String),
    /// The solver left the variable unconstrained
    Null,
}

impl ModelValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for ModelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "\"{}\"", v),
            Self::Null => write!(f, "null"),
        }
    }
}

/// Variable assignment keyed by symbolic variable name
pub type Model = BTreeMap<String, ModelValue>;

/// Solver verdict
#[derive(Debug, Clone, PartialEq)]
pub enum SolverResult {
    /// Satisfiable, with a model
    Sat(Model),

    /// Unsatisfiable
    Unsat,

    /// The solver did not finish within its budget (inconclusive)
    Timeout,
}

impl SolverResult {
    pub fn is_sat(&self) -> bool {
        matches!(self, Self::Sat(_))
    }

    pub fn is_unsat(&self) -> bool {
        matches!(self, Self::Unsat)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    pub fn model(&self) -> Option<&Model> {
        match self {
            Self::Sat(model) => Some(model),
            _ => None,
        }
    }

    /// Definitive verdicts may be cached; timeouts may not
    pub fn is_conclusive(&self) -> bool {
        !self.is_timeout()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sat(_) => "SAT",
            Self::Unsat => "UNSAT",
            Self::Timeout => "TIMEOUT",
        }
    }
}

impl fmt::Display for SolverResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
