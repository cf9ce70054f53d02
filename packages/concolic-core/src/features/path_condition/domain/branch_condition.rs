//! Branch Condition Domain Model
//!
//! One branch decision taken during the concrete run, together with the
//! supporting constraints collected since the previous decision.

use crate::features::symbolic::Constraint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Where a branch was taken: `(class_name, method_name, instruction_index)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchOrigin {
    pub class_name: Arc<str>,
    pub method_name: Arc<str>,
    pub instruction_index: u32,
}

impl BranchOrigin {
    pub fn new(class_name: &str, method_name: &str, instruction_index: u32) -> Self {
        Self {
            class_name: Arc::from(class_name),
            method_name: Arc::from(method_name),
            instruction_index,
        }
    }
}

impl fmt::Display for BranchOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}:{}",
            self.class_name, self.method_name, self.instruction_index
        )
    }
}

/// Kind of branching instruction that produced the decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BranchKind {
    /// Conditional jump
    If { is_true_branch: bool },
    /// Table or lookup switch
    Switch { is_default_goal: bool, goal_value: i64 },
    /// Implicit bounds check of an array access
    ArrayAccess { is_error_branch: bool },
}

impl BranchKind {
    /// Kind describing the opposite decision.
    ///
    /// Switch goals are kept: the negated decision only excludes the goal.
    pub fn negated(self) -> Self {
        match self {
            Self::If { is_true_branch } => Self::If {
                is_true_branch: !is_true_branch,
            },
            Self::Switch { .. } => self,
            Self::ArrayAccess { is_error_branch } => Self::ArrayAccess {
                is_error_branch: !is_error_branch,
            },
        }
    }
}

/// A branch decision. Immutable; equality is by identity.
#[derive(Debug, Clone)]
pub struct BranchCondition {
    origin: BranchOrigin,
    decision: Constraint,
    supporting: Arc<[Constraint]>,
    kind: BranchKind,
}

impl BranchCondition {
    pub fn new(
        origin: BranchOrigin,
        decision: Constraint,
        supporting: Vec<Constraint>,
        kind: BranchKind,
    ) -> Self {
        Self {
            origin,
            decision,
            supporting: supporting.into(),
            kind,
        }
    }

    pub fn origin(&self) -> &BranchOrigin {
        &self.origin
    }

    pub fn class_name(&self) -> &str {
        &self.origin.class_name
    }

    pub fn method_name(&self) -> &str {
        &self.origin.method_name
    }

    pub fn instruction_index(&self) -> u32 {
        self.origin.instruction_index
    }

    /// Constraint satisfied by the run at this branch
    pub fn decision(&self) -> &Constraint {
        &self.decision
    }

    /// Constraints collected since the previous decision
    pub fn supporting(&self) -> &[Constraint] {
        &self.supporting
    }

    pub fn kind(&self) -> BranchKind {
        self.kind
    }

    /// Same origin and supporting constraints, negated decision
    pub fn negate(&self) -> Self {
        Self {
            origin: self.origin.clone(),
            decision: self.decision.negate(),
            supporting: Arc::clone(&self.supporting),
            kind: self.kind.negated(),
        }
    }

    /// Whether two branches denote the same decision point with the same
    /// comparator. Used by the divergence checker.
    pub fn same_decision_point(&self, other: &BranchCondition) -> bool {
        self.origin == other.origin
            && self.decision.comparator() == other.decision.comparator()
    }
}

impl PartialEq for BranchCondition {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for BranchCondition {}

impl fmt::Display for BranchCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.origin, self.decision)
    }
}
