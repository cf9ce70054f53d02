//! Path condition domain models

pub mod branch_condition;
pub mod path_condition;

pub use branch_condition::{BranchCondition, BranchKind, BranchOrigin};
pub use path_condition::PathCondition;
