//! Instruction observer port
//!
//! The shadow VM reports, in execution order, the constraints it derives from
//! the instructions it interprets. Constraints that are not branch decisions
//! (e.g. implicit range facts of a cast) arrive as supporting constraints and
//! are attached to the next decision.

use crate::features::path_condition::domain::{BranchKind, BranchOrigin};
use crate::features::symbolic::Constraint;

pub trait InstructionObserver {
    /// A constraint that holds on the current path but is not a decision
    fn on_supporting_constraint(&mut self, constraint: Constraint);

    /// A branch decision; `decision` is the constraint the run satisfied
    fn on_branch(&mut self, origin: BranchOrigin, kind: BranchKind, decision: Constraint);

    /// Execution of the test finished (normally or exceptionally)
    fn on_execution_finished(&mut self) {}
}
