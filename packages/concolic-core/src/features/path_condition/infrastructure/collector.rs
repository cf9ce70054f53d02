//! Path condition collector
//!
//! Listens to the shadow VM and assembles the path condition of one run.

use crate::features::path_condition::domain::{
    BranchCondition, BranchKind, BranchOrigin, PathCondition,
};
use crate::features::path_condition::ports::InstructionObserver;
use crate::features::symbolic::Constraint;
use tracing::{debug, trace};

#[derive(Debug, Default)]
pub struct PathConditionCollector {
    branches: Vec<BranchCondition>,
    pending_supporting: Vec<Constraint>,
    finished: bool,
}

impl PathConditionCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Path condition collected so far.
    ///
    /// Supporting constraints seen after the last decision belong to no branch
    /// and are discarded.
    pub fn into_path_condition(self) -> PathCondition {
        if !self.pending_supporting.is_empty() {
            trace!(
                dropped = self.pending_supporting.len(),
                "supporting constraints after last branch discarded"
            );
        }
        PathCondition::new(self.branches)
    }
}

impl InstructionObserver for PathConditionCollector {
    fn on_supporting_constraint(&mut self, constraint: Constraint) {
        self.pending_supporting.push(constraint);
    }

    fn on_branch(&mut self, origin: BranchOrigin, kind: BranchKind, decision: Constraint) {
        trace!("branch observed at {} [{}]", origin, decision);
        let supporting = std::mem::take(&mut self.pending_supporting);
        self.branches
            .push(BranchCondition::new(origin, decision, supporting, kind));
    }

    fn on_execution_finished(&mut self) {
        self.finished = true;
        debug!(branches = self.branches.len(), "path condition collected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::symbolic::Expression;

    #[test]
    fn test_supporting_constraints_attach_to_next_branch() {
        let x = Expression::int_var("x", 4);
        let mut collector = PathConditionCollector::new();
        collector.on_supporting_constraint(Constraint::ge(x.clone(), Expression::int(0)));
        collector.on_supporting_constraint(Constraint::le(x.clone(), Expression::int(100)));
        collector.on_branch(
            BranchOrigin::new("A", "m", 3),
            BranchKind::If {
                is_true_branch: false,
            },
            Constraint::neq(x.clone(), Expression::int(5)),
        );
        collector.on_branch(
            BranchOrigin::new("A", "m", 8),
            BranchKind::If {
                is_true_branch: true,
            },
            Constraint::lt(x, Expression::int(10)),
        );
        collector.on_execution_finished();
        assert!(collector.is_finished());

        let pc = collector.into_path_condition();
        assert_eq!(pc.size(), 2);
        assert_eq!(pc.get(0).unwrap().supporting().len(), 2);
        assert!(pc.get(1).unwrap().supporting().is_empty());
        assert_eq!(pc.constraints().len(), 4);
    }

    #[test]
    fn test_trailing_supporting_constraints_dropped() {
        let mut collector = PathConditionCollector::new();
        collector.on_supporting_constraint(Constraint::eq(
            Expression::int_var("y", 1),
            Expression::int(1),
        ));
        let pc = collector.into_path_condition();
        assert!(pc.is_empty());
    }
}
