//! Search-side ports consumed by the test generator

use crate::features::path_condition::{BranchOrigin, PathCondition};

/// Runs a test under the shadow VM and returns its path condition
pub trait ConcolicExecutor<T> {
    fn execute_concolic(&mut self, test: &T) -> PathCondition;
}

/// Fitness of the enclosing search
pub trait LocalSearchObjective<T> {
    /// Whether `test` improves on the best test seen so far
    fn has_improved(&mut self, test: &T) -> bool;
}

/// Branch coverage known to the enclosing search
pub trait CoverageOracle {
    /// Both outcomes of the branch at `origin` are already covered
    fn is_covered_two_ways(&self, origin: &BranchOrigin) -> bool;
}

/// No branch is considered covered
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCoverage;

impl CoverageOracle for NoCoverage {
    fn is_covered_two_ways(&self, _origin: &BranchOrigin) -> bool {
        false
    }
}
