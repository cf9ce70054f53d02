//! Solver backend port

use crate::features::solver::domain::{SolverOutcome, SolverQuery};
use crate::features::symbolic::Domain;
use std::time::Duration;

/// A satisfiability backend.
///
/// `solve` must return within roughly `budget`, surfacing an exhausted
/// budget as `SolverResult::Timeout`. Backends that cannot honour the budget
/// themselves are wrapped in a `DeadlineSolver`.
pub trait Solver: Send + Sync {
    /// Name of this solver
    fn name(&self) -> &'static str;

    /// Which domains does this solver support?
    fn supported_domains(&self) -> &[Domain];

    /// Can this solver handle every constraint of the query?
    fn can_solve(&self, query: &SolverQuery) -> bool {
        query
            .constraints()
            .iter()
            .all(|c| self.supported_domains().contains(&c.domain()))
    }

    fn solve(&self, query: &SolverQuery, budget: Duration) -> SolverOutcome;
}
