//! DSE test generator
//!
//! One local-search step: execute a test concolically, then negate its
//! branches in order until a negation yields a test that improves the
//! search objective.

use super::driver::{NegationOutcome, NewTest};
use crate::errors::Result;
use crate::features::concolic::ports::{
    ConcolicExecutor, CoverageOracle, LocalSearchObjective, TestCase,
};
use crate::features::divergence::{check_divergence, DivergenceReport};
use crate::features::path_condition::PathCondition;
use crate::features::symbolic::Constraint;
use crate::session::DseSession;
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, info};

/// A test accepted by the objective
#[derive(Debug, Clone)]
pub struct GeneratedTest<T> {
    pub test: T,
    /// Branch of the original path that was negated
    pub target_index: usize,
    /// Re-execution compared with the expected path
    pub divergence: DivergenceReport,
    /// The re-execution took a path not seen before in this generator
    pub new_path: bool,
}

pub struct DseTestGenerator<'s, E, C> {
    session: &'s DseSession,
    executor: E,
    coverage: C,
    explored: FxHashSet<[u8; 32]>,
}

impl<'s, E, C> DseTestGenerator<'s, E, C>
where
    C: CoverageOracle,
{
    pub fn new(session: &'s DseSession, executor: E, coverage: C) -> Self {
        Self {
            session,
            executor,
            coverage,
            explored: FxHashSet::default(),
        }
    }

    /// Distinct paths observed so far
    pub fn explored_paths(&self) -> usize {
        self.explored.len()
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Run `test` concolically and record its path; returns the path and
    /// whether it was new
    pub fn execute<T>(&mut self, test: &T) -> (PathCondition, bool)
    where
        E: ConcolicExecutor<T>,
    {
        let stats = self.session.statistics();
        let started = Instant::now();
        let path = self.executor.execute_concolic(test);
        stats.report_execution_time(started.elapsed());
        stats.report_path_condition_length(path.size());

        let is_new = self.explored.insert(path_digest(&path));
        (path, is_new)
    }

    /// Search for a test that improves `objective` by negating the branches
    /// of `test`'s path.
    ///
    /// Branches already covered both ways, or whose decision involves none
    /// of `symbolic_variables`, are skipped. An empty `symbolic_variables`
    /// makes every branch relevant. At most `max_negation_attempts` branches
    /// are negated.
    pub fn generate_new_test<T>(
        &mut self,
        test: &T,
        symbolic_variables: &BTreeSet<String>,
        objective: &mut dyn LocalSearchObjective<T>,
    ) -> Result<Option<GeneratedTest<T>>>
    where
        T: TestCase,
        E: ConcolicExecutor<T>,
    {
        let (path, _) = self.execute(test);
        if path.is_empty() {
            debug!("path condition is empty");
            return Ok(None);
        }
        debug!(length = path.size(), "path condition collected");

        let session = self.session;
        let budget = session.config().max_negation_attempts;
        let driver = session.driver();
        let mut attempts = 0;

        for (index, branch) in path.branches().enumerate() {
            if self.coverage.is_covered_two_ways(branch.origin()) {
                continue;
            }
            if !self.is_relevant(branch.decision(), symbolic_variables) {
                continue;
            }
            if attempts >= budget {
                debug!(attempts, "negation budget exhausted");
                break;
            }
            attempts += 1;

            let new = match driver.negate_condition(&path, index, test)? {
                NegationOutcome::NewTest(new) => new,
                other => {
                    debug!(index, outcome = %other, "no new test");
                    continue;
                }
            };
            let NewTest {
                test: new_test,
                expected_path,
                ..
            } = new;

            let (observed, new_path) = self.execute(&new_test);
            let divergence = check_divergence(&expected_path, &observed);
            session.statistics().report_path(divergence.diverged);
            if divergence.diverged {
                debug!(index, %divergence, "re-execution diverged");
            }

            if objective.has_improved(&new_test) {
                session.statistics().report_useful_test();
                info!(index, new_path, "new test improved the objective");
                return Ok(Some(GeneratedTest {
                    test: new_test,
                    target_index: index,
                    divergence,
                    new_path,
                }));
            }
            session.statistics().report_unuseful_test();
            debug!(index, "new test did not improve the objective");
        }
        Ok(None)
    }

    fn is_relevant(&self, decision: &Constraint, symbolic_variables: &BTreeSet<String>) -> bool {
        if symbolic_variables.is_empty() {
            return true;
        }
        let config = self.session.config();
        decision
            .variables()
            .iter()
            .any(|name| symbolic_variables.contains(config.strip_symbolic_suffix(name)))
    }
}

fn path_digest(path: &PathCondition) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    for fingerprint in path.normalized() {
        hasher.update(&fingerprint);
    }
    *hasher.finalize().as_bytes()
}
