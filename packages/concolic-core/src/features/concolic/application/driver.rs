//! Concolic Mutation Driver
//!
//! Flips one branch of an observed path and turns the solver's model into a
//! new concrete test.
//!
//! ## Pipeline
//!
//! ```text
//! path condition ─▶ negate(i) ─▶ solvability check ─▶ query
//!      ─▶ cone of influence ─▶ size guard ─▶ solver cache
//!      ─▶ model check ─▶ patched clone of the test
//! ```
//!
//! Every step is synchronous. The only shared mutable state is the session's
//! solver cache, so many negations may run in parallel.

use super::super::ports::TestCase;
use crate::errors::Result;
use crate::features::path_condition::PathCondition;
use crate::features::reduction::reduce;
use crate::features::solver::{Model, ModelValue, SolverQuery, SolverResult};
use crate::features::symbolic::{Bindings, ConcreteValue, Constraint, Evaluator, VarName};
use crate::session::DseSession;
use std::fmt;
use tracing::{debug, trace, warn};

/// A test produced by a successful negation
#[derive(Debug, Clone)]
pub struct NewTest<T> {
    pub test: T,
    /// Model the test was patched with (symbolic names)
    pub model: Model,
    /// Path the new test is expected to follow: the original prefix
    /// followed by the negated branch
    pub expected_path: PathCondition,
    pub target_index: usize,
    /// Statements that received a model value
    pub patched_statements: usize,
    pub cache_hit: bool,
}

/// Result of one `negate_condition` call
#[derive(Debug, Clone)]
pub enum NegationOutcome<T> {
    NewTest(NewTest<T>),
    /// The negated decision failed the solvability pre-check; the solver
    /// was not called
    Unsolvable,
    /// The reduced query exceeded the size limit; the solver was not called
    TooLong { size: usize },
    Unsat,
    Timeout,
    /// The solver claimed SAT but its model violates the query
    ModelRejected,
}

impl<T> NegationOutcome<T> {
    pub fn is_new_test(&self) -> bool {
        matches!(self, Self::NewTest(_))
    }

    pub fn new_test(&self) -> Option<&NewTest<T>> {
        match self {
            Self::NewTest(new) => Some(new),
            _ => None,
        }
    }

    /// Drop the diagnostics and keep only the patched test
    pub fn into_test(self) -> Option<T> {
        match self {
            Self::NewTest(new) => Some(new.test),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewTest(_) => "new-test",
            Self::Unsolvable => "unsolvable",
            Self::TooLong { .. } => "too-long",
            Self::Unsat => "unsat",
            Self::Timeout => "timeout",
            Self::ModelRejected => "model-rejected",
        }
    }
}

impl<T> From<NegationOutcome<T>> for Option<T> {
    fn from(outcome: NegationOutcome<T>) -> Self {
        outcome.into_test()
    }
}

impl<T> fmt::Display for NegationOutcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong { size } => write!(f, "too-long ({} nodes)", size),
            other => f.write_str(other.as_str()),
        }
    }
}

pub struct ConcolicDriver<'s> {
    session: &'s DseSession,
}

impl<'s> ConcolicDriver<'s> {
    pub fn new(session: &'s DseSession) -> Self {
        Self { session }
    }

    /// Query for flipping branch `target_index`: supporting constraints of
    /// every branch up to and including the target, decisions strictly
    /// before it, then the negated target decision. Reduced to the cone of
    /// influence of the negated decision when enabled.
    ///
    /// # Panics
    ///
    /// If `target_index >= path_condition.size()`.
    pub fn build_query(&self, path_condition: &PathCondition, target_index: usize) -> SolverQuery {
        let constraints = path_condition.negate(target_index).constraints();
        if !self.session.config().use_cone_of_influence {
            return SolverQuery::new(constraints);
        }
        let reduction = reduce(&constraints);
        trace!(
            kept = reduction.constraints.len(),
            removed = reduction.removed(),
            "cone of influence"
        );
        SolverQuery::new(reduction.constraints)
    }

    /// Try to produce a test that takes the other side of branch
    /// `target_index`. The original test is never modified.
    ///
    /// Solver verdicts are outcomes; only backend failures are errors.
    ///
    /// # Panics
    ///
    /// If `target_index >= path_condition.size()`.
    pub fn negate_condition<T: TestCase>(
        &self,
        path_condition: &PathCondition,
        target_index: usize,
        test: &T,
    ) -> Result<NegationOutcome<T>> {
        let session = self.session;
        let stats = session.statistics();
        let config = session.config();

        let expected_path = path_condition.negate(target_index);
        let target = &expected_path[target_index];
        debug!(branch = %target, "negating branch {}", target_index);

        if !target.decision().is_solvable() {
            debug!(constraint = %target.decision(), "negated constraint is not solvable");
            stats.report_unsolvable();
            return Ok(NegationOutcome::Unsolvable);
        }

        let query = self.build_query(path_condition, target_index);
        let size = query.size();
        if size > config.max_constraint_size {
            debug!(size, limit = config.max_constraint_size, "query too long, skipping");
            stats.report_constraint_too_long();
            return Ok(NegationOutcome::TooLong { size });
        }

        stats.report_new_constraints(query.constraints());
        let solved = session
            .cache()
            .solve(session.solver(), &query, config.solver_timeout())?;
        stats.report_solving_time(solved.elapsed);
        debug!(
            verdict = solved.result.as_str(),
            cache_hit = solved.hit,
            constraints = query.len(),
            "solver returned"
        );

        let model = match solved.result {
            SolverResult::Unsat => {
                stats.report_unsat();
                return Ok(NegationOutcome::Unsat);
            }
            SolverResult::Timeout => {
                stats.report_timeout();
                return Ok(NegationOutcome::Timeout);
            }
            SolverResult::Sat(model) => model,
        };

        if config.verify_models && !model_satisfies(&model, query.constraints()) {
            stats.report_model_rejected();
            warn!(query = %query, "solver model does not satisfy the query");
            return Ok(NegationOutcome::ModelRejected);
        }
        stats.report_sat();

        let mut new_test = test.clone_test();
        let patched_statements = self.apply_model(&mut new_test, &model);
        debug!(patched_statements, "new test generated");

        Ok(NegationOutcome::NewTest(NewTest {
            test: new_test,
            model,
            expected_path,
            target_index,
            patched_statements,
            cache_hit: solved.hit,
        }))
    }

    /// Overwrite the statements named in `model`; returns how many changed
    fn apply_model<T: TestCase>(&self, test: &mut T, model: &Model) -> usize {
        let config = self.session.config();
        let mut patched = 0;
        for (name, value) in model {
            if value.is_null() {
                trace!(variable = %name, "null model value, statement left unchanged");
                continue;
            }
            let variable = config.strip_symbolic_suffix(name);
            let Some(statement) = test.find_primitive_statement_by_variable_name(variable) else {
                debug!(variable, "no primitive statement declares this variable");
                continue;
            };
            match statement.kind().narrow(value) {
                Some(narrowed) => {
                    trace!(variable, value = %narrowed, "patching statement");
                    statement.set_value(narrowed);
                    patched += 1;
                }
                None => warn!(
                    variable,
                    kind = ?statement.kind(),
                    value = %value,
                    "model value does not fit the statement"
                ),
            }
        }
        patched
    }

    /// Negate several branches of the same path on the session's worker pool.
    ///
    /// Results are returned in the order of `targets`.
    #[cfg(feature = "parallel")]
    pub fn negate_many<T>(
        &self,
        path_condition: &PathCondition,
        targets: &[usize],
        test: &T,
    ) -> Vec<(usize, Result<NegationOutcome<T>>)>
    where
        T: TestCase + Send + Sync,
    {
        use rayon::prelude::*;

        self.session.pool().install(|| {
            targets
                .par_iter()
                .map(|&index| (index, self.negate_condition(path_condition, index, test)))
                .collect()
        })
    }

    /// Sequential `negate_many` for builds without the `parallel` feature
    #[cfg(not(feature = "parallel"))]
    pub fn negate_many<T>(
        &self,
        path_condition: &PathCondition,
        targets: &[usize],
        test: &T,
    ) -> Vec<(usize, Result<NegationOutcome<T>>)>
    where
        T: TestCase,
    {
        targets
            .iter()
            .map(|&index| (index, self.negate_condition(path_condition, index, test)))
            .collect()
    }
}

fn to_concrete(value: &ModelValue) -> Option<ConcreteValue> {
    match value {
        ModelValue::Long(v) => Some(ConcreteValue::Integer(*v)),
        ModelValue::Double(v) => Some(ConcreteValue::Real(*v)),
        ModelValue::String(s) => Some(ConcreteValue::string(s.as_str())),
        ModelValue::Null => None,
    }
}

/// Whether the model satisfies every constraint; unbound variables keep
/// their concrete values
fn model_satisfies(model: &Model, constraints: &[Constraint]) -> bool {
    let bindings = Bindings::from_pairs(model.iter().filter_map(|(name, value)| {
        to_concrete(value).map(|v| (VarName::from(name.as_str()), v))
    }));
    Evaluator::new(&bindings).satisfies_all(constraints)
}
