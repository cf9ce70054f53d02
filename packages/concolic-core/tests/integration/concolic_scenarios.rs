//! End-to-end concolic scenarios
//!
//! Scripted programs stand in for the shadow VM; the session's built-in
//! local-search solver answers the queries.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use concolic_core::{
    divergence_ratio, BranchOrigin, CoverageOracle, DseConfig, DseSession, DseTestGenerator,
    LocalSearchObjective, ModelValue, NegationOutcome, NoCoverage, PrimitiveValue, Preset,
};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

fn session() -> DseSession {
    DseSession::new(DseConfig::preset(Preset::Balanced).worker_threads(2)).unwrap()
}

// ============================================================================
// Path condition shapes
// ============================================================================

#[test]
fn equal_inputs_yield_single_branch() {
    let test = TestCaseBuilder::ints(&[179, 179]).build();
    let path = run(equal_inputs, &test);

    assert_eq!(path.size(), 1);
    assert_eq!(path[0].decision().to_string(), "var0__SYM == var1__SYM");
}

#[test]
fn three_guards_yield_three_branches() {
    let test = TestCaseBuilder::ints(&[1, 4, 16, 0]).build();
    let path = run(three_guards, &test);

    assert_eq!(path.size(), 3);
    assert!(path.branches().all(|b| b.decision().holds_concretely()));
}

#[test]
fn guards_and_loops_yield_fifty_seven_branches() {
    let test = TestCaseBuilder::ints(&[5, 16, 16, 22, 22]).build();
    let path = run(guards_and_loops, &test);

    assert_eq!(path.size(), 57);
}

// ============================================================================
// Negation
// ============================================================================

#[test]
fn negating_equal_inputs_separates_them() {
    let session = session();
    let test = TestCaseBuilder::ints(&[179, 179]).build();
    let path = run(equal_inputs, &test);

    let new_test = session
        .driver()
        .negate_condition(&path, 0, &test)
        .unwrap()
        .into_test()
        .unwrap();

    assert_ne!(new_test.int("var0"), new_test.int("var1"));
    assert_eq!(test.int("var0"), 179);
    assert_eq!(test.int("var1"), 179);
}

#[test]
fn boolean_flip_is_sat() {
    let session = session();
    let test = TestCaseBuilder::new().boolean("flag", true).build();
    let path = run(boolean_flag, &test);
    assert_eq!(path.size(), 1);

    let outcome = session.driver().negate_condition(&path, 0, &test).unwrap();
    let new = outcome.new_test().expect("negated boolean must be SAT");

    match new.model.get("flag__SYM") {
        Some(ModelValue::Long(v)) => assert!(*v <= 0, "model keeps flag true: {}", v),
        other => panic!("unexpected model entry {:?}", other),
    }
    assert_eq!(new.test.value("flag"), Some(&PrimitiveValue::Boolean(false)));
    assert_eq!(session.statistics().snapshot().sat, 1);
}

#[test]
fn first_two_decisions_of_long_path_are_sat() {
    let session = session();
    let test = TestCaseBuilder::ints(&[5, 16, 16, 22, 22]).build();
    let path = run(guards_and_loops, &test);

    for index in 0..2 {
        let query = session.driver().build_query(&path, index);
        assert!(query.len() <= index + 1, "query was not reduced: {}", query);

        let outcome = session.driver().negate_condition(&path, index, &test).unwrap();
        assert!(outcome.is_new_test(), "branch {}: {}", index, outcome);
    }
    let snapshot = session.statistics().snapshot();
    assert_eq!(snapshot.sat, 2);
    assert_eq!(snapshot.unsat + snapshot.timeouts, 0);
}

#[test]
fn negation_preserves_prefix() {
    let test = TestCaseBuilder::ints(&[5, 16, 16, 22, 22]).build();
    let path = run(guards_and_loops, &test);

    for index in [0, 1, 7, 30, 56] {
        assert_prefix_preserved(&path, &path.negate(index), index);
    }
}

#[test]
fn repeated_negation_hits_the_cache() {
    let session = session();
    let test = TestCaseBuilder::ints(&[1, 4, 16, 0]).build();
    let path = run(three_guards, &test);

    let first = session.driver().negate_condition(&path, 2, &test).unwrap();
    let second = session.driver().negate_condition(&path, 2, &test).unwrap();

    assert!(!first.new_test().unwrap().cache_hit);
    assert!(second.new_test().unwrap().cache_hit);
    assert_eq!(session.cache().len(), 1);
    assert!((session.cache().hit_rate() - 0.5).abs() < 1e-12);
}

#[test]
fn contradictory_prefix_is_not_a_new_test() {
    // Negating the second guard asks for var0 == 0 && var0 != 0
    fn contradiction(inputs: &SymbolicInputs, obs: &mut dyn concolic_core::InstructionObserver) {
        use concolic_core::{Constraint, Expression};
        decide(obs, "c", 1, Constraint::eq(inputs.get("var0"), Expression::int(0)));
        decide(obs, "c", 2, Constraint::eq(inputs.get("var0"), Expression::int(0)));
    }

    let config = DseConfig::preset(Preset::Fast)
        .max_search_iterations(2_000)
        .variable_resets(1);
    let session = DseSession::new(config).unwrap();
    let test = TestCaseBuilder::ints(&[0]).build();
    let path = run(contradiction, &test);

    let outcome = session.driver().negate_condition(&path, 1, &test).unwrap();
    assert!(
        matches!(outcome, NegationOutcome::Unsat | NegationOutcome::Timeout),
        "{}",
        outcome
    );
    assert_eq!(outcome.into_test(), None);
}

// ============================================================================
// Divergence round trip
// ============================================================================

#[test]
fn patched_test_follows_expected_prefix() {
    let session = session();
    let test = TestCaseBuilder::ints(&[1, 4, 16, 0]).build();
    let path = run(three_guards, &test);

    for index in 0..path.size() {
        let outcome = session.driver().negate_condition(&path, index, &test).unwrap();
        let new = outcome.new_test().unwrap();

        let observed = run(three_guards, &new.test);
        assert_non_divergent(&new.expected_path, &observed);
        assert_eq!(divergence_ratio(&new.expected_path, &observed), 1.0);
    }
}

#[test]
fn unpatched_test_diverges_from_negated_path() {
    let test = TestCaseBuilder::ints(&[1, 4, 16, 0]).build();
    let path = run(three_guards, &test);
    let expected = path.negate(1);

    let observed = run(three_guards, &test);
    assert!(concolic_core::is_divergent(&expected, &observed));
    assert_eq!(divergence_ratio(&expected, &observed), 0.5);
}

// ============================================================================
// Generator
// ============================================================================

/// Improves once `name` holds a non-zero int
struct NonZero(&'static str);

impl LocalSearchObjective<InMemoryTest> for NonZero {
    fn has_improved(&mut self, test: &InMemoryTest) -> bool {
        test.int(self.0) != 0
    }
}

struct Never;

impl LocalSearchObjective<InMemoryTest> for Never {
    fn has_improved(&mut self, _: &InMemoryTest) -> bool {
        false
    }
}

struct Covered(Vec<BranchOrigin>);

impl CoverageOracle for Covered {
    fn is_covered_two_ways(&self, origin: &BranchOrigin) -> bool {
        self.0.contains(origin)
    }
}

#[test]
fn generator_walks_branches_until_objective_improves() {
    let session = session();
    let test = TestCaseBuilder::ints(&[1, 4, 16, 0]).build();
    let mut generator =
        DseTestGenerator::new(&session, ScriptedExecutor::new(three_guards), NoCoverage);

    let generated = generator
        .generate_new_test(&test, &BTreeSet::new(), &mut NonZero("var3"))
        .unwrap()
        .expect("negating the last guard sets var3");

    assert_eq!(generated.target_index, 2);
    assert!(!generated.divergence.diverged);
    assert_ne!(generated.test.int("var3"), 0);

    let snapshot = session.statistics().snapshot();
    assert_eq!(snapshot.useful_tests, 1);
    assert_eq!(snapshot.unuseful_tests, 2);
    assert_eq!(snapshot.paths_explored, 3);
    assert_eq!(snapshot.path_condition_length.max, 3);
}

#[test]
fn generator_skips_irrelevant_and_covered_branches() {
    let session = session();
    let test = TestCaseBuilder::ints(&[1, 4, 16, 0]).build();

    let mut generator =
        DseTestGenerator::new(&session, ScriptedExecutor::new(three_guards), NoCoverage);
    let relevant: BTreeSet<String> = ["var3".to_string()].into_iter().collect();
    let generated = generator
        .generate_new_test(&test, &relevant, &mut NonZero("var3"))
        .unwrap()
        .unwrap();
    assert_eq!(generated.target_index, 2);
    assert_eq!(session.statistics().snapshot().unuseful_tests, 0);

    let path = run(three_guards, &test);
    let covered = Covered(vec![path[0].origin().clone(), path[1].origin().clone()]);
    let mut generator =
        DseTestGenerator::new(&session, ScriptedExecutor::new(three_guards), covered);
    let generated = generator
        .generate_new_test(&test, &BTreeSet::new(), &mut NonZero("var3"))
        .unwrap()
        .unwrap();
    assert_eq!(generated.target_index, 2);
    assert_eq!(session.statistics().snapshot().unuseful_tests, 0);
}

#[test]
fn generator_respects_negation_budget() {
    let session =
        DseSession::new(DseConfig::default().max_negation_attempts(1).worker_threads(1)).unwrap();
    let test = TestCaseBuilder::ints(&[1, 4, 16, 0]).build();
    let mut generator =
        DseTestGenerator::new(&session, ScriptedExecutor::new(three_guards), NoCoverage);

    let generated = generator
        .generate_new_test(&test, &BTreeSet::new(), &mut Never)
        .unwrap();

    assert!(generated.is_none());
    assert_eq!(session.statistics().snapshot().unuseful_tests, 1);
    // initial run + one re-execution
    assert_eq!(generator.executor().executions, 2);
}

#[test]
fn generator_returns_none_on_empty_path() {
    fn straight_line(_: &SymbolicInputs, _: &mut dyn concolic_core::InstructionObserver) {}

    let session = session();
    let test = TestCaseBuilder::ints(&[1]).build();
    let mut generator =
        DseTestGenerator::new(&session, ScriptedExecutor::new(straight_line), NoCoverage);

    assert!(generator
        .generate_new_test(&test, &BTreeSet::new(), &mut Never)
        .unwrap()
        .is_none());
    assert_eq!(generator.explored_paths(), 1);
}

#[test]
fn statistics_export_after_search() {
    let session = session();
    let test = TestCaseBuilder::ints(&[1, 4, 16, 0]).build();
    let mut generator =
        DseTestGenerator::new(&session, ScriptedExecutor::new(three_guards), NoCoverage);
    generator
        .generate_new_test(&test, &BTreeSet::new(), &mut NonZero("var3"))
        .unwrap();

    session.log_statistics();
    let json = session.export_json().unwrap();
    let snapshot: concolic_core::StatsSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(snapshot.sat, 3);
    assert!(snapshot.cache.unwrap().misses >= 3);
}
