//! Custom assertions for path conditions

use concolic_core::{check_divergence, PathCondition};

/// `negated` keeps the first `index` branches of `original` (same events)
/// and flips the decision at `index`
pub fn assert_prefix_preserved(original: &PathCondition, negated: &PathCondition, index: usize) {
    assert_eq!(negated.size(), index + 1, "negation must drop the suffix");
    for i in 0..index {
        assert!(
            negated.is_same_branch(i, &original[i]),
            "branch {} was not shared with the original path",
            i
        );
    }
    assert_eq!(
        negated[index].decision().to_string(),
        original[index].decision().negate().to_string()
    );
    assert_eq!(negated[index].origin(), original[index].origin());
}

/// The re-executed path reproduces the expected prefix
pub fn assert_non_divergent(expected: &PathCondition, observed: &PathCondition) {
    let report = check_divergence(expected, observed);
    assert!(
        !report.diverged,
        "expected:\n{}\nobserved:\n{}\n{}",
        expected, observed, report
    );
}
