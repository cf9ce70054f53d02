//! Path divergence check
//!
//! Branches match when they come from the same decision point
//! (`class.method:index`) with the same comparator. Object identity and
//! concrete values are ignored.

use crate::features::path_condition::PathCondition;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivergenceReport {
    /// Neither path is a prefix of the other
    pub diverged: bool,
    /// Length of the longest matching prefix
    pub common_prefix: usize,
    pub expected_len: usize,
    pub observed_len: usize,
}

impl DivergenceReport {
    /// Index of the first mismatching branch, if the paths diverged
    pub fn first_mismatch(&self) -> Option<usize> {
        self.diverged.then_some(self.common_prefix)
    }
}

impl fmt::Display for DivergenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.diverged {
            write!(
                f,
                "diverged at branch {} (expected {}, observed {})",
                self.common_prefix, self.expected_len, self.observed_len
            )
        } else {
            write!(
                f,
                "followed {} of {} expected branches",
                self.common_prefix, self.expected_len
            )
        }
    }
}

fn common_prefix(expected: &PathCondition, observed: &PathCondition) -> usize {
    expected
        .branches()
        .zip(observed.branches())
        .take_while(|(e, o)| e.same_decision_point(o))
        .count()
}

pub fn check_divergence(expected: &PathCondition, observed: &PathCondition) -> DivergenceReport {
    let common = common_prefix(expected, observed);
    DivergenceReport {
        diverged: common < expected.size().min(observed.size()),
        common_prefix: common,
        expected_len: expected.size(),
        observed_len: observed.size(),
    }
}

/// `true` unless one branch sequence is a prefix of the other.
///
/// A shorter observed path that matches so far is not divergent.
pub fn is_divergent(expected: &PathCondition, observed: &PathCondition) -> bool {
    check_divergence(expected, observed).diverged
}

/// Fraction of the expected path reproduced by the observed one, in `[0, 1]`.
///
/// An empty expectation is trivially reproduced.
pub fn divergence_ratio(expected: &PathCondition, observed: &PathCondition) -> f64 {
    if expected.is_empty() {
        return 1.0;
    }
    common_prefix(expected, observed) as f64 / expected.size() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::path_condition::{BranchCondition, BranchKind, BranchOrigin};
    use crate::features::symbolic::{Constraint, Expression};

    fn branch(index: u32, bound: i64) -> BranchCondition {
        BranchCondition::new(
            BranchOrigin::new("Foo", "bar", index),
            Constraint::lt(Expression::int_var("x", 0), Expression::int(bound)),
            Vec::new(),
            BranchKind::If { is_true_branch: true },
        )
    }

    fn path(points: &[u32]) -> PathCondition {
        points.iter().map(|&i| branch(i, 10)).collect()
    }

    #[test]
    fn test_identical_paths() {
        let p = path(&[1, 2, 3]);
        let q = path(&[1, 2, 3]);
        assert!(!is_divergent(&p, &q));
        assert_eq!(divergence_ratio(&p, &q), 1.0);
    }

    #[test]
    fn test_prefix_either_way_is_not_divergent() {
        let short = path(&[1, 2]);
        let long = path(&[1, 2, 3, 4]);
        assert!(!is_divergent(&short, &long));
        assert!(!is_divergent(&long, &short));
        assert_eq!(divergence_ratio(&long, &short), 0.5);
        assert_eq!(check_divergence(&long, &short).first_mismatch(), None);
    }

    #[test]
    fn test_mismatch_is_divergent() {
        let expected = path(&[1, 2, 3]);
        let observed = path(&[1, 5, 3]);
        let report = check_divergence(&expected, &observed);
        assert!(report.diverged);
        assert_eq!(report.first_mismatch(), Some(1));
        assert!((divergence_ratio(&expected, &observed) - 1.0 / 3.0).abs() < 1e-12);
        assert!(report.to_string().starts_with("diverged at branch 1"));
    }

    #[test]
    fn test_negated_comparator_differs() {
        let expected = path(&[1]);
        let observed = expected.negate(0);
        assert!(is_divergent(&expected, &observed));
    }

    #[test]
    fn test_constants_do_not_matter() {
        let expected: PathCondition = vec![branch(1, 10)].into_iter().collect();
        let observed: PathCondition = vec![branch(1, 99)].into_iter().collect();
        assert!(!is_divergent(&expected, &observed));
    }

    #[test]
    fn test_empty_paths() {
        let empty = PathCondition::empty();
        assert!(!is_divergent(&empty, &path(&[1])));
        assert_eq!(divergence_ratio(&empty, &path(&[1])), 1.0);
        assert_eq!(divergence_ratio(&path(&[1]), &empty), 0.0);
    }
}
