/*
 * Cone-of-Influence Reduction
 *
 * Backward dependency closure over a constraint list, the constraint-level
 * analogue of a backward slice:
 * - The last constraint is the target and is always kept
 * - Scanning backward, a constraint is kept iff it shares a variable with the
 *   dependency set accumulated so far; its variables then join the set
 * - Output preserves the input order
 */

use crate::features::symbolic::{Constraint, VarName};
use rustc_hash::FxHashSet;
use tracing::trace;

/// Outcome of a reduction
#[derive(Debug, Clone)]
pub struct Reduction {
    pub constraints: Vec<Constraint>,
    /// Variables the target transitively depends on
    pub dependencies: FxHashSet<VarName>,
    pub original_len: usize,
}

impl Reduction {
    pub fn removed(&self) -> usize {
        self.original_len - self.constraints.len()
    }
}

/// Reduce `constraints` (whose last element is the target) to its cone of
/// influence. An empty input yields an empty output; a target without free
/// variables yields `[target]`.
pub fn reduce(constraints: &[Constraint]) -> Reduction {
    let Some((target, rest)) = constraints.split_last() else {
        return Reduction {
            constraints: Vec::new(),
            dependencies: FxHashSet::default(),
            original_len: 0,
        };
    };

    let mut dependencies: FxHashSet<VarName> = target.variables().into_iter().collect();
    let mut kept: Vec<&Constraint> = vec![target];

    if !dependencies.is_empty() {
        for constraint in rest.iter().rev() {
            let variables = constraint.variables();
            if variables.iter().any(|v| dependencies.contains(v)) {
                dependencies.extend(variables);
                kept.push(constraint);
            }
        }
    }

    kept.reverse();
    trace!(
        original = constraints.len(),
        reduced = kept.len(),
        dependencies = dependencies.len(),
        "cone of influence"
    );

    Reduction {
        constraints: kept.into_iter().cloned().collect(),
        dependencies,
        original_len: constraints.len(),
    }
}

/// Shorthand returning only the reduced constraint list
pub fn cone_of_influence(constraints: &[Constraint]) -> Vec<Constraint> {
    reduce(constraints).constraints
}
