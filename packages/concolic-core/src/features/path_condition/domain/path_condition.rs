//! Path Condition Domain Model
//!
//! Ordered sequence of branch decisions in execution order. Branches are held
//! behind `Arc`, so derived path conditions share the untouched prefix.

use super::branch_condition::BranchCondition;
use crate::features::symbolic::Constraint;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct PathCondition {
    branches: Vec<Arc<BranchCondition>>,
}

impl PathCondition {
    pub fn new(branches: Vec<BranchCondition>) -> Self {
        Self {
            branches: branches.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn size(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BranchCondition> {
        self.branches.get(index).map(|b| b.as_ref())
    }

    pub fn branches(&self) -> impl Iterator<Item = &BranchCondition> + '_ {
        self.branches.iter().map(|b| b.as_ref())
    }

    /// Flattened constraints satisfied by the run: per branch,
    /// `supporting ++ [decision]`.
    pub fn constraints(&self) -> Vec<Constraint> {
        let mut out = Vec::with_capacity(self.branches.len() * 2);
        for branch in &self.branches {
            out.extend(branch.supporting().iter().cloned());
            out.push(branch.decision().clone());
        }
        out
    }

    /// Keep `[0, index)`, replace branch `index` by its negation and drop the rest.
    ///
    /// # Panics
    ///
    /// If `index >= self.size()`.
    pub fn negate(&self, index: usize) -> PathCondition {
        assert!(
            index < self.branches.len(),
            "branch index {} out of range for path condition of size {}",
            index,
            self.branches.len()
        );
        let mut branches = Vec::with_capacity(index + 1);
        branches.extend(self.branches[..index].iter().cloned());
        branches.push(Arc::new(self.branches[index].negate()));
        PathCondition { branches }
    }

    /// Order-free signature of the flattened constraints, used to recognise a
    /// path that was already explored.
    pub fn normalized(&self) -> BTreeSet<[u8; 32]> {
        self.constraints()
            .iter()
            .map(|c| *c.fingerprint().as_bytes())
            .collect()
    }

    /// Total node count of all flattened constraints
    pub fn constraint_size(&self) -> usize {
        self.branches
            .iter()
            .map(|b| {
                b.decision().size() + b.supporting().iter().map(Constraint::size).sum::<usize>()
            })
            .sum()
    }

    /// Whether the branch at `index` is the very same event as `branch`
    pub fn is_same_branch(&self, index: usize, branch: &BranchCondition) -> bool {
        self.get(index).map_or(false, |b| b == branch)
    }
}

impl FromIterator<BranchCondition> for PathCondition {
    fn from_iter<I: IntoIterator<Item = BranchCondition>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Index<usize> for PathCondition {
    type Output = BranchCondition;

    fn index(&self, index: usize) -> &BranchCondition {
        &self.branches[index]
    }
}

impl fmt::Display for PathCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, branch) in self.branches.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "#{} {}", i, branch)?;
        }
        Ok(())
    }
}
