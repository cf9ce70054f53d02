//! Constraint Domain Model
//!
//! `(left, comparator, right, domain)`. Operands are never reordered:
//! `negate` only maps the comparator, so `c.negate().negate() == c`
//! structurally and the solver cache sees the same key for both.

use super::expression::{ExprRef, Expression, VarName};
use super::operator::Comparator;
use super::value::{Bounds, ConcreteValue, Domain};
use ahash::AHashMap;
use std::collections::hash_map::Entry;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    left: ExprRef,
    comparator: Comparator,
    right: ExprRef,
    domain: Domain,
}

impl Constraint {
    /// Build a constraint; the domain is inferred from the operands
    /// (real wins over integer, otherwise the left operand's domain).
    pub fn new(left: ExprRef, comparator: Comparator, right: ExprRef) -> Self {
        let domain = match (left.domain(), right.domain()) {
            (Domain::Real, _) | (_, Domain::Real) => Domain::Real,
            (d, _) => d,
        };
        Self::with_domain(left, comparator, right, domain)
    }

    pub fn with_domain(
        left: ExprRef,
        comparator: Comparator,
        right: ExprRef,
        domain: Domain,
    ) -> Self {
        Self {
            left,
            comparator,
            right,
            domain,
        }
    }

    /// left == right
    pub fn eq(left: ExprRef, right: ExprRef) -> Self {
        Self::new(left, Comparator::Eq, right)
    }

    /// left != right
    pub fn neq(left: ExprRef, right: ExprRef) -> Self {
        Self::new(left, Comparator::Neq, right)
    }

    /// left < right
    pub fn lt(left: ExprRef, right: ExprRef) -> Self {
        Self::new(left, Comparator::Lt, right)
    }

    /// left <= right
    pub fn le(left: ExprRef, right: ExprRef) -> Self {
        Self::new(left, Comparator::Le, right)
    }

    /// left > right
    pub fn gt(left: ExprRef, right: ExprRef) -> Self {
        Self::new(left, Comparator::Gt, right)
    }

    /// left >= right
    pub fn ge(left: ExprRef, right: ExprRef) -> Self {
        Self::new(left, Comparator::Ge, right)
    }

    pub fn left(&self) -> &ExprRef {
        &self.left
    }

    pub fn right(&self) -> &ExprRef {
        &self.right
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Same operands, complemented comparator
    pub fn negate(&self) -> Self {
        Self {
            left: self.left.clone(),
            comparator: self.comparator.negate(),
            right: self.right.clone(),
            domain: self.domain,
        }
    }

    /// Cheap static check run before any solver call.
    ///
    /// Rejects constraints without free variables (nothing to solve for) and
    /// constraints where one variable name is bound to conflicting concrete
    /// values or conflicting domains.
    pub fn is_solvable(&self) -> bool {
        let mut seen: AHashMap<VarName, ConcreteValue> = AHashMap::new();
        let mut consistent = true;
        let mut check = |name: &VarName, value: &ConcreteValue, _: Option<&Bounds>| {
            match seen.entry(name.clone()) {
                Entry::Occupied(previous) => {
                    if !previous.get().same_as(value) {
                        consistent = false;
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(value.clone());
                }
            }
        };
        self.left.for_each_variable(&mut check);
        self.right.for_each_variable(&mut check);
        consistent && !seen.is_empty()
    }

    /// Node count of both operands
    pub fn size(&self) -> usize {
        self.left.size() + self.right.size()
    }

    pub fn variables(&self) -> BTreeSet<VarName> {
        let mut out = BTreeSet::new();
        self.left.collect_variables(&mut out);
        self.right.collect_variables(&mut out);
        out
    }

    pub fn shares_variable_with(&self, names: &BTreeSet<VarName>) -> bool {
        self.variables().iter().any(|v| names.contains(v))
    }

    /// Whether the cached concrete values satisfy this constraint
    pub fn holds_concretely(&self) -> bool {
        self.comparator
            .holds(self.left.concrete_value(), self.right.concrete_value())
    }

    /// Structural fingerprint: comparator, domain and both operand trees
    pub fn fingerprint(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&[self.comparator.tag()]);
        hasher.update(self.domain.as_str().as_bytes());
        self.left.hash_into(&mut hasher);
        self.right.hash_into(&mut hasher);
        hasher.finalize()
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.comparator, self.right)
    }
}

/// Total node count of a constraint list
pub fn total_size(constraints: &[Constraint]) -> usize {
    constraints.iter().map(Constraint::size).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::symbolic::domain::operator::BinaryOp;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_negate_twice_is_identity() {
        let c = Constraint::lt(Expression::int_var("x", 3), Expression::int(10));
        assert_eq!(c.negate().comparator(), Comparator::Ge);
        assert_eq!(c.negate().negate(), c);
        assert_eq!(c.negate().negate().fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_negate_keeps_operand_order() {
        let c = Constraint::gt(Expression::int(0), Expression::int_var("y", -1));
        let n = c.negate();
        assert_eq!(n.left(), c.left());
        assert_eq!(n.right(), c.right());
        assert_eq!(n.comparator(), Comparator::Le);
    }

    #[test]
    fn test_is_solvable_rejects_constant_only() {
        let c = Constraint::eq(Expression::int(1), Expression::int(1));
        assert!(!c.is_solvable());
    }

    #[test]
    fn test_is_solvable_rejects_conflicting_bindings() {
        let c = Constraint::eq(
            Expression::variable("x", 1i64, Some(Bounds::INT)),
            Expression::variable("x", 2i64, Some(Bounds::INT)),
        );
        assert!(!c.is_solvable());

        let ok = Constraint::eq(Expression::int_var("x", 1), Expression::int_var("x", 1));
        assert!(ok.is_solvable());
    }

    #[test]
    fn test_domain_inference() {
        let c = Constraint::lt(Expression::int_var("i", 1), Expression::real(2.5));
        assert_eq!(c.domain(), Domain::Real);
        let s = Constraint::eq(Expression::string_var("s", "a"), Expression::string("b"));
        assert_eq!(s.domain(), Domain::String);
    }

    #[test]
    fn test_size_and_variables() {
        let sum = Expression::binary(
            BinaryOp::Add,
            Expression::int_var("a", 1),
            Expression::int_var("b", 2),
        );
        let c = Constraint::le(sum, Expression::int(5));
        assert_eq!(c.size(), 4);
        assert_eq!(c.variables().len(), 2);
        assert!(c.holds_concretely());
        assert!(!c.negate().holds_concretely());
    }

    #[test]
    fn test_fingerprint_ignores_variable_concrete_value() {
        let a = Constraint::eq(Expression::int_var("x", 1), Expression::int(179));
        let b = Constraint::eq(Expression::int_var("x", 42), Expression::int(179));
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), a.negate().fingerprint());
    }
}
