//! Concrete re-evaluation of expressions under variable bindings
//!
//! Variables not present in the bindings keep the value cached on the node,
//! so an empty `Bindings` reproduces the original run.

use super::visitor::ExpressionVisitor;
use crate::features::symbolic::domain::{
    BinaryOp, Bounds, ConcreteValue, Constraint, Expression, UnaryOp, VarName, Width,
};
use ahash::AHashMap;

/// Variable assignment.
///
/// The search loop updates one variable at a time with `set` and undoes a
/// rejected move with `restore`, so a move costs one map write.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: AHashMap<VarName, ConcreteValue>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (VarName, ConcreteValue)>,
    {
        Self {
            values: pairs.into_iter().collect(),
        }
    }

    pub fn with(mut self, name: VarName, value: ConcreteValue) -> Self {
        self.values.insert(name, value);
        self
    }

    /// Bind `name`, returning the previous binding for `restore`
    pub fn set(&mut self, name: VarName, value: ConcreteValue) -> Option<ConcreteValue> {
        self.values.insert(name, value)
    }

    /// Undo a `set`
    pub fn restore(&mut self, name: VarName, previous: Option<ConcreteValue>) {
        match previous {
            Some(value) => {
                self.values.insert(name, value);
            }
            None => {
                self.values.remove(&name);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ConcreteValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VarName, &ConcreteValue)> {
        self.values.iter()
    }
}

/// Evaluates expressions with JVM semantics.
///
/// `None` means the expression is undefined under the bindings
/// (division by zero, out-of-range `charAt`, domain mismatch).
pub struct Evaluator<'a> {
    bindings: &'a Bindings,
}

impl<'a> Evaluator<'a> {
    pub fn new(bindings: &'a Bindings) -> Self {
        Self { bindings }
    }

    pub fn evaluate(&mut self, expr: &Expression) -> Option<ConcreteValue> {
        expr.accept(self)
    }

    /// `Some(true)` when the constraint holds under the bindings
    pub fn evaluate_constraint(&mut self, constraint: &Constraint) -> Option<bool> {
        let left = self.evaluate(constraint.left())?;
        let right = self.evaluate(constraint.right())?;
        Some(constraint.comparator().holds(&left, &right))
    }

    /// Whether every constraint holds
    pub fn satisfies_all(&mut self, constraints: &[Constraint]) -> bool {
        constraints
            .iter()
            .all(|c| self.evaluate_constraint(c) == Some(true))
    }
}

impl ExpressionVisitor for Evaluator<'_> {
    type Output = Option<ConcreteValue>;

    fn visit_constant(&mut self, value: &ConcreteValue) -> Self::Output {
        Some(value.clone())
    }

    fn visit_variable(
        &mut self,
        name: &VarName,
        value: &ConcreteValue,
        _bounds: Option<&Bounds>,
        width: Option<Width>,
    ) -> Self::Output {
        let value = self.bindings.get(name).unwrap_or(value).clone();
        Some(match width {
            Some(width) => width.fit(value),
            None => value,
        })
    }

    fn visit_unary(
        &mut self,
        op: UnaryOp,
        operand: Self::Output,
        _cached: &ConcreteValue,
        width: Option<Width>,
    ) -> Self::Output {
        op.apply(&operand?, width)
    }

    fn visit_binary(
        &mut self,
        op: BinaryOp,
        left: Self::Output,
        right: Self::Output,
        _cached: &ConcreteValue,
        width: Option<Width>,
    ) -> Self::Output {
        op.apply(&left?, &right?, width)
    }
}
