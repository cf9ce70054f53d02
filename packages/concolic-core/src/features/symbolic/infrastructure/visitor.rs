//! Expression visitor
//!
//! Exhaustive dispatch over the four node shapes. Implementors get the
//! children's results already computed (post-order) unless they override
//! `visit` itself.

use crate::features::symbolic::domain::{
    BinaryOp, Bounds, ConcreteValue, Expression, UnaryOp, VarName, Width,
};

pub trait ExpressionVisitor {
    type Output;

    fn visit_constant(&mut self, value: &ConcreteValue) -> Self::Output;

    fn visit_variable(
        &mut self,
        name: &VarName,
        value: &ConcreteValue,
        bounds: Option<&Bounds>,
        width: Option<Width>,
    ) -> Self::Output;

    fn visit_unary(
        &mut self,
        op: UnaryOp,
        operand: Self::Output,
        cached: &ConcreteValue,
        width: Option<Width>,
    ) -> Self::Output;

    fn visit_binary(
        &mut self,
        op: BinaryOp,
        left: Self::Output,
        right: Self::Output,
        cached: &ConcreteValue,
        width: Option<Width>,
    ) -> Self::Output;

    fn visit(&mut self, expr: &Expression) -> Self::Output {
        match expr {
            Expression::Constant { value, .. } => self.visit_constant(value),
            Expression::Variable {
                name,
                value,
                bounds,
                width,
            } => self.visit_variable(name, value, bounds.as_ref(), *width),
            Expression::Unary {
                op,
                operand,
                value,
                width,
            } => {
                let operand = self.visit(operand);
                self.visit_unary(*op, operand, value, *width)
            }
            Expression::Binary {
                op,
                left,
                right,
                value,
                width,
            } => {
                let left = self.visit(left);
                let right = self.visit(right);
                self.visit_binary(*op, left, right, value, *width)
            }
        }
    }
}

impl Expression {
    pub fn accept<V: ExpressionVisitor>(&self, visitor: &mut V) -> V::Output {
        visitor.visit(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Maximum nesting depth of an expression
    struct DepthVisitor;

    impl ExpressionVisitor for DepthVisitor {
        type Output = usize;

        fn visit_constant(&mut self, _: &ConcreteValue) -> usize {
            1
        }

        fn visit_variable(
            &mut self,
            _: &VarName,
            _: &ConcreteValue,
            _: Option<&Bounds>,
            _: Option<Width>,
        ) -> usize {
            1
        }

        fn visit_unary(&mut self, _: UnaryOp, operand: usize, _: &ConcreteValue, _: Option<Width>) -> usize {
            operand + 1
        }

        fn visit_binary(
            &mut self,
            _: BinaryOp,
            l: usize,
            r: usize,
            _: &ConcreteValue,
            _: Option<Width>,
        ) -> usize {
            l.max(r) + 1
        }
    }

    #[test]
    fn test_post_order_dispatch() {
        let x = Expression::int_var("x", 1);
        let inner = Expression::binary(BinaryOp::Add, x.clone(), Expression::int(1));
        let outer = Expression::binary(BinaryOp::Mul, inner, Expression::unary(UnaryOp::Neg, x));
        assert_eq!(outer.accept(&mut DepthVisitor), 3);
        assert_eq!(Expression::int(0).accept(&mut DepthVisitor), 1);
    }
}
