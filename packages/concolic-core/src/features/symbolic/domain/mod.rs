//! Symbolic domain models

pub mod constraint;
pub mod expression;
pub mod operator;
pub mod value;

pub use constraint::{total_size, Constraint};
pub use expression::{ExprRef, Expression, VarName};
pub use operator::{compare_values, BinaryOp, Comparator, UnaryOp};
pub use value::{Bounds, ConcreteValue, Domain, Width};
