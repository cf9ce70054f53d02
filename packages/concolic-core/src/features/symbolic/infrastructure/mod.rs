//! Symbolic infrastructure: visitor dispatch and concrete evaluation

pub mod evaluator;
pub mod visitor;

pub use evaluator::{Bindings, Evaluator};
pub use visitor::ExpressionVisitor;
