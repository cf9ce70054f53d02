//! Constraint Reduction
//!
//! Drops constraints that cannot influence the negated target before a query
//! reaches the solver cache.

pub mod cone_of_influence;

pub use cone_of_influence::{cone_of_influence, reduce, Reduction};
