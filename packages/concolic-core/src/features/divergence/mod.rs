//! Divergence Checker
//!
//! Compares the path a solved input was expected to follow with the path its
//! re-execution actually took. Divergence is an outcome, not an error.

mod checker;

pub use checker::{check_divergence, divergence_ratio, is_divergent, DivergenceReport};
