//! Concolic application services

mod driver;
mod generator;

pub use driver::{ConcolicDriver, NegationOutcome, NewTest};
pub use generator::{DseTestGenerator, GeneratedTest};
