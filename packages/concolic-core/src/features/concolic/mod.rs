//! Concolic Mutation
//!
//! ## Architecture
//!
//! ```text
//! concolic
//! ├── ports/          # TestCase, PrimitiveStatement, executor/objective/coverage
//! └── application/
//!     ├── driver      # negate one branch, solve, patch a clone of the test
//!     └── generator   # walk a path until a negation improves the objective
//! ```
//!
//! ## Usage
//!
//! ```text
//! let session = DseSession::new(DseConfig::default())?;
//! let outcome = session.driver().negate_condition(&path, 0, &test)?;
//! if let Some(new_test) = outcome.into_test() { ... }
//! ```

pub mod application;
pub mod ports;

pub use application::{ConcolicDriver, DseTestGenerator, GeneratedTest, NegationOutcome, NewTest};
pub use ports::{
    ConcolicExecutor, CoverageOracle, LocalSearchObjective, NoCoverage, PrimitiveKind,
    PrimitiveStatement, PrimitiveValue, TestCase,
};
