//! Concolic ports

mod objective;
mod test_case;

pub use objective::{ConcolicExecutor, CoverageOracle, LocalSearchObjective, NoCoverage};
pub use test_case::{PrimitiveKind, PrimitiveStatement, PrimitiveValue, TestCase};
