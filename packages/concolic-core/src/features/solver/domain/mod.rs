pub mod error;
pub mod result;

pub use error::{SolverError, SolverOutcome};
pub use result::{Model, ModelValue, SolverQuery, SolverResult};
