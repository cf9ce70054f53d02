//! Solver backend errors
//!
//! Verdicts (including timeouts) are `SolverResult` values; these errors are
//! reserved for a backend that could not run at all.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("empty solver query")]
    EmptyQuery,

    #[error("unsupported construct in query: {0}")]
    Unsupported(String),

    #[error("solver backend '{backend}' failed: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },
}

pub type SolverOutcome = std::result::Result<super::SolverResult, SolverError>;
