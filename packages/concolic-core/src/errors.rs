//! Error types for concolic-core
//!
//! Search outcomes (UNSAT, timeout, unsolvable, diverged) are values, not
//! errors. What lands here is infrastructure failure.

use crate::config::ConfigError;
use crate::features::solver::SolverError;
use thiserror::Error;

/// Main error type for concolic-core operations
#[derive(Debug, Error)]
pub enum ConcolicError {
    /// Solver backend failure
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Metric registration failure
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Statistics export failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Worker pool could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

impl ConcolicError {
    pub fn thread_pool(msg: impl ToString) -> Self {
        ConcolicError::ThreadPool(msg.to_string())
    }
}

/// Result type alias for concolic-core operations
pub type Result<T> = std::result::Result<T, ConcolicError>;
