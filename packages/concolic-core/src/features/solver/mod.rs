//! Constraint Solving
//!
//! ## Architecture
//!
//! ```text
//! solver
//! ├── domain/               # SolverQuery, SolverResult, Model, SolverError
//! ├── ports/                # Solver trait (backend boundary)
//! └── infrastructure/
//!     ├── distance          # Branch distance fitness
//!     ├── avm_solver        # Alternating-variable local search
//!     └── deadline          # Worker-thread timeout enforcement
//! ```
//!
//! ## Usage
//!
//! ```text
//! use concolic_core::features::solver::{AvmSolver, Solver, SolverQuery};
//!
//! let solver = AvmSolver::new();
//! let result = solver.solve(&SolverQuery::new(constraints), Duration::from_secs(1))?;
//! ```

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{Model, ModelValue, SolverError, SolverOutcome, SolverQuery, SolverResult};
pub use infrastructure::{AvmConfig, AvmSolver, DeadlineSolver};
pub use ports::Solver;
