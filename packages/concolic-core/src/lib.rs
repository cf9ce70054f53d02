/*
 * Concolic Core - Dynamic Symbolic Execution Engine
 *
 * Feature-First Hexagonal Architecture:
 * - features/symbolic       : Concolic expressions and constraints
 * - features/path_condition : Branch conditions collected from one run
 * - features/reduction      : Cone-of-influence query reduction
 * - features/solver         : Solver port + local-search backend
 * - features/cache          : Per-key atomic solver cache
 * - features/concolic       : Negation driver and test generator
 * - features/divergence     : Expected vs. observed path check
 * - features/statistics     : Prometheus counters + running aggregates
 *
 * Concurrency:
 * - One concolic execution is sequential
 * - Negations run in parallel on a Rayon pool (feature `parallel`), sharing
 *   the solver cache
 */

// Crate-level lint configuration
#![allow(clippy::too_many_arguments)] // Builders mirror config fields
#![allow(clippy::type_complexity)] // Nested result tuples in parallel APIs
#![allow(clippy::should_implement_trait)] // from_str naming intentional
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::derivable_impls)] // Manual impl for documentation
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::upper_case_acronyms)] // AVM, DSE naming
#![allow(clippy::len_without_is_empty)] // Size-style accessors

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Feature modules (expression model → path condition → solving → driver)
pub mod features;

/// Configuration system (presets + YAML)
pub mod config;

/// Error types
pub mod errors;

/// Search session (shared cache, statistics, solver)
pub mod session;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{ConfigError, DseConfig, Preset, Validatable};
pub use errors::{ConcolicError, Result};
pub use session::DseSession;

pub use features::concolic::{
    ConcolicDriver, ConcolicExecutor, CoverageOracle, DseTestGenerator, GeneratedTest,
    LocalSearchObjective, NegationOutcome, NewTest, NoCoverage, PrimitiveKind,
    PrimitiveStatement, PrimitiveValue, TestCase,
};
pub use features::divergence::{check_divergence, divergence_ratio, is_divergent, DivergenceReport};
pub use features::path_condition::{
    BranchCondition, BranchKind, BranchOrigin, InstructionObserver, PathCondition,
    PathConditionCollector,
};
pub use features::reduction::cone_of_influence;
pub use features::solver::{
    AvmSolver, DeadlineSolver, Model, ModelValue, Solver, SolverError, SolverQuery, SolverResult,
};
pub use features::cache::SolverCache;
pub use features::statistics::{DseStatistics, StatsSnapshot};
pub use features::symbolic::{Comparator, ConcreteValue, Constraint, Domain, Expression};
