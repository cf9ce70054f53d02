//! Solver Cache
//!
//! Memoizes solver verdicts across the executions of one search session:
//!
//! - **Key**: Blake3 digest of the sorted constraint fingerprints
//!   (order- and duplicate-insensitive)
//! - **Store**: DashMap with one `OnceCell` per key (per-key atomic
//!   get-or-compute, unrelated keys in parallel)
//! - **Policy**: SAT and UNSAT are stored; timeouts are not
//! - **Metrics**: Prometheus hits/misses, SAT/UNSAT entry counts, solve time

mod metrics;
mod query_key;
mod solver_cache;

pub use metrics::SolverCacheMetrics;
pub use query_key::QueryKey;
pub use solver_cache::{CachedSolve, SolverCache, SolverCacheStats};
