//! Prometheus metrics for the solver cache

use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Histogram, HistogramOpts, IntCounter, IntGauge, Opts,
    Registry,
};

/// Solver Cache Metrics
#[derive(Clone)]
pub struct SolverCacheMetrics {
    pub hits: IntCounter,
    pub misses: IntCounter,
    /// Stored SAT verdicts
    pub sat_entries: IntGauge,
    /// Stored UNSAT verdicts
    pub unsat_entries: IntGauge,
    /// Timeouts seen on a miss (never stored)
    pub timeouts: IntCounter,
    /// Wall-clock time of solver calls on a miss
    pub solve_seconds: Histogram,
}

impl SolverCacheMetrics {
    pub fn new(registry: &Registry) -> prometheus::Result<Self> {
        Ok(Self {
            hits: register_int_counter_with_registry!(
                Opts::new("dse_solver_cache_hits_total", "Solver cache hits"),
                registry
            )?,
            misses: register_int_counter_with_registry!(
                Opts::new("dse_solver_cache_misses_total", "Solver cache misses"),
                registry
            )?,
            sat_entries: register_int_gauge_with_registry!(
                Opts::new("dse_solver_cache_sat_entries", "Cached SAT verdicts"),
                registry
            )?,
            unsat_entries: register_int_gauge_with_registry!(
                Opts::new("dse_solver_cache_unsat_entries", "Cached UNSAT verdicts"),
                registry
            )?,
            timeouts: register_int_counter_with_registry!(
                Opts::new(
                    "dse_solver_cache_timeouts_total",
                    "Solver timeouts on cache misses (not cached)"
                ),
                registry
            )?,
            solve_seconds: register_histogram_with_registry!(
                HistogramOpts::new(
                    "dse_solver_cache_solve_seconds",
                    "Solver wall-clock time on cache misses"
                )
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]),
                registry
            )?,
        })
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.get() as f64;
        let total = hits + self.misses.get() as f64;
        if total > 0.0 {
            hits / total
        } else {
            0.0
        }
    }
}
