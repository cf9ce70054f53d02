//! Per-session DSE telemetry
//!
//! Outcome counters and timing histograms go to Prometheus; running
//! min/max/avg aggregates live behind a mutex. Purely observational: nothing
//! in the search reads these values back.

use super::type_counter::TypeCounter;
use crate::features::cache::SolverCacheStats;
use crate::features::symbolic::{total_size, Constraint};
use parking_lot::Mutex;
use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry, Histogram,
    HistogramOpts, IntCounter, Opts, Registry,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Min/max/avg over a stream of sizes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningStat {
    pub count: u64,
    pub min: usize,
    pub max: usize,
    pub avg: f64,
}

impl RunningStat {
    fn record(&mut self, value: usize) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.avg += (value as f64 - self.avg) / self.count as f64;
    }
}

#[derive(Debug, Default)]
struct Aggregates {
    path_condition_length: RunningStat,
    constraint_size: RunningStat,
    types: TypeCounter,
    solving_time: Duration,
    execution_time: Duration,
}

/// Exportable copy of every statistic
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub sat: u64,
    pub unsat: u64,
    /// SAT verdicts whose model failed re-evaluation against the query
    #[serde(default)]
    pub model_rejected: u64,
    pub timeouts: u64,
    pub unsolvable: u64,
    pub too_long: u64,
    pub useful_tests: u64,
    pub unuseful_tests: u64,
    pub paths_explored: u64,
    pub paths_diverged: u64,
    pub path_condition_length: RunningStat,
    pub constraint_size: RunningStat,
    pub constraint_types: TypeCounter,
    pub total_solving_ms: u64,
    pub total_execution_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<SolverCacheStats>,
}

impl StatsSnapshot {
    /// SAT + UNSAT + rejected models (timeouts excluded)
    pub fn constraint_solvings(&self) -> u64 {
        self.sat + self.unsat + self.model_rejected
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub struct DseStatistics {
    sat: IntCounter,
    unsat: IntCounter,
    model_rejected: IntCounter,
    timeouts: IntCounter,
    unsolvable: IntCounter,
    too_long: IntCounter,
    useful_tests: IntCounter,
    unuseful_tests: IntCounter,
    paths_explored: IntCounter,
    paths_diverged: IntCounter,
    solving_seconds: Histogram,
    execution_seconds: Histogram,
    aggregates: Mutex<Aggregates>,
}

fn counter(registry: &Registry, name: &str, help: &str) -> prometheus::Result<IntCounter> {
    register_int_counter_with_registry!(Opts::new(name, help), registry)
}

impl DseStatistics {
    pub fn new(registry: &Registry) -> prometheus::Result<Self> {
        let buckets = vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0, 120.0];
        Ok(Self {
            sat: counter(registry, "dse_sat_total", "SAT verdicts")?,
            unsat: counter(registry, "dse_unsat_total", "UNSAT verdicts")?,
            model_rejected: counter(
                registry,
                "dse_model_rejected_total",
                "SAT models that did not satisfy their query",
            )?,
            timeouts: counter(registry, "dse_timeouts_total", "Solver timeouts")?,
            unsolvable: counter(
                registry,
                "dse_unsolvable_total",
                "Negated branches rejected before solving",
            )?,
            too_long: counter(
                registry,
                "dse_constraint_too_long_total",
                "Queries above the size limit",
            )?,
            useful_tests: counter(
                registry,
                "dse_useful_tests_total",
                "New tests that improved the objective",
            )?,
            unuseful_tests: counter(
                registry,
                "dse_unuseful_tests_total",
                "New tests that did not improve the objective",
            )?,
            paths_explored: counter(
                registry,
                "dse_paths_explored_total",
                "Re-executions of patched tests",
            )?,
            paths_diverged: counter(
                registry,
                "dse_paths_diverged_total",
                "Re-executions that missed the expected prefix",
            )?,
            solving_seconds: register_histogram_with_registry!(
                HistogramOpts::new("dse_solving_seconds", "Solver time per query")
                    .buckets(buckets.clone()),
                registry
            )?,
            execution_seconds: register_histogram_with_registry!(
                HistogramOpts::new(
                    "dse_concolic_execution_seconds",
                    "Concolic execution time per test"
                )
                .buckets(buckets),
                registry
            )?,
            aggregates: Mutex::new(Aggregates::default()),
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Reporting
    // ═══════════════════════════════════════════════════════════════════════

    /// Query about to be solved
    pub fn report_new_constraints(&self, constraints: &[Constraint]) {
        let size = total_size(constraints);
        let mut agg = self.aggregates.lock();
        agg.constraint_size.record(size);
        agg.types.add_constraints(constraints);
    }

    pub fn report_path_condition_length(&self, length: usize) {
        self.aggregates.lock().path_condition_length.record(length);
    }

    pub fn report_solving_time(&self, elapsed: Duration) {
        self.solving_seconds.observe(elapsed.as_secs_f64());
        self.aggregates.lock().solving_time += elapsed;
    }

    pub fn report_execution_time(&self, elapsed: Duration) {
        self.execution_seconds.observe(elapsed.as_secs_f64());
        self.aggregates.lock().execution_time += elapsed;
    }

    pub fn report_sat(&self) {
        self.sat.inc();
    }

    pub fn report_unsat(&self) {
        self.unsat.inc();
    }

    pub fn report_model_rejected(&self) {
        self.model_rejected.inc();
    }

    pub fn report_timeout(&self) {
        self.timeouts.inc();
    }

    pub fn report_unsolvable(&self) {
        self.unsolvable.inc();
    }

    pub fn report_constraint_too_long(&self) {
        self.too_long.inc();
    }

    pub fn report_useful_test(&self) {
        self.useful_tests.inc();
    }

    pub fn report_unuseful_test(&self) {
        self.unuseful_tests.inc();
    }

    /// A patched test was re-executed
    pub fn report_path(&self, diverged: bool) {
        self.paths_explored.inc();
        if diverged {
            self.paths_diverged.inc();
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Export
    // ═══════════════════════════════════════════════════════════════════════

    pub fn snapshot(&self) -> StatsSnapshot {
        let agg = self.aggregates.lock();
        StatsSnapshot {
            sat: self.sat.get(),
            unsat: self.unsat.get(),
            model_rejected: self.model_rejected.get(),
            timeouts: self.timeouts.get(),
            unsolvable: self.unsolvable.get(),
            too_long: self.too_long.get(),
            useful_tests: self.useful_tests.get(),
            unuseful_tests: self.unuseful_tests.get(),
            paths_explored: self.paths_explored.get(),
            paths_diverged: self.paths_diverged.get(),
            path_condition_length: agg.path_condition_length,
            constraint_size: agg.constraint_size,
            constraint_types: agg.types.clone(),
            total_solving_ms: agg.solving_time.as_millis() as u64,
            total_execution_ms: agg.execution_time.as_millis() as u64,
            cache: None,
        }
    }

    /// Log the summary block at INFO level
    pub fn log_statistics(&self, cache: Option<&SolverCacheStats>, max_constraint_size: usize) {
        let s = self.snapshot();
        let pct = |part: u64, whole: u64| {
            if whole == 0 {
                0.0
            } else {
                100.0 * part as f64 / whole as f64
            }
        };
        let solvings = s.constraint_solvings() + s.timeouts;

        info!("* DSE) Solving statistics");
        info!("* DSE)   SAT: {} ({:.1}%)", s.sat, pct(s.sat, solvings));
        info!(
            "* DSE)     Useful tests: {} ({:.1}%)",
            s.useful_tests,
            pct(s.useful_tests, s.sat)
        );
        info!(
            "* DSE)     Unuseful tests: {} ({:.1}%)",
            s.unuseful_tests,
            pct(s.unuseful_tests, s.sat)
        );
        info!("* DSE)   UNSAT: {} ({:.1}%)", s.unsat, pct(s.unsat, solvings));
        info!(
            "* DSE)   Rejected models: {} ({:.1}%)",
            s.model_rejected,
            pct(s.model_rejected, solvings)
        );
        info!(
            "* DSE)   Timeouts: {} ({:.1}%)",
            s.timeouts,
            pct(s.timeouts, solvings)
        );
        info!("* DSE)   Unsolvable negations: {}", s.unsolvable);
        info!(
            "* DSE)   # Constraint solvings: {} ({}+{}+{})",
            s.constraint_solvings(),
            s.sat,
            s.unsat,
            s.model_rejected
        );

        info!("* DSE) Constraint cache statistics");
        match cache {
            Some(c) if c.hits + c.misses > 0 => {
                info!("* DSE)   Stored SAT constraints: {}", c.sat_entries);
                info!("* DSE)   Stored UNSAT constraints: {}", c.unsat_entries);
                info!("* DSE)   Cache hit rate: {:.1}%", 100.0 * c.hit_rate);
            }
            _ => info!("* DSE)   Constraint cache was not used."),
        }

        info!("* DSE) Constraint types");
        let t = &s.constraint_types;
        if t.total() == 0 {
            info!("* DSE)   no constraints");
        } else {
            info!("* DSE)   integer only: {} / {}", t.integer_only, t.total());
            info!("* DSE)   real only: {} / {}", t.real_only, t.total());
            info!("* DSE)   string only: {} / {}", t.string_only, t.total());
            info!("* DSE)   integer+real: {} / {}", t.integer_real, t.total());
            info!("* DSE)   integer+string: {} / {}", t.integer_string, t.total());
            info!("* DSE)   real+string: {} / {}", t.real_string, t.total());
            info!(
                "* DSE)   integer+real+string: {} / {}",
                t.integer_real_string,
                t.total()
            );
        }

        info!("* DSE) Constraint size:");
        info!("* DSE)   max constraint size: {}", s.constraint_size.max);
        info!("* DSE)   min constraint size: {}", s.constraint_size.min);
        info!("* DSE)   avg constraint size: {:.2}", s.constraint_size.avg);
        info!(
            "* DSE)   Too big constraints: {} (max size {})",
            s.too_long, max_constraint_size
        );

        info!("* DSE) Path condition length:");
        info!("* DSE)   max path condition length: {}", s.path_condition_length.max);
        info!("* DSE)   min path condition length: {}", s.path_condition_length.min);
        info!("* DSE)   avg path condition length: {:.2}", s.path_condition_length.avg);

        info!("* DSE) Paths:");
        info!("* DSE)   explored: {}", s.paths_explored);
        info!(
            "* DSE)   diverged: {} ({:.1}%)",
            s.paths_diverged,
            pct(s.paths_diverged, s.paths_explored)
        );

        info!("* DSE) Time statistics");
        info!("* DSE)   Total concolic execution time: {} ms", s.total_execution_ms);
        info!("* DSE)   Total solving time: {} ms", s.total_solving_ms);
    }
}
