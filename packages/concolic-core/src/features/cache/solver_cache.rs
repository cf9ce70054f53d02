//! Solver Cache: memoized verdicts keyed by constraint-set equality
//!
//! One `OnceCell` per key gives atomic get-or-compute: concurrent callers of
//! the same query wait for a single solver call, while unrelated keys proceed
//! in parallel. The DashMap shard lock is released before solving. Keys whose
//! solve ended without a verdict are dropped again, so the map only grows
//! with stored verdicts.

use super::metrics::SolverCacheMetrics;
use super::query_key::QueryKey;
use crate::features::solver::{Solver, SolverError, SolverQuery, SolverResult};
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use prometheus::Registry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Stored verdict (SAT or UNSAT only)
#[derive(Debug, Clone)]
struct CachedVerdict {
    result: SolverResult,
    solve_time: Duration,
}

/// Result of a cache lookup
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSolve {
    pub result: SolverResult,
    /// Whether the verdict came from the cache
    pub hit: bool,
    /// Time spent in the solver by this call (zero on a hit)
    pub elapsed: Duration,
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sat_entries: u64,
    pub unsat_entries: u64,
    pub timeouts: u64,
    pub hit_rate: f64,
}

/// Verdicts that must not be stored
enum Uncached {
    Timeout(Duration),
    Failed(SolverError),
}

pub struct SolverCache {
    store: DashMap<QueryKey, Arc<OnceCell<CachedVerdict>>>,
    metrics: SolverCacheMetrics,
}

impl SolverCache {
    pub fn new(registry: &Registry) -> prometheus::Result<Self> {
        Ok(Self {
            store: DashMap::new(),
            metrics: SolverCacheMetrics::new(registry)?,
        })
    }

    /// Solve `query` through the cache.
    ///
    /// Hits never call the solver. Misses call it once, record its wall-clock
    /// time and store the verdict unless it is a timeout.
    pub fn solve(
        &self,
        solver: &dyn Solver,
        query: &SolverQuery,
        budget: Duration,
    ) -> Result<CachedSolve, SolverError> {
        let key = QueryKey::of(query.constraints());
        let cell = Arc::clone(
            self.store
                .entry(key)
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .value(),
        );

        if let Some(verdict) = cell.get() {
            return Ok(self.hit(key, verdict));
        }

        let mut computed = false;
        let outcome = cell.get_or_try_init(|| {
            computed = true;
            let started = Instant::now();
            let result = solver.solve(query, budget).map_err(Uncached::Failed)?;
            let solve_time = started.elapsed();
            if result.is_timeout() {
                return Err(Uncached::Timeout(solve_time));
            }
            Ok(CachedVerdict { result, solve_time })
        });

        match outcome {
            Ok(verdict) if computed => {
                self.metrics.misses.inc();
                self.metrics
                    .solve_seconds
                    .observe(verdict.solve_time.as_secs_f64());
                match verdict.result {
                    SolverResult::Sat(_) => self.metrics.sat_entries.inc(),
                    _ => self.metrics.unsat_entries.inc(),
                }
                debug!(
                    %key,
                    verdict = verdict.result.as_str(),
                    solve_ms = verdict.solve_time.as_millis() as u64,
                    "solver cache miss"
                );
                Ok(CachedSolve {
                    result: verdict.result.clone(),
                    hit: false,
                    elapsed: verdict.solve_time,
                })
            }
            // Another caller filled the cell while we waited
            Ok(verdict) => Ok(self.hit(key, verdict)),
            Err(Uncached::Timeout(elapsed)) => {
                self.evict_empty(&key);
                self.metrics.misses.inc();
                self.metrics.timeouts.inc();
                self.metrics.solve_seconds.observe(elapsed.as_secs_f64());
                debug!(%key, "solver timeout (not cached)");
                Ok(CachedSolve {
                    result: SolverResult::Timeout,
                    hit: false,
                    elapsed,
                })
            }
            Err(Uncached::Failed(e)) => {
                self.evict_empty(&key);
                self.metrics.misses.inc();
                Err(e)
            }
        }
    }

    /// Remove the slot for `key` unless a verdict landed in it meanwhile
    fn evict_empty(&self, key: &QueryKey) {
        self.store.remove_if(key, |_, cell| cell.get().is_none());
    }

    fn hit(&self, key: QueryKey, verdict: &CachedVerdict) -> CachedSolve {
        self.metrics.hits.inc();
        trace!(%key, verdict = verdict.result.as_str(), "solver cache hit");
        CachedSolve {
            result: verdict.result.clone(),
            hit: true,
            elapsed: Duration::ZERO,
        }
    }

    /// Cached verdict for a query, without solving
    pub fn peek(&self, query: &SolverQuery) -> Option<SolverResult> {
        let key = QueryKey::of(query.constraints());
        self.store
            .get(&key)
            .and_then(|cell| cell.get().map(|v| v.result.clone()))
    }

    /// Number of stored verdicts
    pub fn len(&self) -> usize {
        self.store.iter().filter(|e| e.value().get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hit_rate(&self) -> f64 {
        self.metrics.hit_rate()
    }

    pub fn metrics(&self) -> &SolverCacheMetrics {
        &self.metrics
    }

    pub fn stats(&self) -> SolverCacheStats {
        SolverCacheStats {
            hits: self.metrics.hits.get(),
            misses: self.metrics.misses.get(),
            sat_entries: self.metrics.sat_entries.get().max(0) as u64,
            unsat_entries: self.metrics.unsat_entries.get().max(0) as u64,
            timeouts: self.metrics.timeouts.get(),
            hit_rate: self.metrics.hit_rate(),
        }
    }

    /// Drop every stored verdict (counters are kept)
    pub fn clear(&self) {
        self.store.clear();
        self.metrics.sat_entries.set(0);
        self.metrics.unsat_entries.set(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::solver::{Model, SolverOutcome};
    use crate::features::symbolic::{Constraint, Domain, Expression};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a scripted verdict and counts calls
    struct CountingSolver {
        calls: AtomicUsize,
        verdict: SolverResult,
    }

    impl CountingSolver {
        fn new(verdict: SolverResult) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                verdict,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Solver for CountingSolver {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn supported_domains(&self) -> &[Domain] {
            &[Domain::Integer]
        }

        fn solve(&self, _: &SolverQuery, _: Duration) -> SolverOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.verdict.clone())
        }
    }

    fn query(bounds: &[i64]) -> SolverQuery {
        SolverQuery::new(
            bounds
                .iter()
                .map(|b| Constraint::lt(Expression::int_var("x", 0), Expression::int(*b)))
                .collect(),
        )
    }

    const BUDGET: Duration = Duration::from_secs(1);

    #[test]
    fn test_second_lookup_is_hit() {
        let cache = SolverCache::new(&Registry::new()).unwrap();
        let solver = CountingSolver::new(SolverResult::Unsat);

        let first = cache.solve(&solver, &query(&[1, 2]), BUDGET).unwrap();
        let second = cache.solve(&solver, &query(&[2, 1]), BUDGET).unwrap();

        assert!(!first.hit);
        assert!(second.hit);
        assert_eq!(first.result, second.result);
        assert_eq!(solver.calls(), 1);
        assert_eq!(cache.stats().unsat_entries, 1);
    }

    #[test]
    fn test_hit_rate_after_repeats() {
        let cache = SolverCache::new(&Registry::new()).unwrap();
        let solver = CountingSolver::new(SolverResult::Sat(Model::new()));
        let n = 8;
        for _ in 0..n {
            cache.solve(&solver, &query(&[5]), BUDGET).unwrap();
        }
        assert_eq!(solver.calls(), 1);
        assert!((cache.hit_rate() - (n as f64 - 1.0) / n as f64).abs() < 1e-12);
        assert_eq!(cache.stats().sat_entries, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_timeouts_are_not_cached() {
        let cache = SolverCache::new(&Registry::new()).unwrap();
        let solver = CountingSolver::new(SolverResult::Timeout);

        for _ in 0..3 {
            let lookup = cache.solve(&solver, &query(&[7]), BUDGET).unwrap();
            assert_eq!(lookup.result, SolverResult::Timeout);
            assert!(!lookup.hit);
        }
        assert_eq!(solver.calls(), 3);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().timeouts, 3);
        assert_eq!(cache.peek(&query(&[7])), None);
    }

    #[test]
    fn test_unresolved_keys_leave_no_slot() {
        let cache = SolverCache::new(&Registry::new()).unwrap();
        let timing_out = CountingSolver::new(SolverResult::Timeout);
        for bound in 0..32 {
            cache.solve(&timing_out, &query(&[bound]), BUDGET).unwrap();
        }
        assert_eq!(cache.store.len(), 0);

        // A later verdict for the same key is stored normally
        let answering = CountingSolver::new(SolverResult::Unsat);
        cache.solve(&answering, &query(&[3]), BUDGET).unwrap();
        assert_eq!(cache.store.len(), 1);
        assert!(cache.solve(&answering, &query(&[3]), BUDGET).unwrap().hit);
    }

    #[test]
    fn test_solver_error_propagates_and_is_retried() {
        struct Failing(AtomicUsize);
        impl Solver for Failing {
            fn name(&self) -> &'static str {
                "failing"
            }
            fn supported_domains(&self) -> &[Domain] {
                &[]
            }
            fn solve(&self, _: &SolverQuery, _: Duration) -> SolverOutcome {
                self.0.fetch_add(1, Ordering::SeqCst);
                Err(SolverError::Unsupported("x".into()))
            }
        }

        let cache = SolverCache::new(&Registry::new()).unwrap();
        let solver = Failing(AtomicUsize::new(0));
        assert!(cache.solve(&solver, &query(&[1]), BUDGET).is_err());
        assert!(cache.solve(&solver, &query(&[1]), BUDGET).is_err());
        assert_eq!(solver.0.load(Ordering::SeqCst), 2);
        assert_eq!(cache.store.len(), 0);
    }

    #[test]
    fn test_concurrent_same_key_single_call() {
        let cache = Arc::new(SolverCache::new(&Registry::new()).unwrap());
        let solver = Arc::new(CountingSolver::new(SolverResult::Unsat));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let solver = Arc::clone(&solver);
                std::thread::spawn(move || {
                    cache.solve(solver.as_ref(), &query(&[3, 4]), BUDGET).unwrap()
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(solver.calls(), 1);
        assert_eq!(results.iter().filter(|r| !r.hit).count(), 1);
        assert!(results.iter().all(|r| r.result == SolverResult::Unsat));
    }

    #[test]
    fn test_clear_and_registry_conflict() {
        let registry = Registry::new();
        let cache = SolverCache::new(&registry).unwrap();
        let solver = CountingSolver::new(SolverResult::Unsat);
        cache.solve(&solver, &query(&[1]), BUDGET).unwrap();
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().unsat_entries, 0);

        // Metric names are already taken on this registry
        assert!(SolverCache::new(&registry).is_err());
    }
}
