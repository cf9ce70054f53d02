//! Timeout-enforcing solver wrapper
//!
//! Runs the wrapped backend on a worker thread and waits at most the budget
//! for its verdict. A late verdict is discarded; the worker finishes in the
//! background.
//!
//! Workers that outlive their budget are counted. Once `max_in_flight` of
//! them are still running, further queries time out immediately instead of
//! spawning, so a backend that ignores its budget cannot pile up threads.

use crate::features::solver::domain::{SolverError, SolverOutcome, SolverQuery, SolverResult};
use crate::features::solver::ports::Solver;
use crate::features::symbolic::Domain;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::warn;

/// Decrements the in-flight count when the worker exits, panics included
struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

pub struct DeadlineSolver {
    inner: Arc<dyn Solver>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: usize,
}

impl DeadlineSolver {
    /// Allows one running worker per CPU
    pub fn new(inner: Arc<dyn Solver>) -> Self {
        Self::with_max_in_flight(inner, num_cpus::get())
    }

    pub fn with_max_in_flight(inner: Arc<dyn Solver>, max_in_flight: usize) -> Self {
        Self {
            inner,
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: max_in_flight.max(1),
        }
    }

    pub fn inner(&self) -> &Arc<dyn Solver> {
        &self.inner
    }

    /// Workers still running, including abandoned ones
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Reserve a worker slot; `None` when all are taken
    fn reserve(&self) -> Option<InFlight> {
        self.in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.max_in_flight).then_some(n + 1)
            })
            .ok()
            .map(|_| InFlight(Arc::clone(&self.in_flight)))
    }
}

impl Solver for DeadlineSolver {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn supported_domains(&self) -> &[Domain] {
        self.inner.supported_domains()
    }

    fn solve(&self, query: &SolverQuery, budget: Duration) -> SolverOutcome {
        let Some(slot) = self.reserve() else {
            warn!(
                solver = self.inner.name(),
                in_flight = self.in_flight(),
                "all solver workers busy past their budget"
            );
            return Ok(SolverResult::Timeout);
        };

        let (tx, rx) = channel();
        let inner = Arc::clone(&self.inner);
        let query = query.clone();

        thread::Builder::new()
            .name(format!("solver-{}", inner.name()))
            .spawn(move || {
                let _slot = slot;
                // Receiver may be gone after a timeout
                let _ = tx.send(inner.solve(&query, budget));
            })
            .map_err(|e| SolverError::Backend {
                backend: self.inner.name(),
                message: format!("failed to spawn solver thread: {}", e),
            })?;

        match rx.recv_timeout(budget) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    solver = self.inner.name(),
                    budget_ms = budget.as_millis() as u64,
                    "solver exceeded its budget"
                );
                Ok(SolverResult::Timeout)
            }
            Err(RecvTimeoutError::Disconnected) => Err(SolverError::Backend {
                backend: self.inner.name(),
                message: "solver thread terminated without a verdict".to_string(),
            }),
        }
    }
}
