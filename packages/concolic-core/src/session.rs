//! Search session
//!
//! Owns every piece of state shared by the driver invocations of one search:
//! metric registry, solver cache, statistics, solver backend and config.
//! Construct once, then hand out `&DseSession` (or an `Arc`) to workers.

use crate::config::{DseConfig, Validatable};
use crate::errors::Result;
use crate::features::cache::SolverCache;
use crate::features::concolic::ConcolicDriver;
use crate::features::solver::{AvmSolver, Solver};
use crate::features::statistics::{DseStatistics, StatsSnapshot};
use prometheus::Registry;
use std::sync::Arc;
use tracing::info;

pub struct DseSession {
    config: DseConfig,
    registry: Registry,
    cache: SolverCache,
    statistics: DseStatistics,
    solver: Arc<dyn Solver>,
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
}

impl DseSession {
    /// Session backed by the built-in local-search solver
    pub fn new(config: DseConfig) -> Result<Self> {
        let solver = Arc::new(AvmSolver::with_config(config.avm_config()));
        Self::with_solver(config, solver)
    }

    pub fn with_solver(config: DseConfig, solver: Arc<dyn Solver>) -> Result<Self> {
        Self::with_registry(config, solver, Registry::new())
    }

    /// Register metrics on a caller-owned registry
    pub fn with_registry(
        config: DseConfig,
        solver: Arc<dyn Solver>,
        registry: Registry,
    ) -> Result<Self> {
        config.validate()?;

        #[cfg(feature = "parallel")]
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.effective_worker_threads())
            .thread_name(|i| format!("dse-worker-{}", i))
            .build()
            .map_err(crate::errors::ConcolicError::thread_pool)?;

        let session = Self {
            cache: SolverCache::new(&registry)?,
            statistics: DseStatistics::new(&registry)?,
            registry,
            solver,
            config,
            #[cfg(feature = "parallel")]
            pool,
        };
        info!(
            solver = session.solver.name(),
            config = %session.config.describe(),
            "DSE session started"
        );
        Ok(session)
    }

    pub fn config(&self) -> &DseConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn cache(&self) -> &SolverCache {
        &self.cache
    }

    pub fn statistics(&self) -> &DseStatistics {
        &self.statistics
    }

    pub fn solver(&self) -> &dyn Solver {
        self.solver.as_ref()
    }

    #[cfg(feature = "parallel")]
    pub(crate) fn pool(&self) -> &rayon::ThreadPool {
        &self.pool
    }

    pub fn driver(&self) -> ConcolicDriver<'_> {
        ConcolicDriver::new(self)
    }

    /// Statistics including the cache counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cache: Some(self.cache.stats()),
            ..self.statistics.snapshot()
        }
    }

    pub fn export_json(&self) -> Result<String> {
        Ok(self.snapshot().to_json()?)
    }

    pub fn log_statistics(&self) {
        self.statistics
            .log_statistics(Some(&self.cache.stats()), self.config.max_constraint_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use crate::errors::ConcolicError;

    #[test]
    fn test_session_defaults() {
        let session = DseSession::new(DseConfig::preset(Preset::Fast)).unwrap();
        assert_eq!(session.solver().name(), "avm");
        assert!(session.cache().is_empty());
        assert_eq!(session.snapshot().cache.unwrap().hits, 0);
        assert!(session.export_json().unwrap().contains("\"sat\": 0"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = DseConfig::default().solver_timeout_ms(0);
        assert!(matches!(
            DseSession::new(config),
            Err(ConcolicError::Config(_))
        ));
    }

    #[test]
    fn test_shared_registry_conflict() {
        let registry = Registry::new();
        let solver: Arc<dyn Solver> = Arc::new(AvmSolver::new());
        let _first =
            DseSession::with_registry(DseConfig::default(), Arc::clone(&solver), registry.clone())
                .unwrap();
        assert!(matches!(
            DseSession::with_registry(DseConfig::default(), solver, registry),
            Err(ConcolicError::Metrics(_))
        ));
    }
}
