//! DSE search configuration

use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;
use super::validation::{check_range, Validatable};
use crate::features::solver::AvmConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default suffix the shadow VM appends to symbolic variable names
pub const DEFAULT_SYMBOLIC_SUFFIX: &str = "__SYM";

/// Budgets and switches of one concolic search session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DseConfig {
    /// Preset the values were derived from
    pub preset: Preset,

    /// Wall-clock budget of one solver call in milliseconds (1..=600000)
    pub solver_timeout_ms: u64,

    /// Largest query (total expression nodes) sent to the solver (1..=10000000)
    pub max_constraint_size: usize,

    /// Local-search fitness evaluations per query (1..=100000000)
    pub max_search_iterations: u64,

    /// Local-search restarts after a local optimum (0..=100)
    pub variable_resets: u32,

    /// Decimal digits explored for real variables (0..=15)
    pub real_precision: u32,

    /// Reduce queries to the cone of influence of the negated branch
    pub use_cone_of_influence: bool,

    /// Check SAT models against the query before patching a test
    pub verify_models: bool,

    /// Suffix stripped from model variable names
    pub symbolic_suffix: String,

    /// Branch negations tried per generated test (1..=100000)
    pub max_negation_attempts: usize,

    /// Workers for parallel negation (0 = one per CPU)
    pub worker_threads: usize,
}

impl Default for DseConfig {
    fn default() -> Self {
        Self::preset(Preset::Balanced)
    }
}

impl DseConfig {
    pub fn preset(preset: Preset) -> Self {
        let base = Self {
            preset,
            solver_timeout_ms: 1_000,
            max_constraint_size: 100_000,
            max_search_iterations: 100_000,
            variable_resets: 2,
            real_precision: 6,
            use_cone_of_influence: true,
            verify_models: true,
            symbolic_suffix: DEFAULT_SYMBOLIC_SUFFIX.to_string(),
            max_negation_attempts: 100,
            worker_threads: 0,
        };
        match preset {
            Preset::Fast => Self {
                solver_timeout_ms: 250,
                max_constraint_size: 10_000,
                max_search_iterations: 10_000,
                variable_resets: 1,
                real_precision: 4,
                max_negation_attempts: 20,
                ..base
            },
            Preset::Thorough => Self {
                solver_timeout_ms: 10_000,
                max_constraint_size: 1_000_000,
                max_search_iterations: 1_000_000,
                variable_resets: 5,
                real_precision: 8,
                max_negation_attempts: 1_000,
                ..base
            },
            Preset::Balanced | Preset::Custom => base,
        }
    }

    pub fn solver_timeout_ms(mut self, ms: u64) -> Self {
        self.solver_timeout_ms = ms;
        self
    }

    pub fn max_constraint_size(mut self, size: usize) -> Self {
        self.max_constraint_size = size;
        self
    }

    pub fn max_search_iterations(mut self, iterations: u64) -> Self {
        self.max_search_iterations = iterations;
        self
    }

    pub fn variable_resets(mut self, resets: u32) -> Self {
        self.variable_resets = resets;
        self
    }

    pub fn real_precision(mut self, digits: u32) -> Self {
        self.real_precision = digits;
        self
    }

    pub fn use_cone_of_influence(mut self, enabled: bool) -> Self {
        self.use_cone_of_influence = enabled;
        self
    }

    pub fn verify_models(mut self, enabled: bool) -> Self {
        self.verify_models = enabled;
        self
    }

    pub fn symbolic_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.symbolic_suffix = suffix.into();
        self
    }

    pub fn max_negation_attempts(mut self, attempts: usize) -> Self {
        self.max_negation_attempts = attempts;
        self
    }

    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    /// Validate and return self
    pub fn build(self) -> ConfigResult<Self> {
        self.validate()?;
        Ok(self)
    }

    pub fn solver_timeout(&self) -> Duration {
        Duration::from_millis(self.solver_timeout_ms)
    }

    /// Worker count with `0` resolved to the number of CPUs
    pub fn effective_worker_threads(&self) -> usize {
        if self.worker_threads == 0 {
            num_cpus::get()
        } else {
            self.worker_threads
        }
    }

    /// Local-search limits derived from this config
    pub fn avm_config(&self) -> AvmConfig {
        AvmConfig {
            max_iterations: self.max_search_iterations,
            variable_resets: self.variable_resets,
            real_precision: self.real_precision,
        }
    }

    /// `name` without the symbolic suffix
    pub fn strip_symbolic_suffix<'a>(&self, name: &'a str) -> &'a str {
        name.strip_suffix(self.symbolic_suffix.as_str())
            .unwrap_or(name)
    }

    /// Human-readable one-line summary
    pub fn describe(&self) -> String {
        format!(
            "preset={} timeout={}ms max_size={} iterations={} resets={} coi={}",
            self.preset,
            self.solver_timeout_ms,
            self.max_constraint_size,
            self.max_search_iterations,
            self.variable_resets,
            self.use_cone_of_influence
        )
    }
}

impl Validatable for DseConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_range(
            "solver_timeout_ms",
            self.solver_timeout_ms,
            1,
            600_000,
            "solver calls need a positive budget of at most ten minutes",
        )?;
        check_range(
            "max_constraint_size",
            self.max_constraint_size,
            1,
            10_000_000,
            "queries must be allowed at least one node",
        )?;
        check_range(
            "max_search_iterations",
            self.max_search_iterations,
            1,
            100_000_000,
            "local search needs a finite iteration budget",
        )?;
        check_range(
            "variable_resets",
            self.variable_resets,
            0,
            100,
            "restarts beyond a handful rarely help",
        )?;
        check_range(
            "real_precision",
            self.real_precision,
            0,
            15,
            "f64 carries about 15 significant decimal digits",
        )?;
        check_range(
            "max_negation_attempts",
            self.max_negation_attempts,
            1,
            100_000,
            "the generator must try at least one branch",
        )?;
        check_range(
            "worker_threads",
            self.worker_threads,
            0,
            1_024,
            "use 0 for one worker per CPU",
        )?;

        if self.symbolic_suffix.is_empty() {
            return Err(ConfigError::EmptySymbolicSuffix);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        for preset in [
            Preset::Fast,
            Preset::Balanced,
            Preset::Thorough,
            Preset::Custom,
        ] {
            assert!(DseConfig::preset(preset).validate().is_ok(), "{}", preset);
        }
    }

    #[test]
    fn test_preset_ordering() {
        let fast = DseConfig::preset(Preset::Fast);
        let balanced = DseConfig::preset(Preset::Balanced);
        let thorough = DseConfig::preset(Preset::Thorough);
        assert!(fast.solver_timeout_ms < balanced.solver_timeout_ms);
        assert!(balanced.solver_timeout_ms < thorough.solver_timeout_ms);
        assert!(fast.max_negation_attempts < thorough.max_negation_attempts);
        assert_eq!(DseConfig::preset(Preset::Custom).solver_timeout_ms, 1_000);
    }

    #[test]
    fn test_builder_and_validation() {
        let config = DseConfig::default()
            .solver_timeout_ms(50)
            .variable_resets(0)
            .build()
            .unwrap();
        assert_eq!(config.solver_timeout(), Duration::from_millis(50));

        let err = DseConfig::default().solver_timeout_ms(0).build().unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "solver_timeout_ms", .. }));

        assert!(matches!(
            DseConfig::default().symbolic_suffix("").build(),
            Err(ConfigError::EmptySymbolicSuffix)
        ));
    }

    #[test]
    fn test_strip_symbolic_suffix() {
        let config = DseConfig::default();
        assert_eq!(config.strip_symbolic_suffix("var0__SYM"), "var0");
        assert_eq!(config.strip_symbolic_suffix("var0"), "var0");
        // Only a trailing suffix is stripped
        assert_eq!(config.strip_symbolic_suffix("a__SYMb"), "a__SYMb");
    }

    #[test]
    fn test_avm_config_follows_budgets() {
        let avm = DseConfig::preset(Preset::Fast).avm_config();
        assert_eq!(avm.max_iterations, 10_000);
        assert_eq!(avm.variable_resets, 1);
        assert_eq!(avm.real_precision, 4);
    }

    #[test]
    fn test_effective_worker_threads() {
        assert_eq!(DseConfig::default().worker_threads(3).effective_worker_threads(), 3);
        assert!(DseConfig::default().effective_worker_threads() >= 1);
    }
}
