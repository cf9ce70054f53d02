//! Configuration I/O (YAML)
//!
//! Schema v1:
//!
//! ```yaml
//! version: 1
//! preset: fast
//! overrides:
//!   solver_timeout_ms: 500
//!   use_cone_of_influence: false
//! ```

use super::dse_config::DseConfig;
use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;
use super::validation::Validatable;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported schema versions
pub const SUPPORTED_VERSIONS: &[u32] = &[1];

/// On-disk form of a `DseConfig`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigExportV1 {
    /// Required; absent only in malformed files
    #[serde(default)]
    pub version: Option<u32>,

    /// Preset the overrides are applied on top of
    pub preset: String,

    /// Values that differ from the preset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<ConfigOverrides>,
}

/// Field overrides applied on top of the preset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver_timeout_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_constraint_size: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_search_iterations: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_resets: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_precision: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_cone_of_influence: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_models: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbolic_suffix: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_negation_attempts: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_threads: Option<usize>,
}

impl ConfigOverrides {
    fn apply(self, config: &mut DseConfig) {
        macro_rules! apply {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = self.$field {
                    config.$field = value;
                })*
            };
        }
        apply!(
            solver_timeout_ms,
            max_constraint_size,
            max_search_iterations,
            variable_resets,
            real_precision,
            use_cone_of_influence,
            verify_models,
            symbolic_suffix,
            max_negation_attempts,
            worker_threads,
        );
    }

    /// Every field of `config` that differs from `base`
    fn diff(config: &DseConfig, base: &DseConfig) -> Self {
        macro_rules! diff {
            ($($field:ident),* $(,)?) => {
                Self {
                    $($field: (config.$field != base.$field).then(|| config.$field.clone()),)*
                }
            };
        }
        diff!(
            solver_timeout_ms,
            max_constraint_size,
            max_search_iterations,
            variable_resets,
            real_precision,
            use_cone_of_influence,
            verify_models,
            symbolic_suffix,
            max_negation_attempts,
            worker_threads,
        )
    }
}

impl DseConfig {
    /// Parse and validate a v1 YAML document
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let export: ConfigExportV1 = serde_yaml::from_str(content)?;

        let version = export.version.ok_or(ConfigError::MissingVersion)?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let preset: Preset = export.preset.parse()?;

        let mut config = Self::preset(preset);
        if let Some(overrides) = export.overrides {
            overrides.apply(&mut config);
        }
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a v1 YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Export as v1 YAML; only values that differ from the preset are written
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let overrides = ConfigOverrides::diff(self, &Self::preset(self.preset));
        let export = ConfigExportV1 {
            version: Some(1),
            preset: self.preset.to_string(),
            overrides: (overrides != ConfigOverrides::default()).then_some(overrides),
        };
        serde_yaml::to_string(&export).map_err(ConfigError::Yaml)
    }

    pub fn save_yaml(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }
}
