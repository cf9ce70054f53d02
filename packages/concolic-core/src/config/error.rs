//! Errors raised while building, loading or saving a `DseConfig`

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric knob is outside its accepted range
    #[error("`{field}` = {value} is outside {bounds}: {hint}")]
    OutOfRange {
        field: &'static str,
        value: String,
        bounds: String,
        hint: &'static str,
    },

    #[error("config file has no `version` key (expected `version: 1`)")]
    MissingVersion,

    #[error("config version {found} is not supported (known: {})", join(supported))]
    UnsupportedVersion { found: u32, supported: Vec<u32> },

    #[error("no search preset named `{0}` (fast, balanced, thorough, custom)")]
    UnknownPreset(String),

    /// Model names could not be mapped back to test variables
    #[error("`symbolic_suffix` must not be empty")]
    EmptySymbolicSuffix,

    #[error("cannot access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

fn join(versions: &[u32]) -> String {
    versions
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ConfigError {
    pub fn out_of_range<T: std::fmt::Display>(
        field: &'static str,
        value: T,
        min: T,
        max: T,
        hint: &'static str,
    ) -> Self {
        Self::OutOfRange {
            field,
            value: value.to_string(),
            bounds: format!("{}..={}", min, max),
            hint,
        }
    }
}
