//! Search Configuration
//!
//! Two tiers:
//! - Preset: one-liner budgets (`fast`, `balanced`, `thorough`)
//! - Override: builder methods or a versioned YAML file
//!
//! # Examples
//!
//! ```rust,ignore
//! use concolic_core::config::{DseConfig, Preset};
//!
//! let config = DseConfig::preset(Preset::Fast).solver_timeout_ms(500).build()?;
//! let config = DseConfig::from_yaml("dse.yaml")?;
//! ```

pub mod dse_config;
pub mod error;
pub mod io;
pub mod preset;
pub mod validation;

pub use dse_config::{DseConfig, DEFAULT_SYMBOLIC_SUFFIX};
pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigExportV1, ConfigOverrides};
pub use preset::Preset;
pub use validation::Validatable;
