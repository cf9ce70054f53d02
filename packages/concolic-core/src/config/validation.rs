//! Configuration validation

use super::error::{ConfigError, ConfigResult};

/// Implemented by every config struct that can be rejected before a session
/// starts.
///
/// ```rust,ignore
/// use concolic_core::config::{DseConfig, Validatable};
///
/// let config = DseConfig::from_yaml("dse.yaml")?;
/// config.validate()?;
/// ```
pub trait Validatable {
    fn validate(&self) -> ConfigResult<()>;
}

/// Inclusive bounds check
pub(crate) fn check_range<T>(
    field: &'static str,
    value: T,
    min: T,
    max: T,
    hint: &'static str,
) -> ConfigResult<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min || value > max {
        return Err(ConfigError::out_of_range(field, value, min, max, hint));
    }
    Ok(())
}
