//! Named search budgets
//!
//! | preset     | timeout | AVM iterations | resets | negations |
//! |------------|---------|----------------|--------|-----------|
//! | `fast`     | 250ms   | 10k            | 1      | 20        |
//! | `balanced` | 1s      | 100k           | 2      | 100       |
//! | `thorough` | 10s     | 1M             | 5      | 1000      |
//!
//! `custom` starts from `balanced` and marks a config whose values come from
//! overrides.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// CI runs
    Fast,
    #[default]
    Balanced,
    /// Deep exploration of hard branches
    Thorough,
    Custom,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Self::Fast, Self::Balanced, Self::Thorough, Self::Custom];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Thorough => "thorough",
            Self::Custom => "custom",
        }
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    /// Case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
