//! General application configuration.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Brasília time, which has had no daylight saving since 2019.
const fn default_utc_offset_hours() -> i32 {
    -3
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Fixed offset used for local dates, month buckets, and displays.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

impl GeneralConfig {
    /// The configured offset as a chrono timezone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] outside −12..=14 hours.
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            field: "general.utc_offset_hours".to_string(),
            reason: format!("{} is outside -12..=14", self.utc_offset_hours),
        };
        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(invalid());
        }
        FixedOffset::east_opt(self.utc_offset_hours * 3600).ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert_eq!(config.utc_offset_hours, -3);
        assert_eq!(config.offset().unwrap().local_minus_utc(), -3 * 3600);
    }

    #[test]
    fn rejects_out_of_range_offset() {
        let config = GeneralConfig {
            utc_offset_hours: 15,
        };
        assert!(matches!(
            config.offset(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
