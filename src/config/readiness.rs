use std::time::Duration;

use crate::config::file::ReadinessSection;
use crate::config::helpers::{EnvSource, parse_optional_env};
use crate::error::ConfigError;
use crate::readiness::ReadinessPolicy;

/// Readiness polling configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessConfig {
    /// Maximum number of probes before giving up.
    pub max_attempts: u32,
    /// Seconds slept before each probe.
    pub interval_secs: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval_secs: 5,
        }
    }
}

impl ReadinessConfig {
    pub(crate) fn resolve(
        env: &dyn EnvSource,
        file: &ReadinessSection,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            max_attempts: parse_optional_env(
                env,
                "DOCKERUP_READY_MAX_ATTEMPTS",
                file.max_attempts.unwrap_or(defaults.max_attempts),
            )?,
            interval_secs: parse_optional_env(
                env,
                "DOCKERUP_READY_INTERVAL_SECS",
                file.interval_secs.unwrap_or(defaults.interval_secs),
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DOCKERUP_READY_INTERVAL_SECS".to_string(),
                message: "must be at least 1 second".to_string(),
            });
        }
        Ok(())
    }

    pub fn to_policy(&self) -> ReadinessPolicy {
        ReadinessPolicy {
            max_attempts: self.max_attempts,
            interval: Duration::from_secs(self.interval_secs),
        }
    }
}
