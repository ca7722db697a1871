use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::ConfigError;

/// Where configuration variables are read from.
pub trait EnvSource {
    /// Raw value of `key`, if set.
    fn var(&self, key: &str) -> Result<Option<String>, ConfigError>;
}

/// The process environment (after `.env` has been loaded by `dotenvy`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Result<Option<String>, ConfigError> {
        match std::env::var(key) {
            Ok(v) => Ok(Some(v)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: "not valid UTF-8".to_string(),
            }),
        }
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.get(key).cloned())
    }
}

/// Read `key`, treating an empty value as unset.
pub(crate) fn optional_env(env: &dyn EnvSource, key: &str) -> Result<Option<String>, ConfigError> {
    Ok(env.var(key)?.filter(|v| !v.trim().is_empty()))
}

/// Parse `key` if set, otherwise return `default`.
pub(crate) fn parse_optional_env<T>(
    env: &dyn EnvSource,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    optional_env(env, key)?
        .map(|s| s.trim().parse::<T>())
        .transpose()
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })
        .map(|v| v.unwrap_or(default))
}

/// Parse a boolean flag if set, otherwise return `default`.
pub(crate) fn parse_bool_env(
    env: &dyn EnvSource,
    key: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    optional_env(env, key)?
        .map(|s| s.trim().parse())
        .transpose()
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("must be 'true' or 'false': {e}"),
        })
        .map(|v| v.unwrap_or(default))
}
