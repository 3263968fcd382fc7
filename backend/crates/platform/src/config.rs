//! Environment-driven configuration helpers
//!
//! Settings come from process environment variables (after `.env` is loaded
//! by the binary). Reading goes through [`EnvSource`] so that tests can feed
//! a plain map instead of mutating the process environment.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

use crate::secret::SecretKey;

/// Name of the variable selecting the deployment environment
pub const APP_ENV_KEY: &str = "APP_ENV";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },

    #[error("Refusing to start with a publicly known test secret in {0}")]
    InsecureSecret(String),
}

/// Deployment environment
///
/// Anything other than `Production` may fall back to gateway sandbox
/// credentials. When `APP_ENV` is unset the service assumes production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnvironment {
    #[default]
    Production,
    Development,
    Test,
}

impl AppEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppEnvironment::Production => "production",
            AppEnvironment::Development => "development",
            AppEnvironment::Test => "test",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, AppEnvironment::Production)
    }
}

impl FromStr for AppEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(AppEnvironment::Production),
            "development" | "dev" => Ok(AppEnvironment::Development),
            "test" => Ok(AppEnvironment::Test),
            other => Err(format!(
                "expected production, development or test (got {other:?})"
            )),
        }
    }
}

impl Display for AppEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source of configuration values
pub trait EnvSource {
    /// Raw lookup
    fn get(&self, key: &str) -> Option<String>;

    /// Trimmed value; empty strings count as unset
    fn optional(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }

    fn parsed<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.optional(key)
            .map(|raw| {
                raw.parse::<T>().map_err(|e| ConfigError::Invalid {
                    key: key.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    fn secret(&self, key: &str) -> Option<SecretKey> {
        self.optional(key).map(SecretKey::new)
    }

    fn environment(&self) -> Result<AppEnvironment, ConfigError> {
        Ok(self.parsed(APP_ENV_KEY)?.unwrap_or_default())
    }
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl EnvSource for HashMap<&str, &str> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).map(|v| v.to_string())
    }
}
