//! Connection settings for an NLU service.
//!
//! `NluConfig` derives `Deserialize` so it can sit inside a consumer's own
//! configuration file; `from_env` covers the common case of a test harness
//! or small tool that only has environment variables.

use std::fmt;
use std::time::Duration;

use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer};

use crate::error::NluError;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000";

pub const ENV_ENDPOINT: &str = "NLU_ENDPOINT";
pub const ENV_PROJECT: &str = "NLU_PROJECT";
pub const ENV_TOKEN: &str = "NLU_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "NLU_TIMEOUT_SECS";

#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct NluConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    pub project: String,
    pub token: String,
    /// Whole-call timeout in seconds. Unset means wait indefinitely; zero is
    /// rejected when loading and ignored by `timeout()`.
    #[serde(default, deserialize_with = "positive_secs")]
    pub timeout_secs: Option<u64>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn positive_secs<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = Option::<u64>::deserialize(deserializer)?;
    if secs == Some(0) {
        return Err(de::Error::invalid_value(
            Unexpected::Unsigned(0),
            &"a positive number of seconds",
        ));
    }
    Ok(secs)
}

impl NluConfig {
    pub fn new(endpoint: &str, project: &str, token: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            project: project.to_string(),
            token: token.to_string(),
            timeout_secs: None,
        }
    }

    pub fn from_env() -> Result<Self, NluError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, NluError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup(ENV_ENDPOINT).unwrap_or_else(default_endpoint);
        let project = lookup(ENV_PROJECT)
            .filter(|v| !v.is_empty())
            .ok_or(NluError::MissingConfig(ENV_PROJECT))?;
        let token = lookup(ENV_TOKEN)
            .filter(|v| !v.is_empty())
            .ok_or(NluError::MissingConfig(ENV_TOKEN))?;
        let timeout_secs = match lookup(ENV_TIMEOUT_SECS) {
            None => None,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(secs),
                _ => {
                    return Err(NluError::InvalidConfig {
                        key: ENV_TIMEOUT_SECS,
                        value: raw,
                    })
                }
            },
        };

        Ok(Self {
            endpoint,
            project,
            token,
            timeout_secs,
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }
}

impl fmt::Debug for NluConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NluConfig")
            .field("endpoint", &self.endpoint)
            .field("project", &self.project)
            .field("token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
