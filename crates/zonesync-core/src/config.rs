//! Configuration types for zone synchronization
//!
//! The core only consumes configuration; loading it (environment, `.env`
//! files) is the binary's job.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Registrar connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrarConfig {
    /// API endpoint URL (e.g. "https://api.namecheap.com/xml.response")
    pub endpoint: String,

    /// Account credentials sent with every command
    pub credentials: ApiCredentials,

    /// Retry budget for each registrar call
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl RegistrarConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        let mut missing = Vec::new();
        if self.endpoint.trim().is_empty() {
            missing.push("endpoint");
        }
        missing.extend(self.credentials.missing_fields());

        if !missing.is_empty() {
            return Err(crate::Error::config(format!(
                "missing required value(s): {}",
                missing.join(", ")
            )));
        }

        if !self.endpoint.starts_with("https://") && !self.endpoint.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "endpoint must use HTTP or HTTPS scheme. Got: {}",
                self.endpoint
            )));
        }

        self.retry.validate()
    }
}

/// Account credentials for the registrar API
///
/// The Debug implementation does NOT expose the API key.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiCredentials {
    /// API user name
    pub api_user: String,
    /// API key
    pub api_key: String,
    /// Account user name the command acts on
    pub username: String,
    /// Client IP allow-listed with the registrar
    pub client_ip: String,
}

impl ApiCredentials {
    fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("api_user", &self.api_user),
            ("api_key", &self.api_key),
            ("username", &self.username),
            ("client_ip", &self.client_ip),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_user", &self.api_user)
            .field("api_key", &"<REDACTED>")
            .field("username", &self.username)
            .field("client_ip", &self.client_ip)
            .finish()
    }
}

/// Bounded retry policy for registrar calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Upper bound on a single attempt (in seconds)
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,

    /// Pause between attempts (in seconds)
    #[serde(default)]
    pub retry_delay_secs: u64,
}

impl RetryPolicy {
    /// Validate the retry policy
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.max_attempts == 0 {
            return Err(crate::Error::config("max_attempts must be at least 1"));
        }
        if self.attempt_timeout_secs == 0 {
            return Err(crate::Error::config("attempt_timeout_secs must be > 0"));
        }
        Ok(())
    }

    /// Per-attempt timeout
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    /// Delay between attempts
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
            retry_delay_secs: 0,
        }
    }
}

/// Values applied to records created or rewritten on the write path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDefaults {
    /// TTL for new records and records the registrar returned without one
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Address used when the caller does not supply one
    #[serde(default)]
    pub address: Option<String>,
}

impl RecordDefaults {
    /// Validate the defaults
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.ttl == 0 {
            return Err(crate::Error::config("default TTL must be > 0"));
        }
        Ok(())
    }
}

impl Default for RecordDefaults {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            address: None,
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_attempt_timeout_secs() -> u64 {
    30
}

fn default_ttl() -> u32 {
    1800
}
