//! Settings loaded from the environment
//!
//! Values come from the process environment, after an optional `.env` file
//! in the working directory has been merged in by `main`.

use anyhow::{Context, Result};
use zonesync_core::{ApiCredentials, RecordDefaults, RegistrarConfig, RetryPolicy};

/// Production endpoint used when `NAMECHEAP_API_URL` is unset
pub const DEFAULT_ENDPOINT: &str = "https://api.namecheap.com/xml.response";

/// Everything the binary needs besides command-line arguments
#[derive(Debug, Clone)]
pub struct Settings {
    pub registrar: RegistrarConfig,
    pub defaults: RecordDefaults,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup
    ///
    /// Missing credentials are not an error here; [`Settings::validate`]
    /// reports them all at once.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let registrar = RegistrarConfig {
            endpoint: var("NAMECHEAP_API_URL").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            credentials: ApiCredentials {
                api_user: var("NAMECHEAP_API_USER").unwrap_or_default(),
                api_key: var("NAMECHEAP_API_KEY").unwrap_or_default(),
                username: var("NAMECHEAP_USERNAME").unwrap_or_default(),
                client_ip: var("NAMECHEAP_CLIENT_IP").unwrap_or_default(),
            },
            retry: RetryPolicy {
                max_attempts: parse_or(&var, "ZONESYNC_MAX_ATTEMPTS", 3)?,
                attempt_timeout_secs: parse_or(&var, "ZONESYNC_TIMEOUT_SECS", 30)?,
                retry_delay_secs: parse_or(&var, "ZONESYNC_RETRY_DELAY_SECS", 0)?,
            },
        };

        let defaults = RecordDefaults {
            ttl: parse_or(&var, "DEFAULT_TTL", 1800)?,
            address: var("DEFAULT_IP"),
        };

        Ok(Self {
            registrar,
            defaults,
        })
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        self.registrar
            .validate()
            .context("set NAMECHEAP_API_USER, NAMECHEAP_API_KEY, NAMECHEAP_USERNAME and NAMECHEAP_CLIENT_IP in the environment or a .env file")?;
        self.defaults.validate()?;

        if self.registrar.retry.max_attempts > 10 {
            anyhow::bail!(
                "ZONESYNC_MAX_ATTEMPTS must be between 1 and 10. Got: {}",
                self.registrar.retry.max_attempts
            );
        }

        if self.registrar.endpoint.starts_with("http://") {
            eprintln!(
                "WARNING: NAMECHEAP_API_URL uses HTTP (not HTTPS). \
                 The API key is sent in the query string."
            );
        }

        Ok(())
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} must be a non-negative integer. Got: {}", key, raw)),
        None => Ok(default),
    }
}
