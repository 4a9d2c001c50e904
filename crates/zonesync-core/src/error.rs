//! Error types for zone synchronization
//!
//! Every failure is terminal for the operation that raised it. The only
//! recovery in the crate is the bounded retry inside
//! [`RegistrarClient`](crate::client::RegistrarClient), which is invisible to
//! callers until the budget is spent.

use thiserror::Error;

/// Result type alias for zone sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for zone synchronization
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input could not be split into subdomain / SLD / TLD
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    /// A write was requested against the zone apex
    #[error("A subdomain is required (for example sub.{0})")]
    MissingSubdomain(String),

    /// Record address is not usable for the record type
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Single-attempt network failure reported by a transport
    #[error("HTTP error: {0}")]
    Http(String),

    /// Every attempt of a registrar call failed
    #[error("{command} failed after {attempts} attempt(s): {last_error}")]
    Transport {
        /// Wire name of the command
        command: String,
        /// Number of attempts made
        attempts: u32,
        /// Failure reported by the final attempt
        last_error: String,
    },

    /// Response body is not well-formed XML or violates the host schema
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Registrar returned well-formed XML carrying error messages
    #[error("API error from {command}: {}", messages.join("; "))]
    Api {
        /// Wire name of the command
        command: String,
        /// Messages reported by the registrar
        messages: Vec<String>,
    },

    /// The replacement set was sent but the registrar did not confirm it
    #[error("Registrar did not confirm the host update for {zone}{}", format_messages(messages))]
    PushNotConfirmed {
        /// Zone the push targeted
        zone: String,
        /// Error messages found in the response, if any
        messages: Vec<String>,
    },
}

fn format_messages(messages: &[String]) -> String {
    if messages.is_empty() {
        String::new()
    } else {
        format!(": {}", messages.join("; "))
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid domain error
    pub fn invalid_domain(msg: impl Into<String>) -> Self {
        Self::InvalidDomain(msg.into())
    }

    /// Create an invalid address error
    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::InvalidAddress(msg.into())
    }

    /// Create a single-attempt HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create a registrar API error
    pub fn api(command: impl Into<String>, messages: Vec<String>) -> Self {
        Self::Api {
            command: command.into(),
            messages,
        }
    }

    /// Whether the error was raised before any network activity
    ///
    /// Configuration and input errors are reported with a different exit
    /// status than failures of the sync itself.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::InvalidDomain(_)
                | Self::MissingSubdomain(_)
                | Self::InvalidAddress(_)
        )
    }
}
