// # Transport Trait
//
// Defines the interface for sending one registrar API request over the wire.
//
// ## Implementations
//
// - HTTP GET with query-string parameters: `zonesync-transport-http` crate
// - Scripted stubs in the core contract tests
//
// ## Usage
//
// ```rust,ignore
// use zonesync_core::traits::{ApiRequest, Command, Transport};
//
// let request = ApiRequest::new(Command::GetHosts)
//     .with_param("SLD", "example")
//     .with_param("TLD", "com");
// let response = transport.send(&request).await?;
// ```

use async_trait::async_trait;
use std::fmt;

/// Registrar API command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// List every host record of a zone
    GetHosts,
    /// Replace every host record of a zone
    SetHosts,
}

impl Command {
    /// Wire name sent in the `Command` parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::GetHosts => "namecheap.domains.dns.getHosts",
            Command::SetHosts => "namecheap.domains.dns.setHosts",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One registrar API request: a command plus ordered query parameters
#[derive(Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// Command being issued
    pub command: Command,
    /// Query parameters in the order they are sent
    pub params: Vec<(String, String)>,
}

impl ApiRequest {
    /// Create a request with no parameters
    pub fn new(command: Command) -> Self {
        Self {
            command,
            params: Vec::new(),
        }
    }

    /// Append a parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Append a parameter in place
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.push((key.into(), value.into()));
    }

    /// Look up a parameter value
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

// Custom Debug implementation that hides the API key
impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<(&str, &str)> = self
            .params
            .iter()
            .map(|(k, v)| {
                if k == "ApiKey" {
                    (k.as_str(), "<REDACTED>")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();

        f.debug_struct("ApiRequest")
            .field("command", &self.command)
            .field("params", &params)
            .finish()
    }
}

/// Status and body of one HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
}

impl RawResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for registrar transports
///
/// A transport performs exactly ONE exchange per call. Retry, timeouts
/// across attempts, and interpretation of the body belong to
/// [`RegistrarClient`](crate::client::RegistrarClient).
///
/// # Returns
///
/// - `Ok(RawResponse)`: an HTTP response was received, whatever its status
/// - `Err(Error::Http)`: no response (connection, TLS, read failure)
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return the raw response
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, crate::Error>;

    /// Transport name (for logging)
    fn transport_name(&self) -> &'static str;
}
