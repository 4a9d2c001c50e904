// # HTTP Registrar Transport
//
// Sends one registrar API request as an HTTPS GET with every parameter in
// the query string, and hands back the raw status and body.
//
// ## Constraints
//
// - One request per `send`. Retry and the attempt budget are owned by
//   `RegistrarClient`; this crate never loops.
// - Non-2xx statuses are returned, not turned into errors, so the client
//   can count them against the budget.
// - The body is returned unread. XML handling lives in the core crate.
//
// ## Security
//
// The query string carries the API key, so request URLs are never logged
// and the Debug impl does not show the key.
//
// ## API Reference
//
// - Production endpoint: https://api.namecheap.com/xml.response
// - Sandbox endpoint: https://api.sandbox.namecheap.com/xml.response

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use zonesync_core::traits::{ApiRequest, RawResponse, Transport};
use zonesync_core::{Error, RegistrarClient, RegistrarConfig, Result};

/// HTTP transport for the registrar XML API
#[derive(Clone)]
pub struct HttpTransport {
    /// Full URL of the API endpoint
    endpoint: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Create a new transport
    ///
    /// `timeout` bounds a single request end to end. The client enforces
    /// its own per-attempt limit on top of this.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the endpoint is empty or the HTTP client cannot
    /// be built.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(Error::config("registrar endpoint cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { endpoint, client })
    }

    /// Endpoint requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse> {
        debug!(
            "GET {} ({}, {} params)",
            self.endpoint,
            request.command,
            request.params.len()
        );

        let response = self
            .client
            .get(&self.endpoint)
            .query(&request.params)
            .send()
            .await
            // The URL carries the API key
            .map_err(|e| Error::http(format!("request failed: {}", e.without_url())))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("failed to read response body: {}", e.without_url())))?;

        debug!("{} answered with status {}", request.command, status);

        Ok(RawResponse::new(status, body))
    }

    fn transport_name(&self) -> &'static str {
        "http"
    }
}

/// Build a [`RegistrarClient`] that talks HTTP to `config.endpoint`
///
/// # Errors
///
/// [`Error::Config`] if the configuration is invalid.
pub fn registrar_client(config: &RegistrarConfig) -> Result<RegistrarClient> {
    config.validate()?;

    let transport = HttpTransport::new(&config.endpoint, config.retry.attempt_timeout())?;
    RegistrarClient::new(
        Box::new(transport),
        config.credentials.clone(),
        config.retry,
    )
}
