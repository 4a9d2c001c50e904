//! Registrar API client with bounded retry
//!
//! [`RegistrarClient`] wraps a single-shot [`Transport`] with the retry
//! budget from [`RetryPolicy`]:
//!
//! - a network failure, a per-attempt timeout, and a non-2xx status all
//!   consume one attempt from the same budget
//! - the first 2xx response ends the loop; its body is returned unread
//! - when the budget is spent the call fails with [`Error::Transport`]
//!
//! A 2xx response is not proof of success. The registrar reports
//! application errors inside the XML body, which the caller checks with
//! the [`xml`](crate::xml) extractors.

use crate::config::{ApiCredentials, RetryPolicy};
use crate::error::{Error, Result};
use crate::traits::{ApiRequest, Command, RawResponse, Transport};
use tracing::{debug, info, warn};

/// Maximum number of characters of a response body written to logs
const LOG_BODY_LIMIT: usize = 256;

/// Tagged result of a bounded retry loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome {
    /// A 2xx response was received
    Success {
        /// The successful response
        response: RawResponse,
        /// Attempts used, including the successful one
        attempts: u32,
    },
    /// Every attempt failed
    Exhausted {
        /// Attempts made
        attempts: u32,
        /// Failure of the final attempt
        last_error: String,
    },
}

/// Registrar API client
///
/// Owns the credentials sent with every command and the retry policy. It
/// does not know the shape of any command's response.
pub struct RegistrarClient {
    transport: Box<dyn Transport>,
    credentials: ApiCredentials,
    retry: RetryPolicy,
}

impl RegistrarClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the retry policy is invalid.
    pub fn new(
        transport: Box<dyn Transport>,
        credentials: ApiCredentials,
        retry: RetryPolicy,
    ) -> Result<Self> {
        retry.validate()?;
        Ok(Self {
            transport,
            credentials,
            retry,
        })
    }

    /// The retry policy in force
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Build a request carrying the credential parameters
    ///
    /// `ApiUser`, `ApiKey`, `UserName`, `Command` and `ClientIp` come first,
    /// followed by `params` in order.
    pub fn request(&self, command: Command, params: Vec<(String, String)>) -> ApiRequest {
        let mut request = ApiRequest::new(command)
            .with_param("ApiUser", self.credentials.api_user.as_str())
            .with_param("ApiKey", self.credentials.api_key.as_str())
            .with_param("UserName", self.credentials.username.as_str())
            .with_param("Command", command.as_str())
            .with_param("ClientIp", self.credentials.client_ip.as_str());
        request.params.extend(params);
        request
    }

    /// Issue a command and return the body of the first 2xx response
    ///
    /// # Errors
    ///
    /// [`Error::Transport`] carrying the attempt count once every attempt
    /// has failed.
    pub async fn call(&self, command: Command, params: Vec<(String, String)>) -> Result<String> {
        let request = self.request(command, params);

        match self.execute_with_retry(&request).await {
            RetryOutcome::Success { response, attempts } => {
                debug!(
                    "{} succeeded on attempt {}: {}",
                    command,
                    attempts,
                    truncate_for_log(&response.body)
                );
                Ok(response.body)
            }
            RetryOutcome::Exhausted {
                attempts,
                last_error,
            } => Err(Error::Transport {
                command: command.as_str().to_string(),
                attempts,
                last_error,
            }),
        }
    }

    /// Run the bounded retry loop for one request
    pub async fn execute_with_retry(&self, request: &ApiRequest) -> RetryOutcome {
        let max_attempts = self.retry.max_attempts;
        let mut last_error = String::from("no attempt was made");

        for attempt in 1..=max_attempts {
            info!(
                attempt,
                max_attempts,
                command = %request.command,
                transport = self.transport.transport_name(),
                "Registrar API call"
            );

            match tokio::time::timeout(self.retry.attempt_timeout(), self.transport.send(request))
                .await
            {
                Ok(Ok(response)) if response.is_success() => {
                    return RetryOutcome::Success {
                        response,
                        attempts: attempt,
                    };
                }
                Ok(Ok(response)) => {
                    warn!(
                        "Received status code {} for {}, attempt {}/{}",
                        response.status, request.command, attempt, max_attempts
                    );
                    last_error = format!("HTTP status {}", response.status);
                }
                Ok(Err(e)) => {
                    warn!(
                        "Request error for {} on attempt {}/{}: {}",
                        request.command, attempt, max_attempts, e
                    );
                    last_error = e.to_string();
                }
                Err(_) => {
                    warn!(
                        "Request for {} timed out after {:?}, attempt {}/{}",
                        request.command,
                        self.retry.attempt_timeout(),
                        attempt,
                        max_attempts
                    );
                    last_error = format!(
                        "attempt timed out after {}s",
                        self.retry.attempt_timeout_secs
                    );
                }
            }

            if attempt < max_attempts {
                info!("Retrying {}...", request.command);
                let delay = self.retry.retry_delay();
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }

        RetryOutcome::Exhausted {
            attempts: max_attempts,
            last_error,
        }
    }
}

/// Truncate a response body for logging
pub(crate) fn truncate_for_log(s: &str) -> String {
    if s.len() <= LOG_BODY_LIMIT {
        return s.to_string();
    }
    let mut end = LOG_BODY_LIMIT;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated, total {} bytes]", &s[..end], s.len())
}
