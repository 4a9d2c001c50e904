//! Test doubles and common utilities for contract tests
//!
//! [`ScriptedTransport`] plays back a fixed sequence of outcomes, one per
//! `send`, and records every request it receives.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use zonesync_core::error::{Error, Result};
use zonesync_core::traits::{ApiRequest, RawResponse, Transport};
use zonesync_core::{
    ApiCredentials, RecordDefaults, RegistrarClient, RetryPolicy, SyncEvent, ZoneSync,
};

/// One scripted outcome of a `send`
#[derive(Debug, Clone)]
pub enum Step {
    /// Return an HTTP response
    Respond(u16, String),
    /// Fail without a response
    Fail(String),
    /// Never answer
    Hang,
}

impl Step {
    pub fn ok(body: &str) -> Self {
        Step::Respond(200, body.to_string())
    }

    pub fn status(status: u16) -> Self {
        Step::Respond(status, String::new())
    }

    pub fn fail(msg: &str) -> Self {
        Step::Fail(msg.to_string())
    }
}

/// A transport that replays scripted steps and counts calls
#[derive(Clone)]
pub struct ScriptedTransport {
    steps: Arc<Mutex<VecDeque<Step>>>,
    call_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl ScriptedTransport {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: Arc::new(Mutex::new(steps.into_iter().collect())),
            call_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get the number of times send() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get every request received, in order
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Get the requests whose `Command` parameter matches
    pub fn requests_for(&self, command: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.param("Command") == Some(command))
            .collect()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Respond(status, body)) => Ok(RawResponse::new(status, body)),
            Some(Step::Fail(msg)) => Err(Error::http(msg)),
            Some(Step::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(Error::http("hung transport woke up"))
            }
            None => Err(Error::http("script exhausted")),
        }
    }

    fn transport_name(&self) -> &'static str {
        "scripted"
    }
}

pub fn credentials() -> ApiCredentials {
    ApiCredentials {
        api_user: "alice".to_string(),
        api_key: "s3cr3t-key".to_string(),
        username: "alice".to_string(),
        client_ip: "203.0.113.7".to_string(),
    }
}

/// Default policy: 3 attempts, 30s per attempt, no delay
pub fn client(transport: &ScriptedTransport) -> RegistrarClient {
    client_with(transport, RetryPolicy::default())
}

pub fn client_with(transport: &ScriptedTransport, retry: RetryPolicy) -> RegistrarClient {
    RegistrarClient::new(Box::new(transport.clone()), credentials(), retry)
        .expect("valid retry policy")
}

/// Orchestrator over a scripted transport with TTL default 1800
pub fn zone_sync(transport: &ScriptedTransport) -> (ZoneSync, tokio::sync::mpsc::Receiver<SyncEvent>) {
    ZoneSync::new(client(transport), RecordDefaults::default()).expect("valid defaults")
}

/// Drain every event currently buffered
pub fn drain(rx: &mut tokio::sync::mpsc::Receiver<SyncEvent>) -> Vec<SyncEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// getHosts body with the given `(name, type, address, ttl)` hosts
pub fn get_hosts_body(hosts: &[(&str, &str, &str, &str)]) -> String {
    let mut body = String::from(
        r#"<?xml version="1.0" encoding="utf-8"?>
<ApiResponse Status="OK" xmlns="http://api.namecheap.com/xml.response">
  <Errors />
  <RequestedCommand>namecheap.domains.dns.getHosts</RequestedCommand>
  <CommandResponse Type="namecheap.domains.dns.getHosts">
    <DomainDNSGetHostsResult Domain="example.com" IsUsingOurDNS="true">
"#,
    );
    for (i, (name, record_type, address, ttl)) in hosts.iter().enumerate() {
        body.push_str(&format!(
            "      <host HostId=\"{}\" Name=\"{}\" Type=\"{}\" Address=\"{}\" MXPref=\"10\" TTL=\"{}\" />\n",
            i + 1,
            name,
            record_type,
            address,
            ttl
        ));
    }
    body.push_str(
        r#"    </DomainDNSGetHostsResult>
  </CommandResponse>
</ApiResponse>"#,
    );
    body
}

/// setHosts body with the given IsSuccess value
pub fn set_hosts_body(is_success: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<ApiResponse Status="OK" xmlns="http://api.namecheap.com/xml.response">
  <Errors />
  <CommandResponse Type="namecheap.domains.dns.setHosts">
    <DomainDNSSetHostsResult Domain="example.com" IsSuccess="{}" />
  </CommandResponse>
</ApiResponse>"#,
        is_success
    )
}

/// Error body carrying one message
pub fn error_body(message: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<ApiResponse Status="ERROR" xmlns="http://api.namecheap.com/xml.response">
  <Errors>
    <Error Number="1011102">{}</Error>
  </Errors>
  <CommandResponse />
</ApiResponse>"#,
        message
    )
}
