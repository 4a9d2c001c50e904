//! Contract Test: Fetch → Reconcile → Push
//!
//! Constraints verified:
//! - a push is only ever sent after a successful fetch
//! - `Done` requires IsSuccess="true" from the registrar
//! - a dry run ends in `DryRun` and an inspection returns to `Idle`
//! - a failed push is reported, never retried on top of the client budget
//! - the pushed set is the live set minus the target's A records plus the
//!   desired record
//! - dry runs never send setHosts

mod common;

use common::*;
use std::net::Ipv4Addr;
use zonesync_core::error::Error;
use zonesync_core::{
    ChangeKind, HostRecord, RecordType, SubdomainPolicy, SyncEvent, SyncRequest, SyncState,
    ZoneIdentity, parse_domain,
};

const GET: &str = "namecheap.domains.dns.getHosts";
const SET: &str = "namecheap.domains.dns.setHosts";

fn request(name: &str, address: &str) -> SyncRequest {
    let target = parse_domain(name, SubdomainPolicy::Required).expect("valid name");
    SyncRequest::new(target, address).expect("valid request")
}

fn states(events: &[SyncEvent]) -> Vec<SyncState> {
    events
        .iter()
        .filter_map(|event| match event {
            SyncEvent::StateChanged { state } => Some(*state),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn replaces_existing_a_record_and_keeps_the_rest() {
    let transport = ScriptedTransport::new([
        Step::ok(&get_hosts_body(&[
            ("dev", "A", "1.1.1.1", "1800"),
            ("www", "A", "2.2.2.2", "600"),
            ("dev", "TXT", "hello", "1800"),
        ])),
        Step::ok(&set_hosts_body("true")),
    ]);
    let (sync, mut events) = zone_sync(&transport);

    let report = sync
        .apply(&request("dev.example.com", "9.9.9.9"))
        .await
        .expect("sync succeeds");

    assert!(report.pushed);
    assert_eq!(report.zone, ZoneIdentity::new("example", "com"));
    assert_eq!(report.host_name, "dev");
    assert_eq!(report.address, Ipv4Addr::new(9, 9, 9, 9));
    assert_eq!(
        report.change,
        ChangeKind::Updated {
            previous: vec!["1.1.1.1".to_string()]
        }
    );
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.records[2], HostRecord::a("dev", "9.9.9.9", 1800));

    let pushes = transport.requests_for(SET);
    assert_eq!(pushes.len(), 1);
    let push = &pushes[0];
    assert_eq!(push.param("SLD"), Some("example"));
    assert_eq!(push.param("TLD"), Some("com"));
    assert_eq!(push.param("HostName1"), Some("www"));
    assert_eq!(push.param("Address1"), Some("2.2.2.2"));
    assert_eq!(push.param("TTL1"), Some("600"));
    assert_eq!(push.param("HostName2"), Some("dev"));
    assert_eq!(push.param("RecordType2"), Some("TXT"));
    assert_eq!(push.param("HostName3"), Some("dev"));
    assert_eq!(push.param("RecordType3"), Some("A"));
    assert_eq!(push.param("Address3"), Some("9.9.9.9"));
    assert_eq!(push.param("MXPref3"), Some("10"));
    assert_eq!(push.param("TTL3"), Some("1800"));
    assert_eq!(push.param("HostName4"), None);

    let events = drain(&mut events);
    assert_eq!(
        states(&events),
        vec![
            SyncState::Fetching,
            SyncState::Reconciling,
            SyncState::Pushing,
            SyncState::Done
        ]
    );
    assert!(events.contains(&SyncEvent::Pushed {
        zone: ZoneIdentity::new("example", "com"),
        record_count: 3,
    }));
}

#[tokio::test]
async fn empty_zone_creates_single_record() {
    let transport = ScriptedTransport::new([
        Step::ok(&get_hosts_body(&[])),
        Step::ok(&set_hosts_body("true")),
    ]);
    let (sync, _events) = zone_sync(&transport);

    let report = sync.apply(&request("api.example.com", "5.5.5.5")).await.unwrap();

    assert_eq!(report.change, ChangeKind::Created);
    assert_eq!(report.records, vec![HostRecord::a("api", "5.5.5.5", 1800)]);
    let push = &transport.requests_for(SET)[0];
    assert_eq!(push.param("HostName1"), Some("api"));
    assert_eq!(push.param("HostName2"), None);
}

#[tokio::test]
async fn multi_label_suffix_is_sent_as_tld() {
    let transport = ScriptedTransport::new([
        Step::ok(&get_hosts_body(&[])),
        Step::ok(&set_hosts_body("true")),
    ]);
    let (sync, _events) = zone_sync(&transport);

    sync.apply(&request("a.b.example.co.uk", "5.5.5.5")).await.unwrap();

    for sent in transport.requests() {
        assert_eq!(sent.param("SLD"), Some("example"));
        assert_eq!(sent.param("TLD"), Some("co.uk"));
    }
    assert_eq!(transport.requests_for(SET)[0].param("HostName1"), Some("a.b"));
}

#[tokio::test]
async fn wildcard_host_is_written_as_star() {
    let transport = ScriptedTransport::new([
        Step::ok(&get_hosts_body(&[("*", "A", "1.1.1.1", "1800")])),
        Step::ok(&set_hosts_body("true")),
    ]);
    let (sync, _events) = zone_sync(&transport);

    let report = sync.apply(&request("*.example.com", "5.5.5.5")).await.unwrap();

    assert_eq!(report.host_name, "*");
    assert!(matches!(report.change, ChangeKind::Updated { .. }));
    let push = &transport.requests_for(SET)[0];
    assert_eq!(push.param("HostName1"), Some("*"));
    assert_eq!(push.param("Address1"), Some("5.5.5.5"));
    assert_eq!(push.param("HostName2"), None);
}

#[tokio::test]
async fn fetch_failure_never_pushes() {
    let transport = ScriptedTransport::new([
        Step::fail("connection refused"),
        Step::fail("connection refused"),
        Step::fail("connection refused"),
        Step::ok(&set_hosts_body("true")),
    ]);
    let (sync, mut events) = zone_sync(&transport);

    let err = sync
        .apply(&request("dev.example.com", "9.9.9.9"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport { attempts: 3, .. }));
    assert_eq!(transport.call_count(), 3);
    assert!(transport.requests_for(SET).is_empty());

    let events = drain(&mut events);
    assert_eq!(states(&events), vec![SyncState::Fetching, SyncState::Failed]);
    assert!(events.iter().any(|e| matches!(
        e,
        SyncEvent::Failed {
            state: SyncState::Fetching,
            ..
        }
    )));
}

#[tokio::test]
async fn api_error_on_fetch_aborts_without_push() {
    let transport = ScriptedTransport::new([Step::ok(&error_body("API Key is invalid"))]);
    let (sync, _events) = zone_sync(&transport);

    let err = sync
        .apply(&request("dev.example.com", "9.9.9.9"))
        .await
        .unwrap_err();

    match err {
        Error::Api { command, messages } => {
            assert_eq!(command, GET);
            assert_eq!(messages, vec!["API Key is invalid".to_string()]);
        }
        other => panic!("expected Api error, got {:?}", other),
    }
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn malformed_fetch_aborts_without_push() {
    let transport = ScriptedTransport::new([Step::ok("<ApiResponse><unclosed>")]);
    let (sync, _events) = zone_sync(&transport);

    let err = sync
        .apply(&request("dev.example.com", "9.9.9.9"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MalformedResponse(_)));
    assert!(transport.requests_for(SET).is_empty());
}

#[tokio::test]
async fn unconfirmed_push_fails_without_retry() {
    let transport = ScriptedTransport::new([
        Step::ok(&get_hosts_body(&[("dev", "A", "1.1.1.1", "1800")])),
        Step::ok(&set_hosts_body("false")),
        Step::ok(&set_hosts_body("true")),
    ]);
    let (sync, mut events) = zone_sync(&transport);

    let err = sync
        .apply(&request("dev.example.com", "9.9.9.9"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::PushNotConfirmed { .. }));
    assert_eq!(
        transport.call_count(),
        2,
        "A rejected push must not be re-sent"
    );

    let events = drain(&mut events);
    assert_eq!(states(&events).last(), Some(&SyncState::Failed));
    assert!(!states(&events).contains(&SyncState::Done));
}

#[tokio::test]
async fn push_error_messages_are_carried() {
    let transport = ScriptedTransport::new([
        Step::ok(&get_hosts_body(&[])),
        Step::ok(&error_body("Invalid address")),
    ]);
    let (sync, _events) = zone_sync(&transport);

    let err = sync
        .apply(&request("dev.example.com", "9.9.9.9"))
        .await
        .unwrap_err();

    match err {
        Error::PushNotConfirmed { zone, messages } => {
            assert_eq!(zone, "example.com");
            assert_eq!(messages, vec!["Invalid address".to_string()]);
        }
        other => panic!("expected PushNotConfirmed, got {:?}", other),
    }
}

#[tokio::test]
async fn push_transport_failure_uses_client_budget_only() {
    let transport = ScriptedTransport::new([
        Step::ok(&get_hosts_body(&[])),
        Step::status(503),
        Step::status(503),
        Step::status(503),
        Step::ok(&set_hosts_body("true")),
    ]);
    let (sync, _events) = zone_sync(&transport);

    let err = sync
        .apply(&request("dev.example.com", "9.9.9.9"))
        .await
        .unwrap_err();

    match err {
        Error::Transport {
            command, attempts, ..
        } => {
            assert_eq!(command, SET);
            assert_eq!(attempts, 3);
        }
        other => panic!("expected Transport error, got {:?}", other),
    }
    assert_eq!(transport.call_count(), 4);
}

#[tokio::test]
async fn dry_run_stops_before_push() {
    let transport = ScriptedTransport::new([
        Step::ok(&get_hosts_body(&[("dev", "A", "1.1.1.1", "1800")])),
        Step::ok(&set_hosts_body("true")),
    ]);
    let (sync, mut events) = zone_sync(&transport);

    let report = sync
        .apply(&request("dev.example.com", "9.9.9.9").with_dry_run(true))
        .await
        .unwrap();

    assert!(!report.pushed);
    assert_eq!(report.records, vec![HostRecord::a("dev", "9.9.9.9", 1800)]);
    assert!(transport.requests_for(SET).is_empty());

    let events = drain(&mut events);
    assert_eq!(
        states(&events),
        vec![SyncState::Fetching, SyncState::Reconciling, SyncState::DryRun]
    );
    assert!(!states(&events).contains(&SyncState::Done));
    assert!(events.iter().any(|e| matches!(e, SyncEvent::DryRun { .. })));
}

#[tokio::test]
async fn records_without_ttl_get_default_on_write_path() {
    let transport = ScriptedTransport::new([
        Step::ok(&get_hosts_body(&[("www", "CNAME", "example.com.", "")])),
        Step::ok(&set_hosts_body("true")),
    ]);
    let (sync, _events) = zone_sync(&transport);

    let report = sync.apply(&request("dev.example.com", "9.9.9.9")).await.unwrap();

    assert_eq!(report.records[0].record_type, RecordType::Cname);
    assert_eq!(report.records[0].ttl, Some(1800));
    assert_eq!(transport.requests_for(SET)[0].param("TTL1"), Some("1800"));
}

#[tokio::test]
async fn inspect_reads_without_writing() {
    let transport = ScriptedTransport::new([Step::ok(&get_hosts_body(&[
        ("@", "A", "192.0.2.1", "1800"),
        ("www", "CNAME", "example.com.", ""),
    ]))]);
    let (sync, mut events) = zone_sync(&transport);

    let records = sync
        .inspect(&ZoneIdentity::new("example", "com"))
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].host_name, "@");
    assert_eq!(records[1].ttl, None, "inspection keeps TTLs as returned");
    assert_eq!(transport.call_count(), 1);
    assert!(transport.requests_for(SET).is_empty());
    assert_eq!(
        states(&drain(&mut events)),
        vec![SyncState::Fetching, SyncState::Idle]
    );
}

#[tokio::test]
async fn fetch_sends_credentials_and_zone() {
    let transport = ScriptedTransport::new([Step::ok(&get_hosts_body(&[]))]);
    let (sync, _events) = zone_sync(&transport);

    sync.inspect(&ZoneIdentity::new("example", "com")).await.unwrap();

    let fetch = &transport.requests_for(GET)[0];
    assert_eq!(fetch.param("ApiUser"), Some("alice"));
    assert_eq!(fetch.param("UserName"), Some("alice"));
    assert_eq!(fetch.param("ClientIp"), Some("203.0.113.7"));
    assert_eq!(fetch.param("SLD"), Some("example"));
    assert_eq!(fetch.param("TLD"), Some("com"));
}
