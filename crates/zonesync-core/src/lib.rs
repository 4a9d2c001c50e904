// # zonesync-core
//
// Core library for keeping a single A record in a registrar-hosted zone
// pointed at a given address.
//
// ## Architecture Overview
//
// - **domain**: splits a fully-qualified name into subdomain / SLD / TLD
// - **Transport**: trait for one raw exchange with the registrar API
// - **RegistrarClient**: credentials plus the bounded retry budget
// - **xml**: namespace-free view of response bodies and the extractors
// - **reconcile**: pure merge of one desired A record into a record set
// - **ZoneSync**: fetch → reconcile → push state machine
//
// ## Design Principles
//
// 1. **Transport is single-shot**: retry lives in the client, never below it
// 2. **Read before write**: a push only follows a successful fetch
// 3. **Full replacement**: the registrar overwrites the zone, so every
//    unrelated record is carried through unchanged
// 4. **Library-first**: the binary is a thin shell over this crate

pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod reconcile;
pub mod record;
pub mod sync;
pub mod traits;
pub mod xml;

// Re-export core types for convenience
pub use client::{RegistrarClient, RetryOutcome};
pub use config::{ApiCredentials, RecordDefaults, RegistrarConfig, RetryPolicy};
pub use domain::{ParsedDomain, SubdomainPolicy, ZoneIdentity, parse_domain};
pub use error::{Error, Result};
pub use reconcile::{Reconciled, reconcile};
pub use record::{HostRecord, RecordType};
pub use sync::{ChangeKind, SyncEvent, SyncReport, SyncRequest, SyncState, ZoneSync};
pub use traits::{ApiRequest, Command, RawResponse, Transport};
