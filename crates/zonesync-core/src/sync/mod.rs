//! Zone sync orchestrator
//!
//! [`ZoneSync`] sequences one write as fetch → reconcile → push:
//!
//! ```text
//! Idle ──► Fetching ──► Reconciling ──► Pushing ──► Done
//!              │              │            │
//!              │              └──► DryRun  │
//!              │                           │
//!              └────────► Failed ◄─────────┘
//! ```
//!
//! - A failed fetch never leads to a push: nothing is written on the basis
//!   of an unconfirmed read.
//! - `Done` requires the registrar's own success flag; HTTP success alone
//!   is not enough. A dry run ends in `DryRun` and a read-only
//!   [`ZoneSync::inspect`] returns to `Idle`, so `Done` always means a
//!   confirmed write.
//! - Nothing is retried here beyond the per-call retry inside
//!   [`RegistrarClient`]. A failed push is surfaced, not re-attempted,
//!   because the zone may have changed in the meantime and a blind
//!   full-zone overwrite could clobber those changes.
//!
//! ## Known limitation
//!
//! The zone is shared state with no locking at the registrar. A change
//! made by someone else between our fetch and our push is overwritten.

use crate::client::RegistrarClient;
use crate::config::RecordDefaults;
use crate::domain::{ParsedDomain, ZoneIdentity};
use crate::error::{Error, Result};
use crate::reconcile::reconcile;
use crate::record::HostRecord;
use crate::traits::Command;
use crate::xml;
use std::fmt;
use std::net::Ipv4Addr;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Capacity of the sync event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Phase of a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Fetching,
    Reconciling,
    Pushing,
    Done,
    /// Reconciled, push skipped on request
    DryRun,
    Failed,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncState::Idle => "idle",
            SyncState::Fetching => "fetching",
            SyncState::Reconciling => "reconciling",
            SyncState::Pushing => "pushing",
            SyncState::Done => "done",
            SyncState::DryRun => "dry-run",
            SyncState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Events emitted by [`ZoneSync`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The run entered a new state
    StateChanged { state: SyncState },

    /// Live records were fetched
    Fetched {
        zone: ZoneIdentity,
        record_count: usize,
    },

    /// The replacement set was computed
    Reconciled {
        record_count: usize,
        displaced: usize,
    },

    /// The registrar confirmed the replacement set
    Pushed {
        zone: ZoneIdentity,
        record_count: usize,
    },

    /// A dry run stopped before pushing
    DryRun {
        zone: ZoneIdentity,
        record_count: usize,
    },

    /// The run failed in the given state
    Failed { state: SyncState, error: String },
}

/// A validated request to point one host name at an IPv4 address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    /// Target name; never a zone apex
    pub target: ParsedDomain,
    /// IPv4 address for the A record
    pub address: Ipv4Addr,
    /// Stop after reconciling and log what would be pushed
    pub dry_run: bool,
}

impl SyncRequest {
    /// Validate a write request
    ///
    /// # Errors
    ///
    /// - [`Error::MissingSubdomain`] if `target` is a zone apex
    /// - [`Error::InvalidAddress`] if `address` is not an IPv4 literal
    pub fn new(target: ParsedDomain, address: &str) -> Result<Self> {
        if target.is_apex() {
            return Err(Error::MissingSubdomain(target.zone.to_string()));
        }

        let address = address.trim().parse::<Ipv4Addr>().map_err(|_| {
            Error::invalid_address(format!(
                "'{}' is not an IPv4 address (A records only)",
                address.trim()
            ))
        })?;

        Ok(Self {
            target,
            address,
            dry_run: false,
        })
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// How the target record changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    /// No A record existed at the target name
    Created,
    /// Prior A records were replaced
    Updated {
        /// Addresses of the replaced records
        previous: Vec<String>,
    },
}

/// Result of a successful write run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Zone that was written
    pub zone: ZoneIdentity,
    /// Host label of the A record
    pub host_name: String,
    /// Address of the A record
    pub address: Ipv4Addr,
    /// Whether the record was created or replaced
    pub change: ChangeKind,
    /// Complete record set that was (or would have been) pushed
    pub records: Vec<HostRecord>,
    /// False for dry runs
    pub pushed: bool,
}

/// Zone sync orchestrator
///
/// Runs are strictly sequential: each registrar call completes (or
/// exhausts its retries) before the next phase starts.
pub struct ZoneSync {
    client: RegistrarClient,
    defaults: RecordDefaults,
    event_tx: mpsc::Sender<SyncEvent>,
}

impl ZoneSync {
    /// Create a new orchestrator
    ///
    /// # Returns
    ///
    /// A tuple of (orchestrator, event_receiver) where event_receiver yields
    /// sync events
    pub fn new(
        client: RegistrarClient,
        defaults: RecordDefaults,
    ) -> Result<(Self, mpsc::Receiver<SyncEvent>)> {
        defaults.validate()?;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let sync = Self {
            client,
            defaults,
            event_tx: tx,
        };

        Ok((sync, rx))
    }

    /// Point `request.target` at `request.address`
    ///
    /// # Errors
    ///
    /// Any fetch or push failure: [`Error::Transport`],
    /// [`Error::MalformedResponse`], [`Error::Api`], or
    /// [`Error::PushNotConfirmed`].
    pub async fn apply(&self, request: &SyncRequest) -> Result<SyncReport> {
        let zone = &request.target.zone;
        let host_name = request.target.subdomain.as_str();
        let address = request.address.to_string();
        let mut state = SyncState::Idle;

        info!(
            "Syncing A record {} -> {} [mode: {}]",
            request.target.fqdn(),
            address,
            if request.dry_run { "DRY-RUN" } else { "LIVE" }
        );

        self.transition(&mut state, SyncState::Fetching);
        let existing = match self.fetch_hosts(zone, Some(self.defaults.ttl)).await {
            Ok(records) => records,
            Err(e) => return Err(self.fail(state, e)),
        };
        info!("Fetched {} existing DNS record(s) for {}", existing.len(), zone);
        self.emit_event(SyncEvent::Fetched {
            zone: zone.clone(),
            record_count: existing.len(),
        });

        self.transition(&mut state, SyncState::Reconciling);
        let reconciled = reconcile(&existing, host_name, &address, self.defaults.ttl);
        let change = if reconciled.is_creation() {
            ChangeKind::Created
        } else {
            ChangeKind::Updated {
                previous: reconciled
                    .displaced
                    .iter()
                    .map(|record| record.address.clone())
                    .collect(),
            }
        };
        info!(
            "Final DNS record set will have {} record(s)",
            reconciled.records.len()
        );
        self.emit_event(SyncEvent::Reconciled {
            record_count: reconciled.records.len(),
            displaced: reconciled.displaced.len(),
        });

        let records = reconciled.into_records();

        if request.dry_run {
            info!(
                "[DRY-RUN] Would push {} record(s) to {}",
                records.len(),
                zone
            );
            for record in &records {
                info!("[DRY-RUN]   {}", record);
            }
            self.emit_event(SyncEvent::DryRun {
                zone: zone.clone(),
                record_count: records.len(),
            });
            self.transition(&mut state, SyncState::DryRun);
            return Ok(self.report(request, change, records, false));
        }

        self.transition(&mut state, SyncState::Pushing);
        if let Err(e) = self.push_hosts(zone, &records).await {
            return Err(self.fail(state, e));
        }
        info!("DNS record updated successfully: {} -> {}", request.target.fqdn(), address);
        self.emit_event(SyncEvent::Pushed {
            zone: zone.clone(),
            record_count: records.len(),
        });

        self.transition(&mut state, SyncState::Done);
        Ok(self.report(request, change, records, true))
    }

    /// Fetch the live records of a zone without changing anything
    ///
    /// TTLs are returned exactly as the registrar sent them.
    pub async fn inspect(&self, zone: &ZoneIdentity) -> Result<Vec<HostRecord>> {
        let mut state = SyncState::Idle;

        self.transition(&mut state, SyncState::Fetching);
        let records = match self.fetch_hosts(zone, None).await {
            Ok(records) => records,
            Err(e) => return Err(self.fail(state, e)),
        };
        self.emit_event(SyncEvent::Fetched {
            zone: zone.clone(),
            record_count: records.len(),
        });

        self.transition(&mut state, SyncState::Idle);
        Ok(records)
    }

    async fn fetch_hosts(
        &self,
        zone: &ZoneIdentity,
        default_ttl: Option<u32>,
    ) -> Result<Vec<HostRecord>> {
        let body = self.client.call(Command::GetHosts, zone_params(zone)).await?;
        let tree = xml::normalize(&body)?;

        let errors = xml::extract_errors(&tree);
        if !errors.is_empty() {
            return Err(Error::api(Command::GetHosts.as_str(), errors));
        }

        xml::extract_hosts(&tree, default_ttl)
    }

    async fn push_hosts(&self, zone: &ZoneIdentity, records: &[HostRecord]) -> Result<()> {
        let params = set_hosts_params(zone, records, self.defaults.ttl);
        let body = self.client.call(Command::SetHosts, params).await?;
        let tree = xml::normalize(&body)?;

        if xml::extract_set_result(&tree) {
            return Ok(());
        }

        Err(Error::PushNotConfirmed {
            zone: zone.to_string(),
            messages: xml::extract_errors(&tree),
        })
    }

    fn report(
        &self,
        request: &SyncRequest,
        change: ChangeKind,
        records: Vec<HostRecord>,
        pushed: bool,
    ) -> SyncReport {
        SyncReport {
            zone: request.target.zone.clone(),
            host_name: request.target.subdomain.clone(),
            address: request.address,
            change,
            records,
            pushed,
        }
    }

    fn transition(&self, state: &mut SyncState, next: SyncState) {
        debug!("Sync state {} -> {}", state, next);
        *state = next;
        self.emit_event(SyncEvent::StateChanged { state: next });
    }

    fn fail(&self, state: SyncState, error: Error) -> Error {
        error!("Sync failed while {}: {}", state, error);
        self.emit_event(SyncEvent::Failed {
            state,
            error: error.to_string(),
        });
        self.emit_event(SyncEvent::StateChanged {
            state: SyncState::Failed,
        });
        error
    }

    fn emit_event(&self, event: SyncEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full, dropping sync event");
        }
    }
}

fn zone_params(zone: &ZoneIdentity) -> Vec<(String, String)> {
    vec![
        ("SLD".to_string(), zone.sld.clone()),
        ("TLD".to_string(), zone.tld.clone()),
    ]
}

/// Parameters of a `setHosts` call for a complete record set
///
/// Records are numbered from 1 in order. A missing MX preference is sent
/// as 10 and a missing TTL as `default_ttl`.
pub fn set_hosts_params(
    zone: &ZoneIdentity,
    records: &[HostRecord],
    default_ttl: u32,
) -> Vec<(String, String)> {
    let mut params = zone_params(zone);
    for (i, record) in records.iter().enumerate() {
        let i = i + 1;
        params.push((format!("HostName{}", i), record.host_name.clone()));
        params.push((format!("RecordType{}", i), record.record_type.to_string()));
        params.push((format!("Address{}", i), record.address.clone()));
        params.push((format!("MXPref{}", i), record.wire_mx_pref().to_string()));
        params.push((format!("TTL{}", i), record.wire_ttl(default_ttl).to_string()));
    }
    params
}
