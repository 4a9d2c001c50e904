//! Record set reconciliation
//!
//! The registrar's `setHosts` replaces a zone's whole record set, so a
//! one-record change has to be expressed as the complete next set.
//! [`reconcile`] computes that set from the live one.
//!
//! ## Rules
//!
//! 1. Every A record at the target host name is removed, however many
//!    there are.
//! 2. Every other record is kept unchanged, in its original order.
//! 3. The desired A record is appended last.
//!
//! The function is pure and total: malformed records never reach it
//! because the normalizer rejects them.

use crate::record::HostRecord;

/// Outcome of a reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// Complete replacement set to submit
    pub records: Vec<HostRecord>,
    /// Prior A records at the target name that the new record replaces
    pub displaced: Vec<HostRecord>,
}

impl Reconciled {
    /// The replacement set
    pub fn into_records(self) -> Vec<HostRecord> {
        self.records
    }

    /// Whether the target name had no A record before
    pub fn is_creation(&self) -> bool {
        self.displaced.is_empty()
    }
}

/// Merge one desired A record into an existing record set
///
/// # Example
///
/// ```rust
/// use zonesync_core::record::HostRecord;
/// use zonesync_core::reconcile::reconcile;
///
/// let existing = vec![
///     HostRecord::a("dev", "192.0.2.1", 1800),
///     HostRecord::a("www", "192.0.2.2", 1800),
/// ];
/// let result = reconcile(&existing, "dev", "198.51.100.9", 1800);
///
/// assert_eq!(result.records, vec![
///     HostRecord::a("www", "192.0.2.2", 1800),
///     HostRecord::a("dev", "198.51.100.9", 1800),
/// ]);
/// assert_eq!(result.displaced.len(), 1);
/// ```
pub fn reconcile(
    existing: &[HostRecord],
    host_name: &str,
    address: &str,
    default_ttl: u32,
) -> Reconciled {
    let (displaced, mut records): (Vec<HostRecord>, Vec<HostRecord>) = existing
        .iter()
        .cloned()
        .partition(|record| record.is_a_for(host_name));

    records.push(HostRecord::a(host_name, address, default_ttl));

    Reconciled { records, displaced }
}
