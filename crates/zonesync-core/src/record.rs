//! Host record model
//!
//! A [`HostRecord`] is one DNS entry in a registrar zone. Records are read
//! from a `getHosts` response, rewritten in memory, and serialized into the
//! next `setHosts` request.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// MX preference sent for records that carry none
pub const DEFAULT_MX_PREF: u16 = 10;

/// Record type as understood by the registrar
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    Aaaa,
    Alias,
    Caa,
    Cname,
    Mx,
    Mxe,
    Ns,
    Txt,
    Url,
    Url301,
    Frame,
    /// Any type this crate does not model, kept verbatim
    Other(String),
}

impl RecordType {
    /// Registrar spelling of the type
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Alias => "ALIAS",
            RecordType::Caa => "CAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Mxe => "MXE",
            RecordType::Ns => "NS",
            RecordType::Txt => "TXT",
            RecordType::Url => "URL",
            RecordType::Url301 => "URL301",
            RecordType::Frame => "FRAME",
            RecordType::Other(raw) => raw,
        }
    }
}

impl FromStr for RecordType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s.to_ascii_uppercase().as_str() {
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            "ALIAS" => RecordType::Alias,
            "CAA" => RecordType::Caa,
            "CNAME" => RecordType::Cname,
            "MX" => RecordType::Mx,
            "MXE" => RecordType::Mxe,
            "NS" => RecordType::Ns,
            "TXT" => RecordType::Txt,
            "URL" => RecordType::Url,
            "URL301" => RecordType::Url301,
            "FRAME" => RecordType::Frame,
            _ => RecordType::Other(s.to_string()),
        };
        Ok(parsed)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RecordType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One host entry in a zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostRecord {
    /// Label relative to the zone (e.g. "dev", "@")
    pub host_name: String,
    /// Record type
    pub record_type: RecordType,
    /// Record value
    pub address: String,
    /// MX preference, if the registrar returned one
    pub mx_pref: Option<u16>,
    /// TTL in seconds; `None` only when read without a default
    pub ttl: Option<u32>,
}

impl HostRecord {
    /// Create an A record
    pub fn a(host_name: impl Into<String>, address: impl Into<String>, ttl: u32) -> Self {
        Self {
            host_name: host_name.into(),
            record_type: RecordType::A,
            address: address.into(),
            mx_pref: None,
            ttl: Some(ttl),
        }
    }

    /// Whether this record is the A record for `host_name`
    pub fn is_a_for(&self, host_name: &str) -> bool {
        self.record_type == RecordType::A && self.host_name == host_name
    }

    /// MX preference as sent on the wire
    pub fn wire_mx_pref(&self) -> u16 {
        self.mx_pref.unwrap_or(DEFAULT_MX_PREF)
    }

    /// TTL as sent on the wire
    pub fn wire_ttl(&self, default_ttl: u32) -> u32 {
        self.ttl.unwrap_or(default_ttl)
    }
}

impl fmt::Display for HostRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.host_name, self.record_type, self.address)
    }
}
