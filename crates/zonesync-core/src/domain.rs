//! Domain parsing
//!
//! Splits a fully-qualified name into the host label relative to its zone
//! and the `(SLD, TLD)` pair the registrar uses to address that zone.
//! Suffix boundaries come from the public suffix list, so multi-label
//! suffixes such as `co.uk` split correctly.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;

/// The two-part key addressing a zone at the registrar
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ZoneIdentity {
    /// Registrable label (e.g. "example")
    pub sld: String,
    /// Public suffix (e.g. "com" or "co.uk")
    pub tld: String,
}

impl ZoneIdentity {
    /// Create a zone identity
    pub fn new(sld: impl Into<String>, tld: impl Into<String>) -> Self {
        Self {
            sld: sld.into(),
            tld: tld.into(),
        }
    }
}

impl fmt::Display for ZoneIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.sld, self.tld)
    }
}

/// Result of splitting a fully-qualified name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDomain {
    /// Labels left of the registrable domain ("" for the zone apex)
    pub subdomain: String,
    /// Zone the name belongs to
    pub zone: ZoneIdentity,
}

impl ParsedDomain {
    /// Reassemble the fully-qualified name
    pub fn fqdn(&self) -> String {
        if self.subdomain.is_empty() {
            self.zone.to_string()
        } else {
            format!("{}.{}", self.subdomain, self.zone)
        }
    }

    /// Whether the name is the zone apex
    pub fn is_apex(&self) -> bool {
        self.subdomain.is_empty()
    }
}

/// Whether an empty subdomain label is acceptable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubdomainPolicy {
    /// Write path: the name must have a subdomain
    Required,
    /// Inspection path: the apex is accepted
    Optional,
}

/// Split `input` into subdomain, SLD and TLD
///
/// # Errors
///
/// - [`Error::InvalidDomain`] when the name is malformed, is itself a public
///   suffix, or ends in a suffix the public suffix list does not know
/// - [`Error::MissingSubdomain`] when `policy` is
///   [`SubdomainPolicy::Required`] and the name is a zone apex
pub fn parse_domain(input: &str, policy: SubdomainPolicy) -> Result<ParsedDomain> {
    let name = normalize(input);
    validate_labels(&name)?;

    let tld = icann_suffix(&name).ok_or_else(|| {
        Error::invalid_domain(format!(
            "could not find a public suffix in '{}'",
            input.trim()
        ))
    })?;

    let rest = name[..name.len() - tld.len()]
        .strip_suffix('.')
        .filter(|rest| !rest.is_empty())
        .ok_or_else(|| {
            Error::invalid_domain(format!(
                "'{}' has no registrable domain below its public suffix",
                input.trim()
            ))
        })?;

    let (subdomain, sld) = match rest.rsplit_once('.') {
        Some((subdomain, sld)) => (subdomain, sld),
        None => ("", rest),
    };
    validate_sld(sld)?;
    validate_subdomain(subdomain)?;

    let parsed = ParsedDomain {
        subdomain: subdomain.to_string(),
        zone: ZoneIdentity::new(sld, tld),
    };

    if policy == SubdomainPolicy::Required && parsed.is_apex() {
        return Err(Error::MissingSubdomain(parsed.zone.to_string()));
    }

    Ok(parsed)
}

fn normalize(input: &str) -> String {
    let trimmed = input.trim();
    trimmed
        .strip_suffix('.')
        .unwrap_or(trimmed)
        .to_ascii_lowercase()
}

/// Basic RFC 1035 shape checks
///
/// Host labels may also carry `_` (service names such as
/// `_acme-challenge`) or be a lone `*`. Where those are allowed is decided
/// once the zone boundary is known.
fn validate_labels(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_domain("domain name cannot be empty"));
    }

    if name.len() > 253 {
        return Err(Error::invalid_domain(format!(
            "domain name too long: {} chars (max 253)",
            name.len()
        )));
    }

    for label in name.split('.') {
        if label.is_empty() {
            return Err(Error::invalid_domain(format!(
                "domain name has empty label: '{}'",
                name
            )));
        }

        if label.len() > 63 {
            return Err(Error::invalid_domain(format!(
                "domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if label != "*"
            && !label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::invalid_domain(format!(
                "domain label contains invalid characters: '{}'",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(Error::invalid_domain(format!(
                "domain label cannot start or end with hyphen: '{}'",
                label
            )));
        }
    }

    Ok(())
}

/// The registrable label is a plain hostname label
fn validate_sld(sld: &str) -> Result<()> {
    if !sld.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(Error::invalid_domain(format!(
            "registrable domain contains invalid characters: '{}'",
            sld
        )));
    }
    Ok(())
}

/// A wildcard is only valid as the whole leftmost host label
fn validate_subdomain(subdomain: &str) -> Result<()> {
    let wildcard_misplaced = subdomain
        .split('.')
        .enumerate()
        .any(|(i, label)| label.contains('*') && (i > 0 || label != "*"));
    if wildcard_misplaced {
        return Err(Error::invalid_domain(format!(
            "wildcard must be the entire leftmost label: '{}'",
            subdomain
        )));
    }
    Ok(())
}

/// Longest ICANN suffix of `name`, as a subslice of `name`
///
/// Private-section entries (e.g. `github.io`) are skipped: a registrar
/// zone always sits directly under an ICANN suffix.
fn icann_suffix(name: &str) -> Option<&str> {
    let mut candidate = name;
    loop {
        let suffix = psl::suffix(candidate.as_bytes())?;
        let len = suffix.as_bytes().len();
        match suffix.typ() {
            Some(psl::Type::Icann) => return Some(&name[name.len() - len..]),
            Some(psl::Type::Private) => {
                let text = &name[name.len() - len..];
                let (_, shorter) = text.split_once('.')?;
                candidate = &name[name.len() - shorter.len()..];
            }
            None => return None,
        }
    }
}
