//! Registrar response normalization
//!
//! The registrar answers with namespaced XML and reports application errors
//! inside a 200 response. [`normalize`] parses a body into an owned tree
//! whose element and attribute names carry no namespace prefix, so callers
//! can use plain tag paths like `.//DomainDNSGetHostsResult/host`. The
//! `extract_*` functions pull the three things the sync needs out of it.

use crate::error::{Error, Result};
use crate::record::{HostRecord, RecordType};

/// Placeholder for an `Error` element that carries no text
const EMPTY_ERROR_MESSAGE: &str = "registrar reported an error without a message";

/// One element of a normalized response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    /// Local tag name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value by local name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Trimmed direct text content
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Child elements in document order
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// This element and all elements below it, in document order
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = vec![self];
        for child in self.children() {
            out.extend(child.descendants());
        }
        out
    }

    /// All elements matching a tag path relative to this element
    ///
    /// `"a/b"` walks child steps; a leading `".//"` lets the first step
    /// match at any depth below this element.
    pub fn find_all(&self, path: &str) -> Vec<&Element> {
        select(self.children().iter().collect(), path)
    }

    /// First element matching a tag path relative to this element
    pub fn find(&self, path: &str) -> Option<&Element> {
        self.find_all(path).into_iter().next()
    }
}

/// A parsed response with every namespace prefix removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTree {
    root: Element,
}

impl NormalizedTree {
    /// Document element
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// All elements matching a tag path, evaluated from the document node
    ///
    /// Unlike [`Element::find_all`], the document element itself is a
    /// candidate for the first step.
    pub fn find_all(&self, path: &str) -> Vec<&Element> {
        select(vec![&self.root], path)
    }

    /// First element matching a tag path, evaluated from the document node
    pub fn find(&self, path: &str) -> Option<&Element> {
        self.find_all(path).into_iter().next()
    }
}

fn select<'a>(tops: Vec<&'a Element>, path: &str) -> Vec<&'a Element> {
    let (anywhere, rest) = match path.strip_prefix(".//") {
        Some(rest) => (true, rest),
        None => (false, path.strip_prefix("./").unwrap_or(path)),
    };

    let mut steps = rest.split('/').filter(|step| !step.is_empty());
    let Some(first) = steps.next() else {
        return Vec::new();
    };

    let mut current: Vec<&Element> = if anywhere {
        tops.into_iter()
            .flat_map(|top| top.descendants())
            .filter(|element| element.name == first)
            .collect()
    } else {
        tops.into_iter()
            .filter(|element| element.name == first)
            .collect()
    };

    for step in steps {
        current = current
            .into_iter()
            .flat_map(|element| element.children().iter().filter(move |c| c.name == step))
            .collect();
    }

    current
}

/// Parse a response body and strip namespaces from every tag
///
/// # Errors
///
/// [`Error::MalformedResponse`] if the body is not well-formed XML.
pub fn normalize(raw: &str) -> Result<NormalizedTree> {
    let document = roxmltree::Document::parse(raw)
        .map_err(|e| Error::malformed(format!("response is not well-formed XML: {}", e)))?;

    Ok(NormalizedTree {
        root: convert(document.root_element()),
    })
}

fn convert(node: roxmltree::Node<'_, '_>) -> Element {
    let text = node
        .children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect::<String>()
        .trim()
        .to_string();

    Element {
        name: node.tag_name().name().to_string(),
        attributes: node
            .attributes()
            .map(|attr| (attr.name().to_string(), attr.value().to_string()))
            .collect(),
        text,
        children: node
            .children()
            .filter(|child| child.is_element())
            .map(convert)
            .collect(),
    }
}

/// Messages of every `Error` element, at any depth
pub fn extract_errors(tree: &NormalizedTree) -> Vec<String> {
    tree.find_all(".//Error")
        .into_iter()
        .map(|element| {
            if element.text().is_empty() {
                EMPTY_ERROR_MESSAGE.to_string()
            } else {
                element.text().to_string()
            }
        })
        .collect()
}

/// Host records listed under the `getHosts` result node
///
/// `default_ttl` fills records the registrar returned without a TTL; pass
/// `None` to keep them as returned.
///
/// # Errors
///
/// [`Error::MalformedResponse`] if a host lacks `Name`, `Type` or
/// `Address`, has an empty `Name`, or carries a non-numeric `MXPref`/`TTL`.
pub fn extract_hosts(tree: &NormalizedTree, default_ttl: Option<u32>) -> Result<Vec<HostRecord>> {
    tree.find_all(".//DomainDNSGetHostsResult/host")
        .into_iter()
        .enumerate()
        .map(|(index, host)| host_record(index + 1, host, default_ttl))
        .collect()
}

fn host_record(position: usize, host: &Element, default_ttl: Option<u32>) -> Result<HostRecord> {
    let host_name = required_attr(host, position, "Name")?;
    if host_name.is_empty() {
        return Err(Error::malformed(format!("host #{} has an empty Name", position)));
    }
    let Ok(record_type) = required_attr(host, position, "Type")?.parse::<RecordType>();
    let address = required_attr(host, position, "Address")?;

    let mx_pref = match host.attr("MXPref").filter(|v| !v.is_empty()) {
        Some(raw) => Some(raw.parse::<u16>().map_err(|_| {
            Error::malformed(format!("host #{} has a non-numeric MXPref '{}'", position, raw))
        })?),
        None => None,
    };

    let ttl = match host.attr("TTL").filter(|v| !v.is_empty()) {
        Some(raw) => Some(raw.parse::<u32>().map_err(|_| {
            Error::malformed(format!("host #{} has a non-numeric TTL '{}'", position, raw))
        })?),
        None => default_ttl,
    };

    Ok(HostRecord {
        host_name: host_name.to_string(),
        record_type,
        address: address.to_string(),
        mx_pref,
        ttl,
    })
}

fn required_attr<'a>(host: &'a Element, position: usize, attr: &str) -> Result<&'a str> {
    host.attr(attr).ok_or_else(|| {
        Error::malformed(format!("host #{} is missing the {} attribute", position, attr))
    })
}

/// Whether the `setHosts` result node reports success
///
/// Only the literal attribute value `"true"` counts; a missing node or any
/// other value is a failure.
pub fn extract_set_result(tree: &NormalizedTree) -> bool {
    tree.find(".//DomainDNSSetHostsResult")
        .and_then(|result| result.attr("IsSuccess"))
        == Some("true")
}
