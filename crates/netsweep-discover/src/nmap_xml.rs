//! Nmap XML output reading.
//!
//! Nmap's `-oX` output is streamed through `quick-xml`'s event reader. Every
//! `<host>` element is collected wherever it sits in the tree, in document
//! order. For each host the direct `<address>` and `<status>` children and
//! the first `<osmatch>` descendant are kept; everything else is skipped.

use std::net::Ipv4Addr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use netsweep_core::types::{format_os_match, OS_NOT_DETECTED};

use crate::error::{DiscoverError, Result};

/// A single host from scan results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NmapHost {
    pub status: Option<HostStatus>,
    pub addresses: Vec<Address>,
    pub os_match: Option<OsMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostStatus {
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub addr: Option<String>,
    pub addr_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsMatch {
    pub name: Option<String>,
    pub accuracy: Option<String>,
}

impl NmapHost {
    /// The host's IPv4 address: the first `ipv4` address, else the first
    /// untyped address whose `addr` is an IPv4 literal. MAC and IPv6
    /// addresses never qualify.
    pub fn ipv4(&self) -> Option<&str> {
        self.addresses
            .iter()
            .find(|a| a.addr_type.as_deref() == Some("ipv4") && a.addr.is_some())
            .or_else(|| {
                self.addresses.iter().find(|a| {
                    a.addr_type.is_none()
                        && a.addr
                            .as_deref()
                            .is_some_and(|addr| addr.parse::<Ipv4Addr>().is_ok())
                })
            })
            .and_then(|a| a.addr.as_deref())
    }

    /// Host state (`up`, `down`, ...), if reported.
    pub fn state(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.state.as_deref())
    }

    /// Name of the best OS match (first in the list), if present.
    pub fn os_name(&self) -> Option<&str> {
        self.os_match.as_ref().and_then(|m| m.name.as_deref())
    }

    /// `Os: <name>, Accuracy: <accuracy>`, or [`OS_NOT_DETECTED`].
    pub fn os_description(&self) -> String {
        match (&self.os_match, self.os_name()) {
            (Some(m), Some(name)) => format_os_match(name, m.accuracy.as_deref()),
            _ => OS_NOT_DETECTED.to_string(),
        }
    }
}

/// Host being filled in, with the depth of its `<host>` element.
struct OpenHost {
    host: NmapHost,
    depth: usize,
}

/// Parse nmap XML bytes into the hosts it describes.
///
/// Fails on malformed markup, mismatched or unclosed tags, and documents
/// with no root element.
pub fn parse_nmap_xml(xml: &[u8]) -> Result<Vec<NmapHost>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut hosts = Vec::new();
    let mut open: Option<OpenHost> = None;
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            DiscoverError::XmlParse(format!("at byte {}: {e}", reader.buffer_position()))
        })?;

        match event {
            Event::Start(e) => {
                depth += 1;
                saw_root = true;
                visit_element(&e, depth, false, &mut open, &mut hosts)?;
            }
            Event::Empty(e) => {
                saw_root = true;
                visit_element(&e, depth + 1, true, &mut open, &mut hosts)?;
            }
            Event::End(_) => {
                if let Some(current) = open.take() {
                    if current.depth == depth {
                        hosts.push(current.host);
                    } else {
                        open = Some(current);
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if depth != 0 {
        return Err(DiscoverError::XmlParse(format!(
            "unexpected end of document with {depth} unclosed element(s)"
        )));
    }
    if !saw_root {
        return Err(DiscoverError::XmlParse(
            "document has no root element".to_string(),
        ));
    }

    Ok(hosts)
}

fn visit_element(
    e: &BytesStart<'_>,
    depth: usize,
    empty: bool,
    open: &mut Option<OpenHost>,
    hosts: &mut Vec<NmapHost>,
) -> Result<()> {
    let name = e.local_name();

    let Some(current) = open.as_mut() else {
        if name.as_ref() == b"host" {
            if empty {
                hosts.push(NmapHost::default());
            } else {
                *open = Some(OpenHost {
                    host: NmapHost::default(),
                    depth,
                });
            }
        }
        return Ok(());
    };

    let direct_child = depth == current.depth + 1;
    match name.as_ref() {
        b"address" if direct_child => {
            current.host.addresses.push(Address {
                addr: attr(e, "addr")?,
                addr_type: attr(e, "addrtype")?,
            });
        }
        b"status" if direct_child && current.host.status.is_none() => {
            current.host.status = Some(HostStatus {
                state: attr(e, "state")?,
            });
        }
        b"osmatch" if current.host.os_match.is_none() => {
            current.host.os_match = Some(OsMatch {
                name: attr(e, "name")?,
                accuracy: attr(e, "accuracy")?,
            });
        }
        _ => {}
    }

    Ok(())
}

fn attr(e: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    let Some(attribute) = e
        .try_get_attribute(name)
        .map_err(|err| DiscoverError::XmlParse(err.to_string()))?
    else {
        return Ok(None);
    };

    let value = attribute
        .unescape_value()
        .map_err(|err| DiscoverError::XmlParse(err.to_string()))?;
    Ok(Some(value.into_owned()))
}
