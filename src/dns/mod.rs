// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS name utilities.
//!
//! Pure helpers for canonicalizing fully-qualified names, deriving parent
//! zone candidates, relativizing record names against a zone apex, and
//! validating IP literals. Reverse-zone (PTR) helpers live in [`reverse`].
//!
//! All functions here are pure; zone discovery composes them with repository
//! lookups.

pub mod reverse;

use hickory_proto::rr::Name;
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::constants::{APEX_MARKER, MAX_DOMAIN_NAME_LENGTH, MAX_LABEL_LENGTH};


/// Append a trailing dot unless the name already carries one.
#[must_use]
pub fn ensure_trailing_dot(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

/// Canonicalize a domain name: trimmed, lowercased, dot-terminated.
#[must_use]
pub fn normalize_fqdn(name: &str) -> String {
    ensure_trailing_dot(name.trim()).to_lowercase()
}

/// Drop the leftmost label, returning the parent zone candidate.
///
/// Returns the empty string when the name has no parent (a top-level
/// label such as `com.`).
#[must_use]
pub fn zone_from_non_apex_fqdn(fqdn: &str) -> String {
    let normalized = normalize_fqdn(fqdn);
    match normalized.split_once('.') {
        Some((_, parent)) if !parent.is_empty() => parent.to_string(),
        _ => String::new(),
    }
}

/// Express `fqdn` relative to `zone_name`.
///
/// Returns `@` when the name is the zone apex. Returns `fqdn` unchanged
/// (normalized) when it does not sit inside the zone; discovery never
/// produces that pairing.
#[must_use]
pub fn relativize(fqdn: &str, zone_name: &str) -> String {
    let fqdn = normalize_fqdn(fqdn);
    let zone = normalize_fqdn(zone_name);
    if fqdn == zone {
        return APEX_MARKER.to_string();
    }
    match fqdn.strip_suffix(&zone) {
        // The boundary must fall on a label separator, otherwise
        // "webexample.com." would relativize against "example.com."
        Some(rest) if rest.ends_with('.') => rest.trim_end_matches('.').to_string(),
        _ => fqdn,
    }
}

/// Whether `address` is a literal IPv4 address.
#[must_use]
pub fn validate_ipv4_address(address: &str) -> bool {
    address.parse::<Ipv4Addr>().is_ok()
}

/// Whether `address` is a literal IPv6 address.
#[must_use]
pub fn validate_ipv6_address(address: &str) -> bool {
    address.parse::<Ipv6Addr>().is_ok()
}

/// Whether `name` is a well-formed fully-qualified domain name.
///
/// Accepts names with or without the trailing dot. Enforces the RFC 1035
/// length bounds (255 per name, 63 per label) and restricts labels to
/// alphanumerics, `-` and `_` (service labels such as `_dmarc` are legal
/// record owners).
#[must_use]
pub fn validate_fqdn(name: &str) -> bool {
    let name = name.trim();
    if name.is_empty() || name.len() > MAX_DOMAIN_NAME_LENGTH {
        return false;
    }
    let Ok(parsed) = Name::from_ascii(name) else {
        return false;
    };
    if parsed.is_root() || parsed.num_labels() == 0 {
        return false;
    }
    parsed.iter().all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LENGTH
            && label
                .iter()
                .all(|c| c.is_ascii_alphanumeric() || *c == b'-' || *c == b'_')
    })
}
