// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone discovery: mapping each change to its authoritative zone.
//!
//! Discovery runs in two phases. First, the candidate zone names for the
//! whole batch are computed and fetched in one pass — an exact-name lookup
//! for forward records and IPv6 PTR, and a substring-filter lookup for IPv4
//! PTR (classless RFC 2317 zone names embed a `/` and are unreachable by
//! exact name). The two lookups run concurrently and their union becomes the
//! request's [`ExistingZones`] snapshot.
//!
//! Second, each change is resolved against the snapshot. Resolution is a
//! pure function of the change and the snapshot; a change that resolves to
//! no zone becomes an invalid position, never an aborted batch.

use std::collections::{HashMap, HashSet};
use std::net::{Ipv4Addr, Ipv6Addr};
use tracing::warn;

use crate::batch::validation::{Validated, ValidatedBatch};
use crate::constants::IP6_ARPA_SUFFIX;
use crate::dns::reverse::{
    ipv4_non_delegated_zone_name, ipv4_ptr_record_name, ipv6_full_reverse_name,
    ipv6_ptr_record_name, ipv6_reverse_zone_candidates, ptr_is_in_zone,
};
use crate::dns::{relativize, zone_from_non_apex_fqdn};
use crate::errors::{ChangeError, RepositoryError};
use crate::repository::ZoneRepository;
use crate::types::{ChangeForValidation, RecordType, ValidChangeInput, Zone};

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod discovery_tests;

/// Point-in-time zone snapshot for one intake request.
///
/// Holds every zone fetched for the batch, deduplicated by id, with a
/// by-name index for exact lookups.
#[derive(Debug, Default)]
pub struct ExistingZones {
    zones: Vec<Zone>,
    by_name: HashMap<String, usize>,
}

impl ExistingZones {
    /// Build a snapshot from fetched zones, deduplicating by id.
    #[must_use]
    pub fn new(zones: Vec<Zone>) -> Self {
        let mut snapshot = ExistingZones::default();
        let mut seen = HashSet::new();
        for zone in zones {
            if seen.insert(zone.id.clone()) {
                snapshot.by_name.insert(zone.name.clone(), snapshot.zones.len());
                snapshot.zones.push(zone);
            }
        }
        snapshot
    }

    /// Exact lookup by normalized zone name.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&Zone> {
        self.by_name.get(name).map(|index| &self.zones[*index])
    }

    /// Zones authoritative for the PTR of an IPv4 address.
    #[must_use]
    pub fn ipv4_ptr_matches(&self, ip: Ipv4Addr) -> Vec<&Zone> {
        self.zones
            .iter()
            .filter(|zone| ptr_is_in_zone(&zone.name, ip))
            .collect()
    }

    /// Zones whose name is a suffix of the full IPv6 reverse name.
    #[must_use]
    pub fn ipv6_ptr_matches(&self, ip: Ipv6Addr) -> Vec<&Zone> {
        let full = ipv6_full_reverse_name(ip);
        self.zones
            .iter()
            .filter(|zone| zone.name.ends_with(IP6_ARPA_SUFFIX) && full.ends_with(&zone.name))
            .collect()
    }

    /// Number of zones in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether the snapshot holds no zones.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Iterate over the zones in the snapshot.
    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }
}

/// Fetch the zone snapshot for the batch and resolve every change.
///
/// Invalid positions pass through untouched; valid ones either gain their
/// zone and relative record name or collect a `ZoneDiscovery` error.
///
/// # Errors
///
/// Returns a transport error if either zone lookup fails.
pub async fn discover_zones(
    zone_repo: &dyn ZoneRepository,
    validated: ValidatedBatch<ValidChangeInput>,
) -> Result<(ValidatedBatch<ChangeForValidation>, ExistingZones), RepositoryError> {
    let (names, filters) = candidate_zone_names(&validated);

    let (exact, filtered) = tokio::try_join!(
        zone_repo.get_zones_by_names(&names),
        zone_repo.get_zones_by_filters(&filters)
    )?;

    let zones = ExistingZones::new(exact.into_iter().chain(filtered).collect());

    let resolved = validated
        .into_iter()
        .map(|slot| slot.and_then(|change| resolve_change(change, &zones)))
        .collect();

    Ok((resolved, zones))
}

/// Candidate names for the exact lookup and filter strings for the
/// substring lookup, across every valid change in the batch.
fn candidate_zone_names(
    validated: &ValidatedBatch<ValidChangeInput>,
) -> (HashSet<String>, HashSet<String>) {
    let mut names = HashSet::new();
    let mut filters = HashSet::new();

    for change in validated.iter().flatten() {
        match change.record_type {
            RecordType::Ptr => {
                if let Ok(ipv4) = change.input_name.parse::<Ipv4Addr>() {
                    filters.insert(ipv4_non_delegated_zone_name(ipv4));
                } else if let Ok(ipv6) = change.input_name.parse::<Ipv6Addr>() {
                    names.extend(ipv6_reverse_zone_candidates(ipv6));
                }
            }
            _ => {
                names.insert(change.input_name.clone());
                let parent = zone_from_non_apex_fqdn(&change.input_name);
                if !parent.is_empty() {
                    names.insert(parent);
                }
            }
        }
    }

    (names, filters)
}

/// Resolve one change against the zone snapshot.
///
/// Pure: the outcome depends only on the change and the snapshot.
pub fn resolve_change(
    change: ValidChangeInput,
    zones: &ExistingZones,
) -> Validated<ChangeForValidation> {
    match change.record_type {
        RecordType::Ptr => resolve_ptr(change, zones),
        // CNAME and NS cannot live at the apex: the name collides with the
        // zone's own SOA/NS record sets
        RecordType::Cname | RecordType::Ns => resolve_non_apex(change, zones),
        _ => resolve_standard(change, zones),
    }
}

fn zone_discovery_error<T>(name: &str) -> Validated<T> {
    Err(vec![ChangeError::ZoneDiscovery {
        name: name.to_string(),
    }])
}

/// A / AAAA / MX / TXT: prefer the apex zone, fall back to the non-apex
/// parent.
fn resolve_standard(
    change: ValidChangeInput,
    zones: &ExistingZones,
) -> Validated<ChangeForValidation> {
    let apex = zones.get_by_name(&change.input_name);
    let parent = zones.get_by_name(&zone_from_non_apex_fqdn(&change.input_name));
    match apex.or(parent) {
        Some(zone) => Ok(ChangeForValidation {
            record_name: relativize(&change.input_name, &zone.name),
            zone: zone.clone(),
            change,
        }),
        None => zone_discovery_error(&change.input_name),
    }
}

/// CNAME / NS: an apex match is itself a conflict; only the non-apex parent
/// is acceptable.
fn resolve_non_apex(
    change: ValidChangeInput,
    zones: &ExistingZones,
) -> Validated<ChangeForValidation> {
    if zones.get_by_name(&change.input_name).is_some() {
        return Err(vec![ChangeError::RecordAlreadyExists {
            name: change.input_name,
        }]);
    }
    match zones.get_by_name(&zone_from_non_apex_fqdn(&change.input_name)) {
        Some(zone) => Ok(ChangeForValidation {
            record_name: relativize(&change.input_name, &zone.name),
            zone: zone.clone(),
            change,
        }),
        None => zone_discovery_error(&change.input_name),
    }
}

fn resolve_ptr(change: ValidChangeInput, zones: &ExistingZones) -> Validated<ChangeForValidation> {
    if let Ok(ipv4) = change.input_name.parse::<Ipv4Addr>() {
        resolve_ipv4_ptr(change, ipv4, zones)
    } else if let Ok(ipv6) = change.input_name.parse::<Ipv6Addr>() {
        resolve_ipv6_ptr(change, ipv6, zones)
    } else {
        zone_discovery_error(&change.input_name)
    }
}

/// IPv4 PTR: among covering zones, classless (`/`) delegations win over the
/// classful zone; overlapping delegations resolve to the longest name.
fn resolve_ipv4_ptr(
    change: ValidChangeInput,
    ip: Ipv4Addr,
    zones: &ExistingZones,
) -> Validated<ChangeForValidation> {
    let matches = zones.ipv4_ptr_matches(ip);
    if matches.is_empty() {
        return zone_discovery_error(&change.input_name);
    }

    let classless: Vec<&&Zone> = matches
        .iter()
        .filter(|zone| zone.name.contains('/'))
        .collect();
    if classless.len() > 1 {
        warn!(
            ip = %ip,
            zones = ?classless.iter().map(|zone| zone.name.as_str()).collect::<Vec<_>>(),
            "Overlapping classless reverse delegations; choosing the most specific"
        );
    }

    let pool: Vec<&Zone> = if classless.is_empty() {
        matches
    } else {
        classless.into_iter().copied().collect()
    };
    let Some(zone) = longest_zone(&pool) else {
        return zone_discovery_error(&change.input_name);
    };

    Ok(ChangeForValidation {
        record_name: ipv4_ptr_record_name(ip),
        zone: zone.clone(),
        change,
    })
}

/// IPv6 PTR: the longest matching zone name is the most specific delegation.
fn resolve_ipv6_ptr(
    change: ValidChangeInput,
    ip: Ipv6Addr,
    zones: &ExistingZones,
) -> Validated<ChangeForValidation> {
    let matches = zones.ipv6_ptr_matches(ip);
    let Some(zone) = longest_zone(&matches) else {
        return zone_discovery_error(&change.input_name);
    };

    Ok(ChangeForValidation {
        record_name: ipv6_ptr_record_name(ip, &zone.name),
        zone: zone.clone(),
        change,
    })
}

/// The zone with the longest name; name order breaks length ties so the
/// choice is deterministic.
fn longest_zone<'a>(zones: &[&'a Zone]) -> Option<&'a Zone> {
    zones
        .iter()
        .max_by(|a, b| {
            a.name
                .len()
                .cmp(&b.name.len())
                .then_with(|| a.name.cmp(&b.name))
        })
        .copied()
}
