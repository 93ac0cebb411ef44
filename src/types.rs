// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Core data model for batch record changes.
//!
//! This module defines the wire-facing input types (`BatchChangeInput`,
//! `ChangeInput`), the stored entities (`Zone`, `RecordSet`, `BatchChange`),
//! and the intermediate shapes the intake pipeline threads between stages
//! (`ValidChangeInput`, `ChangeForValidation`).
//!
//! Input record payloads arrive as loosely-typed strings in [`RecordDataInput`]
//! so that malformed values surface as accumulated validation errors rather
//! than deserialization failures. Input validation produces the strongly-typed
//! [`RecordData`] used everywhere downstream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::constants::{IN_ADDR_ARPA_SUFFIX, IP6_ARPA_SUFFIX};

/// Generate a fresh 32-hex-character entity id.
#[must_use]
pub fn generate_id() -> String {
    use rand::Rng;
    let mut rng = rand::rng();
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Whether a single change adds records or deletes a record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeType {
    /// Add records at a name
    Add,
    /// Delete the entire record set of a type at a name
    DeleteRecordSet,
}

/// Supported DNS record types for batch changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
    Mx,
    Ns,
    Ptr,
    Txt,
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Ptr => "PTR",
            RecordType::Txt => "TXT",
        };
        write!(f, "{name}")
    }
}

/// Raw record payload as submitted by the user.
///
/// All fields are optional; input validation checks that the fields required
/// by the declared record type are present and well-formed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDataInput {
    /// IPv4 or IPv6 address literal (A / AAAA)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Canonical name target (CNAME)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cname: Option<String>,

    /// Mail exchange preference (MX)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preference: Option<i64>,

    /// Mail exchange host (MX)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,

    /// Name server target (NS)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsdname: Option<String>,

    /// Pointer target (PTR)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ptrdname: Option<String>,

    /// Text payload (TXT)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Validated, strongly-typed record payload.
///
/// The untagged representation keeps the wire shape identical to
/// [`RecordDataInput`]: each variant is distinguished by its field names,
/// and `A`/`AAAA` by whether the address parses as IPv4 or IPv6.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordData {
    /// IPv4 address record
    A {
        /// The IPv4 address
        address: Ipv4Addr,
    },
    /// IPv6 address record
    Aaaa {
        /// The IPv6 address
        address: Ipv6Addr,
    },
    /// Canonical name record
    Cname {
        /// Fully-qualified target name
        cname: String,
    },
    /// Mail exchange record
    Mx {
        /// Preference (lower is preferred)
        preference: u16,
        /// Fully-qualified exchange host
        exchange: String,
    },
    /// Name server record
    Ns {
        /// Fully-qualified name server
        nsdname: String,
    },
    /// Pointer record
    Ptr {
        /// Fully-qualified pointer target
        ptrdname: String,
    },
    /// Text record
    Txt {
        /// Text payload
        text: String,
    },
}

impl RecordData {
    /// The record type this payload belongs to.
    #[must_use]
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordData::A { .. } => RecordType::A,
            RecordData::Aaaa { .. } => RecordType::Aaaa,
            RecordData::Cname { .. } => RecordType::Cname,
            RecordData::Mx { .. } => RecordType::Mx,
            RecordData::Ns { .. } => RecordType::Ns,
            RecordData::Ptr { .. } => RecordType::Ptr,
            RecordData::Txt { .. } => RecordType::Txt,
        }
    }
}

/// One user-submitted change, exactly as it arrived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeInput {
    /// Add or delete
    pub change_type: ChangeType,

    /// FQDN for forward records, IP literal for PTR
    pub input_name: String,

    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,

    /// TTL in seconds; the service default applies when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,

    /// Type-specific payload; ignored for deletes
    #[serde(default, skip_serializing_if = "record_data_is_empty")]
    pub record: RecordDataInput,
}

fn record_data_is_empty(record: &RecordDataInput) -> bool {
    *record == RecordDataInput::default()
}

/// A bundle of changes submitted together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchChangeInput {
    /// Free-form submitter comments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,

    /// Ordered changes; order is preserved end-to-end
    pub changes: Vec<ChangeInput>,
}

/// A change that passed input validation.
///
/// `input_name` is normalized (lowercased, dot-terminated) for forward
/// records and remains the IP literal for PTR. `record` carries the typed
/// payload for adds and is `None` for deletes.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidChangeInput {
    /// Add or delete
    pub change_type: ChangeType,
    /// Normalized input name
    pub input_name: String,
    /// Record type
    pub record_type: RecordType,
    /// TTL in seconds, if supplied
    pub ttl: Option<u32>,
    /// Typed payload for adds
    pub record: Option<RecordData>,
}

/// A change enriched with its discovered zone and relative record name.
///
/// Produced only after successful zone discovery.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeForValidation {
    /// The authoritative zone for this change
    pub zone: Zone,
    /// Record name relative to the zone apex (`@` at the apex)
    pub record_name: String,
    /// The validated change
    pub change: ValidChangeInput,
}

impl ChangeForValidation {
    /// The fully-qualified name this change targets, for error reporting.
    ///
    /// PTR changes report the IP literal they were submitted with.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.change.input_name
    }

    /// Whether this change adds or deletes.
    #[must_use]
    pub fn change_type(&self) -> ChangeType {
        self.change.change_type
    }

    /// The record type of this change.
    #[must_use]
    pub fn record_type(&self) -> RecordType {
        self.change.record_type
    }
}

/// An access rule granting write access on a zone to a user or a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AclRule {
    /// User granted access
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Group granted access
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

/// A DNS zone known to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    /// Stable zone id
    pub id: String,

    /// Canonical, dot-terminated, lowercase zone name
    pub name: String,

    /// Zone contact address
    #[serde(default)]
    pub email: String,

    /// Group administering the zone
    pub admin_group_id: String,

    /// Additional access rules
    #[serde(default)]
    pub acl: Vec<AclRule>,
}

impl Zone {
    /// Create a zone with a generated id and a normalized name.
    #[must_use]
    pub fn new(name: &str, email: &str, admin_group_id: &str) -> Self {
        Zone {
            id: generate_id(),
            name: crate::dns::normalize_fqdn(name),
            email: email.to_string(),
            admin_group_id: admin_group_id.to_string(),
            acl: Vec::new(),
        }
    }

    /// Whether this is a reverse (in-addr.arpa. / ip6.arpa.) zone.
    #[must_use]
    pub fn is_reverse(&self) -> bool {
        self.name.ends_with(IN_ADDR_ARPA_SUFFIX) || self.name.ends_with(IP6_ARPA_SUFFIX)
    }
}

/// A record set stored within a zone.
///
/// Uniqueness is `(zone_id, name, record_type)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSet {
    /// Stable record set id
    pub id: String,

    /// Owning zone
    pub zone_id: String,

    /// Record name relative to the zone apex (`@` at the apex)
    pub name: String,

    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,

    /// TTL in seconds
    pub ttl: u32,

    /// Ordered records
    pub records: Vec<RecordData>,
}

impl RecordSet {
    /// Create a record set with a generated id.
    #[must_use]
    pub fn new(zone_id: &str, name: &str, record_type: RecordType, ttl: u32) -> Self {
        RecordSet {
            id: generate_id(),
            zone_id: zone_id.to_string(),
            name: name.to_lowercase(),
            record_type,
            ttl,
            records: Vec::new(),
        }
    }
}

/// The authenticated principal submitting or reading batch changes.
///
/// Authentication itself is external; the routing layer injects the
/// already-verified identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthPrincipal {
    /// Stable user id
    pub user_id: String,
    /// Display user name
    pub user_name: String,
    /// Groups the user belongs to
    pub group_ids: Vec<String>,
    /// Administrators may read any batch and modify any zone
    pub is_super: bool,
}

impl AuthPrincipal {
    /// Whether this principal may modify records in `zone`.
    ///
    /// Granted to super-users, members of the zone admin group, and
    /// principals matched by a zone ACL rule.
    #[must_use]
    pub fn can_modify_zone(&self, zone: &Zone) -> bool {
        if self.is_super {
            return true;
        }
        if self.group_ids.iter().any(|g| *g == zone.admin_group_id) {
            return true;
        }
        zone.acl.iter().any(|rule| {
            rule.user_id.as_deref() == Some(self.user_id.as_str())
                || rule
                    .group_id
                    .as_ref()
                    .is_some_and(|g| self.group_ids.contains(g))
        })
    }
}

/// Lifecycle state of a stored batch change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchChangeStatus {
    /// Accepted and queued for processing
    #[default]
    Pending,
    /// All single changes applied
    Complete,
    /// Every single change failed downstream
    Failed,
    /// Some single changes failed downstream
    PartialFailure,
}

/// Lifecycle state of a stored single change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SingleChangeStatus {
    /// Accepted and queued for processing
    #[default]
    Pending,
    /// Applied at the DNS authority
    Complete,
    /// Rejected at the DNS authority
    Failed,
}

/// One stored change within an accepted batch.
///
/// Carries the original input alongside the resolved zone and record
/// identity; position within [`BatchChange::changes`] equals the submitted
/// input position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleChange {
    /// Stable change id
    pub id: String,

    /// Add or delete
    pub change_type: ChangeType,

    /// The name exactly as submitted (normalized)
    pub input_name: String,

    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,

    /// Record name relative to the resolved zone
    pub record_name: String,

    /// Resolved zone id
    pub zone_id: String,

    /// Resolved zone name
    pub zone_name: String,

    /// Effective TTL in seconds; `None` for deletes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,

    /// Typed payload for adds; `None` for deletes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<RecordData>,

    /// Downstream processing status
    #[serde(default)]
    pub status: SingleChangeStatus,
}

/// A stored, accepted batch change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchChange {
    /// Stable batch id
    pub id: String,

    /// Submitting user id
    pub user_id: String,

    /// Submitting user name
    pub user_name: String,

    /// Submitter comments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,

    /// Acceptance timestamp
    pub created_timestamp: DateTime<Utc>,

    /// Stored single changes, in input order
    pub changes: Vec<SingleChange>,

    /// Overall status, updated by the downstream processor
    #[serde(default)]
    pub status: BatchChangeStatus,
}

/// Condensed view of a batch change for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchChangeSummary {
    /// Batch id
    pub id: String,
    /// Submitting user id
    pub user_id: String,
    /// Submitting user name
    pub user_name: String,
    /// Submitter comments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    /// Acceptance timestamp
    pub created_timestamp: DateTime<Utc>,
    /// Number of single changes in the batch
    pub total_changes: usize,
    /// Overall status
    pub status: BatchChangeStatus,
}

impl From<&BatchChange> for BatchChangeSummary {
    fn from(batch: &BatchChange) -> Self {
        BatchChangeSummary {
            id: batch.id.clone(),
            user_id: batch.user_id.clone(),
            user_name: batch.user_name.clone(),
            comments: batch.comments.clone(),
            created_timestamp: batch.created_timestamp,
            total_changes: batch.changes.len(),
            status: batch.status,
        }
    }
}

/// One page of batch change summaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchChangeSummaryList {
    /// Summaries, newest first
    pub batch_changes: Vec<BatchChangeSummary>,

    /// Offset this page started from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_from: Option<usize>,

    /// Offset of the next page, present when more remain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_id: Option<usize>,

    /// Requested page size after clamping
    pub max_items: usize,
}

/// One rejected change in an [`InvalidBatchChangeResponses`] reply: the
/// original input with its accumulated error messages merged in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidChange {
    /// The change exactly as submitted
    #[serde(flatten)]
    pub input: ChangeInput,

    /// Error messages attached to this position
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// The reply for a batch that failed validation: the submission echoed in
/// its original shape, with per-position errors merged in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidBatchChangeResponses {
    /// Submitter comments, exactly as submitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,

    /// Per-position results, aligned with the input
    pub changes: Vec<InvalidChange>,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
