// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Contextual validation against the current record inventory.
//!
//! After zone discovery, the `(zone, record name)` pairs touched by the
//! batch are deduplicated and fetched concurrently into an
//! [`ExistingRecordSets`] snapshot owned by the request. Each change is then
//! checked against the snapshot, the zone's access rules, and the configured
//! DNS policy. Errors accumulate per position; one bad change never stops
//! its siblings from being checked.

use futures::future::try_join_all;
use std::collections::{HashMap, HashSet};

use crate::batch::validation::{add_error, ValidatedBatch};
use crate::config::RuleSet;
use crate::errors::{ChangeError, RepositoryError};
use crate::repository::RecordSetRepository;
use crate::types::{AuthPrincipal, ChangeForValidation, ChangeType, RecordData, RecordSet, RecordType};

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;

/// Point-in-time record set snapshot for one intake request.
#[derive(Debug, Default)]
pub struct ExistingRecordSets {
    by_key: HashMap<(String, String), Vec<RecordSet>>,
}

impl ExistingRecordSets {
    /// Build a snapshot from fetched record sets.
    #[must_use]
    pub fn new(record_sets: Vec<RecordSet>) -> Self {
        let mut by_key: HashMap<(String, String), Vec<RecordSet>> = HashMap::new();
        for record_set in record_sets {
            by_key
                .entry((record_set.zone_id.clone(), record_set.name.clone()))
                .or_default()
                .push(record_set);
        }
        ExistingRecordSets { by_key }
    }

    /// All record sets at `(zone_id, name)`, across types.
    #[must_use]
    pub fn get(&self, zone_id: &str, name: &str) -> &[RecordSet] {
        self.by_key
            .get(&(zone_id.to_string(), name.to_string()))
            .map_or(&[], Vec::as_slice)
    }

    /// The record set of `record_type` at `(zone_id, name)`, if any.
    #[must_use]
    pub fn get_by_type(
        &self,
        zone_id: &str,
        name: &str,
        record_type: RecordType,
    ) -> Option<&RecordSet> {
        self.get(zone_id, name)
            .iter()
            .find(|record_set| record_set.record_type == record_type)
    }

    /// Whether any record set exists at `(zone_id, name)`.
    #[must_use]
    pub fn contains_any(&self, zone_id: &str, name: &str) -> bool {
        !self.get(zone_id, name).is_empty()
    }

    /// Total number of record sets in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.values().map(Vec::len).sum()
    }

    /// Whether the snapshot holds no record sets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Fetch the record sets touched by the batch into one snapshot.
///
/// The `(zone_id, record_name)` pairs of all successfully-discovered changes
/// are deduplicated and fetched concurrently.
///
/// # Errors
///
/// Returns a transport error if any lookup fails.
pub async fn fetch_record_sets(
    record_set_repo: &dyn RecordSetRepository,
    batch: &ValidatedBatch<ChangeForValidation>,
) -> Result<ExistingRecordSets, RepositoryError> {
    let keys: HashSet<(String, String)> = batch
        .iter()
        .flatten()
        .map(|change| (change.zone.id.clone(), change.record_name.clone()))
        .collect();

    let lookups = keys
        .iter()
        .map(|(zone_id, name)| record_set_repo.get_record_sets_by_name(zone_id, name));
    let fetched = try_join_all(lookups).await?;

    Ok(ExistingRecordSets::new(
        fetched.into_iter().flatten().collect(),
    ))
}

/// Validate every discovered change against the snapshot and policy.
///
/// Invalid positions pass through untouched.
#[must_use]
pub fn validate_changes_with_context(
    rules: &RuleSet,
    auth: &AuthPrincipal,
    batch: ValidatedBatch<ChangeForValidation>,
    existing: &ExistingRecordSets,
) -> ValidatedBatch<ChangeForValidation> {
    batch
        .into_iter()
        .map(|slot| {
            slot.and_then(|change| {
                let errors = change_errors(rules, auth, &change, existing);
                if errors.is_empty() {
                    Ok(change)
                } else {
                    Err(errors)
                }
            })
        })
        .collect()
}

fn change_errors(
    rules: &RuleSet,
    auth: &AuthPrincipal,
    change: &ChangeForValidation,
    existing: &ExistingRecordSets,
) -> Vec<ChangeError> {
    let mut slot = Ok(());
    let name = change.display_name();

    if rules.is_high_value(name) {
        add_error(
            &mut slot,
            ChangeError::HighValueDomain {
                name: name.to_string(),
            },
        );
    }

    if !auth.can_modify_zone(&change.zone) {
        add_error(
            &mut slot,
            ChangeError::UserIsNotAuthorized {
                user_name: auth.user_name.clone(),
                zone_name: change.zone.name.clone(),
            },
        );
    }

    match change.change_type() {
        ChangeType::Add => validate_add(&mut slot, change, existing),
        ChangeType::DeleteRecordSet => validate_delete(&mut slot, change, existing),
    }

    if let Some(RecordData::Ns { nsdname }) = &change.change.record {
        if !rules.is_approved_name_server(nsdname) {
            add_error(
                &mut slot,
                ChangeError::NotApprovedNameServer {
                    ns: nsdname.clone(),
                },
            );
        }
    }

    slot.err().unwrap_or_default()
}

/// An add conflicts with an existing record set of its own type, and CNAME
/// conflicts with anything (in either direction).
fn validate_add(
    slot: &mut Result<(), Vec<ChangeError>>,
    change: &ChangeForValidation,
    existing: &ExistingRecordSets,
) {
    let zone_id = &change.zone.id;
    let name = &change.record_name;
    let record_type = change.change.record_type;
    let display = change.display_name();

    if existing.get_by_type(zone_id, name, record_type).is_some() {
        add_error(
            slot,
            ChangeError::RecordAlreadyExists {
                name: display.to_string(),
            },
        );
        return;
    }

    let conflicts_with_cname = if record_type == RecordType::Cname {
        existing.contains_any(zone_id, name)
    } else {
        existing
            .get_by_type(zone_id, name, RecordType::Cname)
            .is_some()
    };
    if conflicts_with_cname {
        add_error(
            slot,
            ChangeError::CnameIsNotUnique {
                name: display.to_string(),
            },
        );
    }
}

/// A delete requires a record set of its type to exist.
fn validate_delete(
    slot: &mut Result<(), Vec<ChangeError>>,
    change: &ChangeForValidation,
    existing: &ExistingRecordSets,
) {
    if existing
        .get_by_type(
            &change.zone.id,
            &change.record_name,
            change.change.record_type,
        )
        .is_none()
    {
        add_error(
            slot,
            ChangeError::RecordDoesNotExist {
                name: change.display_name().to_string(),
            },
        );
    }
}
