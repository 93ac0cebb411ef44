// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-change input validation.
//!
//! Every change is validated independently and every failure is collected;
//! nothing in this stage short-circuits. The result is a [`ValidatedBatch`]
//! aligned position-for-position with the submitted batch, each slot either
//! the typed, normalized change or the non-empty list of everything wrong
//! with it.
//!
//! Validation here is purely syntactic and intra-batch: name and payload
//! shape, TTL bounds, and duplicate add detection. Checks that need the
//! discovered zone or the current record inventory live in
//! [`crate::batch::context`].

use std::collections::HashMap;

use crate::config::Config;
use crate::constants::{MAX_MX_PREFERENCE, MAX_TXT_LENGTH};
use crate::dns::{normalize_fqdn, validate_fqdn, validate_ipv4_address, validate_ipv6_address};
use crate::errors::ChangeError;
use crate::types::{
    BatchChangeInput, ChangeInput, ChangeType, RecordData, RecordType, ValidChangeInput,
};

#[cfg(test)]
#[path = "validation_tests.rs"]
mod validation_tests;

/// One position's outcome: the validated value, or everything wrong with it.
pub type Validated<T> = Result<T, Vec<ChangeError>>;

/// Ordered per-position outcomes for a whole batch.
pub type ValidatedBatch<T> = Vec<Validated<T>>;

/// Whether every position in the batch is valid.
#[must_use]
pub fn batch_is_accepted<T>(batch: &ValidatedBatch<T>) -> bool {
    batch.iter().all(Result::is_ok)
}

/// Append an error to a position, demoting a valid slot if necessary.
pub fn add_error<T>(slot: &mut Validated<T>, error: ChangeError) {
    match slot {
        Ok(_) => *slot = Err(vec![error]),
        Err(errors) => errors.push(error),
    }
}

/// Validate every change in the batch, accumulating errors per position.
#[must_use]
pub fn validate_batch_inputs(
    config: &Config,
    input: &BatchChangeInput,
) -> ValidatedBatch<ValidChangeInput> {
    let mut validated: ValidatedBatch<ValidChangeInput> = input
        .changes
        .iter()
        .map(|change| validate_change_input(config, change))
        .collect();
    flag_duplicate_add_names(&input.changes, &mut validated);
    validated
}

/// The name and type key two adds may not share within one batch.
fn duplicate_key(change: &ChangeInput) -> (String, RecordType) {
    let name = match change.record_type {
        RecordType::Ptr => change.input_name.trim().to_lowercase(),
        _ => normalize_fqdn(&change.input_name),
    };
    (name, change.record_type)
}

/// Attach `RecordNameNotUniqueInBatch` to every add sharing a name and type
/// with another add.
fn flag_duplicate_add_names(
    changes: &[ChangeInput],
    validated: &mut ValidatedBatch<ValidChangeInput>,
) {
    let mut counts: HashMap<(String, RecordType), usize> = HashMap::new();
    for change in changes {
        if change.change_type == ChangeType::Add {
            *counts.entry(duplicate_key(change)).or_insert(0) += 1;
        }
    }

    for (change, slot) in changes.iter().zip(validated.iter_mut()) {
        if change.change_type != ChangeType::Add {
            continue;
        }
        if counts.get(&duplicate_key(change)).copied().unwrap_or(0) > 1 {
            add_error(
                slot,
                ChangeError::RecordNameNotUniqueInBatch {
                    name: duplicate_key(change).0,
                },
            );
        }
    }
}

fn validate_change_input(config: &Config, change: &ChangeInput) -> Validated<ValidChangeInput> {
    let mut errors = Vec::new();

    let input_name = match change.record_type {
        RecordType::Ptr => {
            let trimmed = change.input_name.trim().to_string();
            if !validate_ipv4_address(&trimmed) && !validate_ipv6_address(&trimmed) {
                errors.push(ChangeError::InvalidIpAddress {
                    address: trimmed.clone(),
                });
            }
            trimmed
        }
        _ => {
            if !validate_fqdn(&change.input_name) {
                errors.push(ChangeError::InvalidDomainName {
                    name: change.input_name.trim().to_string(),
                });
            }
            normalize_fqdn(&change.input_name)
        }
    };

    if let Some(ttl) = change.ttl {
        if ttl < config.min_ttl || ttl > config.max_ttl {
            errors.push(ChangeError::InvalidTtl {
                ttl,
                min: config.min_ttl,
                max: config.max_ttl,
            });
        }
    }

    let record = match change.change_type {
        // Deletes target the whole record set; any payload is ignored
        ChangeType::DeleteRecordSet => None,
        ChangeType::Add => validate_record_data(change, &mut errors),
    };

    if errors.is_empty() {
        Ok(ValidChangeInput {
            change_type: change.change_type,
            input_name,
            record_type: change.record_type,
            ttl: change.ttl,
            record,
        })
    } else {
        Err(errors)
    }
}

fn missing_field(field: &str, record_type: RecordType) -> ChangeError {
    ChangeError::InvalidInputField {
        field: format!("record.{field}"),
        reason: format!("required for {record_type} records"),
    }
}

/// Validate the type-specific payload of an add, producing the typed record
/// data when everything checks out.
fn validate_record_data(change: &ChangeInput, errors: &mut Vec<ChangeError>) -> Option<RecordData> {
    let record = &change.record;
    match change.record_type {
        RecordType::A => match record.address.as_deref().map(str::trim) {
            None => {
                errors.push(missing_field("address", change.record_type));
                None
            }
            Some(address) => match address.parse() {
                Ok(parsed) => Some(RecordData::A { address: parsed }),
                Err(_) => {
                    errors.push(ChangeError::InvalidIpAddress {
                        address: address.to_string(),
                    });
                    None
                }
            },
        },
        RecordType::Aaaa => match record.address.as_deref().map(str::trim) {
            None => {
                errors.push(missing_field("address", change.record_type));
                None
            }
            Some(address) => match address.parse() {
                Ok(parsed) => Some(RecordData::Aaaa { address: parsed }),
                Err(_) => {
                    errors.push(ChangeError::InvalidIpAddress {
                        address: address.to_string(),
                    });
                    None
                }
            },
        },
        RecordType::Cname => {
            validate_fqdn_field(record.cname.as_deref(), "cname", change.record_type, errors)
                .map(|cname| RecordData::Cname { cname })
        }
        RecordType::Mx => {
            let preference = match record.preference {
                None => {
                    errors.push(missing_field("preference", change.record_type));
                    None
                }
                Some(preference) if (0..=MAX_MX_PREFERENCE).contains(&preference) => {
                    u16::try_from(preference).ok()
                }
                Some(preference) => {
                    errors.push(ChangeError::InvalidInputField {
                        field: "record.preference".to_string(),
                        reason: format!(
                            "{preference} is out of range (0 to {MAX_MX_PREFERENCE})"
                        ),
                    });
                    None
                }
            };
            let exchange = validate_fqdn_field(
                record.exchange.as_deref(),
                "exchange",
                change.record_type,
                errors,
            );
            match (preference, exchange) {
                (Some(preference), Some(exchange)) => Some(RecordData::Mx {
                    preference,
                    exchange,
                }),
                _ => None,
            }
        }
        RecordType::Ns => {
            validate_fqdn_field(record.nsdname.as_deref(), "nsdname", change.record_type, errors)
                .map(|nsdname| RecordData::Ns { nsdname })
        }
        RecordType::Ptr => validate_fqdn_field(
            record.ptrdname.as_deref(),
            "ptrdname",
            change.record_type,
            errors,
        )
        .map(|ptrdname| RecordData::Ptr { ptrdname }),
        RecordType::Txt => match record.text.as_deref() {
            None => {
                errors.push(missing_field("text", change.record_type));
                None
            }
            Some(text) if text.is_empty() || text.len() > MAX_TXT_LENGTH => {
                errors.push(ChangeError::InvalidInputField {
                    field: "record.text".to_string(),
                    reason: format!("length must be between 1 and {MAX_TXT_LENGTH}"),
                });
                None
            }
            Some(text) => Some(RecordData::Txt {
                text: text.to_string(),
            }),
        },
    }
}

/// Validate a required FQDN payload field, returning the normalized name.
fn validate_fqdn_field(
    value: Option<&str>,
    field: &str,
    record_type: RecordType,
    errors: &mut Vec<ChangeError>,
) -> Option<String> {
    match value {
        None => {
            errors.push(missing_field(field, record_type));
            None
        }
        Some(name) if validate_fqdn(name) => Some(normalize_fqdn(name)),
        Some(name) => {
            errors.push(ChangeError::InvalidDomainName {
                name: name.trim().to_string(),
            });
            None
        }
    }
}
