// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Batch change intake pipeline.
//!
//! [`BatchChangeService`] sequences the fixed pipeline: size gate →
//! per-change input validation → zone discovery → record set fetch →
//! contextual validation → assembly → conversion. Per-change failures
//! accumulate position-by-position and reject the batch as a whole; only a
//! batch whose every position is valid reaches the converter, so a rejected
//! batch leaves no persistent trace.
//!
//! - [`validation`] — syntactic per-change checks (no external state)
//! - [`discovery`] — authoritative zone resolution per change
//! - [`context`] — checks against the current record inventory

pub mod context;
pub mod discovery;
pub mod validation;

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::{Config, RuleSet};
use crate::constants::DEFAULT_RECORD_TTL_SECS;
use crate::converter::BatchConverter;
use crate::errors::BatchChangeError;
use crate::metrics;
use crate::repository::{BatchChangeRepository, RecordSetRepository, ZoneRepository};
use crate::types::{
    generate_id, AuthPrincipal, BatchChange, BatchChangeInput, BatchChangeStatus,
    BatchChangeSummaryList, ChangeForValidation, ChangeType, InvalidBatchChangeResponses,
    InvalidChange, SingleChange, SingleChangeStatus,
};
use validation::ValidatedBatch;


/// The public batch change operations.
///
/// Holds the repository handles, the converter, and the compiled policy
/// rules. No state crosses requests; the zone and record set snapshots are
/// owned by each intake call.
pub struct BatchChangeService {
    zone_repo: Arc<dyn ZoneRepository>,
    record_set_repo: Arc<dyn RecordSetRepository>,
    batch_repo: Arc<dyn BatchChangeRepository>,
    converter: Arc<dyn BatchConverter>,
    config: Arc<Config>,
    rules: RuleSet,
}

impl BatchChangeService {
    /// Create the service, compiling the configured policy rules.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured regex fails to compile.
    pub fn new(
        zone_repo: Arc<dyn ZoneRepository>,
        record_set_repo: Arc<dyn RecordSetRepository>,
        batch_repo: Arc<dyn BatchChangeRepository>,
        converter: Arc<dyn BatchConverter>,
        config: Arc<Config>,
    ) -> anyhow::Result<Self> {
        let rules = config.rules()?;
        Ok(BatchChangeService {
            zone_repo,
            record_set_repo,
            batch_repo,
            converter,
            config,
            rules,
        })
    }

    /// Validate, assemble, and enqueue a batch of record changes.
    ///
    /// Either the whole batch is accepted and the persisted [`BatchChange`]
    /// is returned, or the submission is echoed back with every position's
    /// accumulated errors. Partial acceptance does not exist.
    ///
    /// # Errors
    ///
    /// - [`BatchChangeError::BatchChangeIsEmpty`] / `BatchChangeIsTooLarge`
    ///   on the size gate
    /// - [`BatchChangeError::InvalidBatchChangeResponses`] when any position
    ///   fails validation
    /// - [`BatchChangeError::Repository`] / `Conversion` on transport
    ///   failures
    pub async fn apply_batch_change(
        &self,
        auth: &AuthPrincipal,
        input: BatchChangeInput,
    ) -> Result<BatchChange, BatchChangeError> {
        let started = Instant::now();

        if input.changes.is_empty() {
            metrics::record_batch_rejected("empty");
            return Err(BatchChangeError::BatchChangeIsEmpty);
        }
        let limit = self.config.batch_change_limit;
        if input.changes.len() > limit {
            metrics::record_batch_rejected("too_large");
            return Err(BatchChangeError::BatchChangeIsTooLarge { limit });
        }

        debug!(
            user = %auth.user_name,
            changes = input.changes.len(),
            "Validating batch change"
        );

        let validated = validation::validate_batch_inputs(&self.config, &input);
        let (discovered, zones) =
            discovery::discover_zones(self.zone_repo.as_ref(), validated).await?;
        let record_sets =
            context::fetch_record_sets(self.record_set_repo.as_ref(), &discovered).await?;
        let contextual =
            context::validate_changes_with_context(&self.rules, auth, discovered, &record_sets);

        if !validation::batch_is_accepted(&contextual) {
            let responses = invalid_responses(&input, &contextual);
            let failed = responses
                .changes
                .iter()
                .filter(|r| !r.errors.is_empty())
                .count();
            info!(
                user = %auth.user_name,
                failed,
                total = responses.changes.len(),
                "Rejecting batch change"
            );
            metrics::record_batch_rejected("validation");
            return Err(BatchChangeError::InvalidBatchChangeResponses { responses });
        }

        let accepted: Vec<ChangeForValidation> =
            contextual.into_iter().filter_map(Result::ok).collect();
        let batch = assemble_batch_change(auth, input.comments, accepted);

        let output = self
            .converter
            .send_batch_for_processing(batch, zones, record_sets)
            .await?;

        metrics::record_batch_accepted(&output.batch_change, started.elapsed());
        Ok(output.batch_change)
    }

    /// Load a batch change by id.
    ///
    /// # Errors
    ///
    /// - [`BatchChangeError::BatchChangeNotFound`] when no such batch exists
    /// - [`BatchChangeError::UserNotAuthorizedToView`] unless the requester
    ///   created the batch or is a super-user
    pub async fn get_batch_change(
        &self,
        auth: &AuthPrincipal,
        id: &str,
    ) -> Result<BatchChange, BatchChangeError> {
        let batch = self
            .batch_repo
            .get_batch_change(id)
            .await?
            .ok_or_else(|| BatchChangeError::BatchChangeNotFound { id: id.to_string() })?;

        if batch.user_id != auth.user_id && !auth.is_super {
            return Err(BatchChangeError::UserNotAuthorizedToView {
                user_name: auth.user_name.clone(),
                id: id.to_string(),
            });
        }
        Ok(batch)
    }

    /// Page through the requester's batch changes, newest first.
    ///
    /// `max_items` is clamped to `1..=max-list-items`.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the repository call fails.
    pub async fn list_batch_change_summaries(
        &self,
        auth: &AuthPrincipal,
        start_from: Option<usize>,
        max_items: Option<usize>,
    ) -> Result<BatchChangeSummaryList, BatchChangeError> {
        let ceiling = self.config.max_list_items;
        let max_items = max_items.unwrap_or(ceiling).clamp(1, ceiling);
        let summaries = self
            .batch_repo
            .get_batch_change_summaries(&auth.user_id, start_from, max_items)
            .await?;
        Ok(summaries)
    }
}

/// Build the persistent entity from a fully-valid batch.
///
/// Stored changes keep their input order; adds carry the effective TTL and
/// the typed record data, deletes carry neither.
fn assemble_batch_change(
    auth: &AuthPrincipal,
    comments: Option<String>,
    changes: Vec<ChangeForValidation>,
) -> BatchChange {
    let single_changes: Vec<SingleChange> = changes
        .into_iter()
        .map(|change| SingleChange {
            id: generate_id(),
            change_type: change.change_type(),
            record_type: change.record_type(),
            record_name: change.record_name,
            zone_id: change.zone.id,
            zone_name: change.zone.name,
            ttl: match change.change.change_type {
                ChangeType::Add => {
                    Some(change.change.ttl.unwrap_or(DEFAULT_RECORD_TTL_SECS))
                }
                ChangeType::DeleteRecordSet => None,
            },
            input_name: change.change.input_name,
            record: change.change.record,
            status: SingleChangeStatus::Pending,
        })
        .collect();

    BatchChange {
        id: generate_id(),
        user_id: auth.user_id.clone(),
        user_name: auth.user_name.clone(),
        comments,
        created_timestamp: Utc::now(),
        changes: single_changes,
        status: BatchChangeStatus::Pending,
    }
}

/// Echo the submission in its original shape — comments included — with
/// every position's accumulated errors merged in, preserving input order.
fn invalid_responses(
    input: &BatchChangeInput,
    results: &ValidatedBatch<ChangeForValidation>,
) -> InvalidBatchChangeResponses {
    let changes = input
        .changes
        .iter()
        .zip(results.iter())
        .map(|(change, result)| InvalidChange {
            input: change.clone(),
            errors: match result {
                Ok(_) => Vec::new(),
                Err(errors) => errors.iter().map(ToString::to_string).collect(),
            },
        })
        .collect();

    InvalidBatchChangeResponses {
        comments: input.comments.clone(),
        changes,
    }
}
