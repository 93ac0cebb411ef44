// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Handoff of accepted batches to the downstream change processor.
//!
//! The converter owns the persistence boundary of an accepted batch: it
//! stores the entity and enqueues per-change work. The intake pipeline
//! awaits it and treats its failure as terminal for the request.
//!
//! [`QueueingBatchConverter`] is the bundled implementation: it saves the
//! batch through the [`BatchChangeRepository`] and then pushes one
//! [`ChangeCommand`] per stored change onto an in-process queue. Applying
//! the commands against DNS authorities is the queue consumer's job.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::batch::context::ExistingRecordSets;
use crate::batch::discovery::ExistingZones;
use crate::errors::ConversionError;
use crate::repository::BatchChangeRepository;
use crate::types::{BatchChange, RecordSet, SingleChange, Zone};

#[cfg(test)]
#[path = "converter_tests.rs"]
mod converter_tests;

/// Result of a successful conversion.
#[derive(Debug)]
pub struct BatchConversionOutput {
    /// The persisted batch change
    pub batch_change: BatchChange,
}

/// One unit of downstream work: a stored change plus the context the
/// processor needs to apply it.
#[derive(Debug, Clone)]
pub struct ChangeCommand {
    /// The batch this change belongs to
    pub batch_change_id: String,
    /// The stored change
    pub change: SingleChange,
    /// The authoritative zone, from the intake snapshot
    pub zone: Option<Zone>,
    /// Record sets at the target name at intake time
    pub existing_record_sets: Vec<RecordSet>,
}

/// Enqueues an accepted batch for asynchronous processing.
#[async_trait]
pub trait BatchConverter: Send + Sync {
    /// Persist `batch` and hand its changes to the downstream processor.
    ///
    /// The intake snapshots travel along so the processor can re-check
    /// conflicts at apply time without refetching.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] when persistence or enqueueing fails;
    /// partial persistence is this component's responsibility, never the
    /// caller's.
    async fn send_batch_for_processing(
        &self,
        batch: BatchChange,
        zones: ExistingZones,
        record_sets: ExistingRecordSets,
    ) -> Result<BatchConversionOutput, ConversionError>;
}

/// The bundled converter: store, then enqueue on an in-process channel.
pub struct QueueingBatchConverter {
    batch_repo: Arc<dyn BatchChangeRepository>,
    sender: mpsc::UnboundedSender<ChangeCommand>,
}

impl QueueingBatchConverter {
    /// Create a converter writing to `batch_repo` and `sender`.
    #[must_use]
    pub fn new(
        batch_repo: Arc<dyn BatchChangeRepository>,
        sender: mpsc::UnboundedSender<ChangeCommand>,
    ) -> Self {
        QueueingBatchConverter { batch_repo, sender }
    }
}

#[async_trait]
impl BatchConverter for QueueingBatchConverter {
    async fn send_batch_for_processing(
        &self,
        batch: BatchChange,
        zones: ExistingZones,
        record_sets: ExistingRecordSets,
    ) -> Result<BatchConversionOutput, ConversionError> {
        let stored = self.batch_repo.save(batch).await?;
        info!(
            batch_change_id = %stored.id,
            changes = stored.changes.len(),
            user = %stored.user_name,
            "Stored batch change, enqueueing for processing"
        );

        for change in &stored.changes {
            let command = ChangeCommand {
                batch_change_id: stored.id.clone(),
                change: change.clone(),
                zone: zones.get_by_name(&change.zone_name).cloned(),
                existing_record_sets: record_sets
                    .get(&change.zone_id, &change.record_name)
                    .to_vec(),
            };
            debug!(
                batch_change_id = %stored.id,
                record_name = %command.change.record_name,
                zone = %command.change.zone_name,
                "Enqueueing change command"
            );
            self.sender
                .send(command)
                .map_err(|_| ConversionError::QueueClosed)?;
        }

        Ok(BatchConversionOutput {
            batch_change: stored,
        })
    }
}
