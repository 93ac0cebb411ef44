// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Persistence contracts consumed by the intake pipeline.
//!
//! Durable stores are external to this service; the traits here are the
//! interfaces the core calls. All operations are asynchronous and fail with
//! the transport-level [`RepositoryError`], never with domain errors.
//!
//! [`memory`] provides reference implementations backed by in-process maps,
//! used by the bundled binary and the test suite.

pub mod memory;

use async_trait::async_trait;
use std::collections::HashSet;

use crate::errors::RepositoryError;
use crate::types::{BatchChange, BatchChangeSummaryList, RecordSet, Zone};

/// Zone lookups used by zone discovery.
#[async_trait]
pub trait ZoneRepository: Send + Sync {
    /// Fetch zones by exact (normalized) name; missing names are omitted.
    async fn get_zones_by_names(
        &self,
        names: &HashSet<String>,
    ) -> Result<Vec<Zone>, RepositoryError>;

    /// Fetch zones whose name contains any of the filter strings.
    ///
    /// Substring matching is what lets the classful `in-addr.arpa.` name of
    /// an IPv4 address capture classless `<lo>/<prefix>` delegations, whose
    /// names an exact lookup can never produce.
    async fn get_zones_by_filters(
        &self,
        filters: &HashSet<String>,
    ) -> Result<Vec<Zone>, RepositoryError>;
}

/// Record set lookups used by contextual validation.
#[async_trait]
pub trait RecordSetRepository: Send + Sync {
    /// All record sets at `name` within the zone, across types.
    async fn get_record_sets_by_name(
        &self,
        zone_id: &str,
        name: &str,
    ) -> Result<Vec<RecordSet>, RepositoryError>;
}

/// Batch change persistence.
#[async_trait]
pub trait BatchChangeRepository: Send + Sync {
    /// Persist a batch change, returning the stored entity.
    async fn save(&self, batch: BatchChange) -> Result<BatchChange, RepositoryError>;

    /// Load a batch change by id.
    async fn get_batch_change(&self, id: &str) -> Result<Option<BatchChange>, RepositoryError>;

    /// Page through a user's batch changes, newest first.
    async fn get_batch_change_summaries(
        &self,
        user_id: &str,
        start_from: Option<usize>,
        max_items: usize,
    ) -> Result<BatchChangeSummaryList, RepositoryError>;
}
