// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory repository implementations.
//!
//! Reference implementations of the repository contracts backed by
//! `tokio::sync::RwLock` maps. The bundled binary uses them as its store,
//! optionally seeded from a YAML file; the test suite uses them directly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tokio::sync::RwLock;
use tracing::info;

use crate::dns::normalize_fqdn;
use crate::errors::RepositoryError;
use crate::repository::{BatchChangeRepository, RecordSetRepository, ZoneRepository};
use crate::types::{BatchChange, BatchChangeSummary, BatchChangeSummaryList, RecordSet, Zone};

/// In-memory zone store, indexed by normalized zone name.
#[derive(Default)]
pub struct InMemoryZoneRepository {
    zones: RwLock<HashMap<String, Zone>>,
}

impl InMemoryZoneRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a zone.
    pub async fn put_zone(&self, zone: Zone) {
        let mut zones = self.zones.write().await;
        zones.insert(zone.name.clone(), zone);
    }
}

#[async_trait]
impl ZoneRepository for InMemoryZoneRepository {
    async fn get_zones_by_names(
        &self,
        names: &HashSet<String>,
    ) -> Result<Vec<Zone>, RepositoryError> {
        let zones = self.zones.read().await;
        Ok(names
            .iter()
            .filter_map(|name| zones.get(&normalize_fqdn(name)).cloned())
            .collect())
    }

    async fn get_zones_by_filters(
        &self,
        filters: &HashSet<String>,
    ) -> Result<Vec<Zone>, RepositoryError> {
        let zones = self.zones.read().await;
        Ok(zones
            .values()
            .filter(|zone| filters.iter().any(|filter| zone.name.contains(filter.as_str())))
            .cloned()
            .collect())
    }
}

/// In-memory record set store, indexed by `(zone_id, record_name)`.
#[derive(Default)]
pub struct InMemoryRecordSetRepository {
    record_sets: RwLock<HashMap<(String, String), Vec<RecordSet>>>,
}

impl InMemoryRecordSetRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record set. Names are stored lowercased to match lookups.
    pub async fn put_record_set(&self, mut record_set: RecordSet) {
        record_set.name = record_set.name.to_lowercase();
        let mut record_sets = self.record_sets.write().await;
        record_sets
            .entry((record_set.zone_id.clone(), record_set.name.clone()))
            .or_default()
            .push(record_set);
    }
}

#[async_trait]
impl RecordSetRepository for InMemoryRecordSetRepository {
    async fn get_record_sets_by_name(
        &self,
        zone_id: &str,
        name: &str,
    ) -> Result<Vec<RecordSet>, RepositoryError> {
        let record_sets = self.record_sets.read().await;
        Ok(record_sets
            .get(&(zone_id.to_string(), name.to_lowercase()))
            .cloned()
            .unwrap_or_default())
    }
}

/// In-memory batch change store.
#[derive(Default)]
pub struct InMemoryBatchChangeRepository {
    batches: RwLock<Vec<BatchChange>>,
}

impl InMemoryBatchChangeRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored batches.
    pub async fn len(&self) -> usize {
        self.batches.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.batches.read().await.is_empty()
    }
}

#[async_trait]
impl BatchChangeRepository for InMemoryBatchChangeRepository {
    async fn save(&self, batch: BatchChange) -> Result<BatchChange, RepositoryError> {
        let mut batches = self.batches.write().await;
        batches.retain(|existing| existing.id != batch.id);
        batches.push(batch.clone());
        Ok(batch)
    }

    async fn get_batch_change(&self, id: &str) -> Result<Option<BatchChange>, RepositoryError> {
        let batches = self.batches.read().await;
        Ok(batches.iter().find(|batch| batch.id == id).cloned())
    }

    async fn get_batch_change_summaries(
        &self,
        user_id: &str,
        start_from: Option<usize>,
        max_items: usize,
    ) -> Result<BatchChangeSummaryList, RepositoryError> {
        let batches = self.batches.read().await;
        let mut owned: Vec<&BatchChange> = batches
            .iter()
            .filter(|batch| batch.user_id == user_id)
            .collect();
        owned.sort_by(|a, b| b.created_timestamp.cmp(&a.created_timestamp));

        let offset = start_from.unwrap_or(0);
        let page: Vec<BatchChangeSummary> = owned
            .iter()
            .skip(offset)
            .take(max_items)
            .map(|batch| BatchChangeSummary::from(*batch))
            .collect();

        let next_id = if offset + page.len() < owned.len() {
            Some(offset + page.len())
        } else {
            None
        };

        Ok(BatchChangeSummaryList {
            batch_changes: page,
            start_from,
            next_id,
            max_items,
        })
    }
}

/// Zones and record sets loaded into the in-memory stores at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedData {
    /// Zones to install
    #[serde(default)]
    pub zones: Vec<Zone>,

    /// Record sets to install
    #[serde(default)]
    pub record_sets: Vec<RecordSet>,
}

impl SeedData {
    /// Load seed data from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let seed: SeedData = serde_yaml::from_str(&raw)?;
        Ok(seed)
    }

    /// Install the seed data into the given stores.
    pub async fn install(
        self,
        zones: &InMemoryZoneRepository,
        record_sets: &InMemoryRecordSetRepository,
    ) {
        info!(
            zones = self.zones.len(),
            record_sets = self.record_sets.len(),
            "Seeding in-memory repositories"
        );
        for mut zone in self.zones {
            zone.name = normalize_fqdn(&zone.name);
            zones.put_zone(zone).await;
        }
        for record_set in self.record_sets {
            record_sets.put_record_set(record_set).await;
        }
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod memory_tests;
