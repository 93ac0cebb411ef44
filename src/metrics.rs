// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the Batchy service.
//!
//! All metrics live in a dedicated registry with the `batchy_` namespace
//! prefix and are exposed through the `/metrics` endpoint.

use prometheus::{
    CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

use crate::types::BatchChange;

/// Namespace prefix for all Batchy metrics
const METRICS_NAMESPACE: &str = "batchy";

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via the
/// `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Total batch change submissions by outcome
///
/// Labels:
/// - `outcome`: `accepted`, `rejected_validation`, `rejected_empty`,
///   `rejected_too_large`
pub static BATCH_CHANGES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_batch_changes_total"),
        "Total batch change submissions by outcome",
    );
    let counter = CounterVec::new(opts, &["outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total accepted single changes by record type and change type
pub static SINGLE_CHANGES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_single_changes_total"),
        "Total accepted single changes by record type and change type",
    );
    let counter = CounterVec::new(opts, &["record_type", "change_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of accepted intake requests in seconds
pub static INTAKE_DURATION_SECONDS: LazyLock<Histogram> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_intake_duration_seconds"),
        "Duration of accepted batch change intakes in seconds",
    )
    .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]);
    let histogram = Histogram::with_opts(opts).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Record an accepted batch and its intake duration.
pub fn record_batch_accepted(batch: &BatchChange, duration: Duration) {
    BATCH_CHANGES_TOTAL.with_label_values(&["accepted"]).inc();
    INTAKE_DURATION_SECONDS.observe(duration.as_secs_f64());
    for change in &batch.changes {
        let record_type = change.record_type.to_string();
        let change_type = format!("{:?}", change.change_type);
        SINGLE_CHANGES_TOTAL
            .with_label_values(&[record_type.as_str(), change_type.as_str()])
            .inc();
    }
}

/// Record a rejected batch with the gate that rejected it.
pub fn record_batch_rejected(reason: &str) {
    let outcome = format!("rejected_{reason}");
    BATCH_CHANGES_TOTAL
        .with_label_values(&[outcome.as_str()])
        .inc();
}

/// Render the registry in the Prometheus text exposition format.
#[must_use]
pub fn metrics_text() -> String {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod metrics_tests;
