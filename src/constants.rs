// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the Batchy service.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Batch Intake Constants
// ============================================================================

/// Maximum number of single changes accepted in one batch
pub const DEFAULT_BATCH_CHANGE_LIMIT: usize = 1000;

/// Default lower TTL bound for submitted records (seconds)
pub const DEFAULT_MIN_TTL_SECS: u32 = 30;

/// Default upper TTL bound for submitted records (seconds)
pub const DEFAULT_MAX_TTL_SECS: u32 = 86400;

/// TTL applied when a change omits one (2 hours)
pub const DEFAULT_RECORD_TTL_SECS: u32 = 7200;

/// Ceiling for `maxItems` on batch change listings
pub const DEFAULT_MAX_LIST_ITEMS: usize = 100;

// ============================================================================
// DNS Name Constants
// ============================================================================

/// Record name used for records at the zone apex
pub const APEX_MARKER: &str = "@";

/// Suffix of every IPv4 reverse zone name
pub const IN_ADDR_ARPA_SUFFIX: &str = "in-addr.arpa.";

/// Suffix of every IPv6 reverse zone name
pub const IP6_ARPA_SUFFIX: &str = "ip6.arpa.";

/// Maximum length of a fully-qualified domain name
pub const MAX_DOMAIN_NAME_LENGTH: usize = 255;

/// Maximum length of a single DNS label
pub const MAX_LABEL_LENGTH: usize = 63;

/// Maximum length of TXT record text
pub const MAX_TXT_LENGTH: usize = 64764;

/// Largest MX preference value (16-bit per RFC 1035)
pub const MAX_MX_PREFERENCE: i64 = 65535;

// ============================================================================
// Reverse Zone Discovery Constants
// ============================================================================

/// Shortest IPv6 reverse delegation considered during zone discovery
pub const IPV6_ZONE_MIN_CIDR: u8 = 20;

/// Longest IPv6 reverse delegation considered during zone discovery
pub const IPV6_ZONE_MAX_CIDR: u8 = 64;

// ============================================================================
// API Server Constants
// ============================================================================

/// Default bind address for the API server
pub const DEFAULT_API_BIND_ADDRESS: &str = "0.0.0.0";

/// Default port for the API server
pub const DEFAULT_API_PORT: u16 = 9090;

/// Path for the Prometheus metrics endpoint
pub const METRICS_PATH: &str = "/metrics";

/// Liveness response body
pub const PING_RESPONSE: &str = "PONG";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for the Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

/// Default delay between zone sync passes, consumed by the external sync
/// collaborator (milliseconds)
pub const DEFAULT_SYNC_DELAY_MILLIS: u64 = 10_000;
