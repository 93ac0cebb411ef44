// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # Batchy - Batch DNS Record-Change Intake Service
//!
//! Batchy accepts bundled DNS record mutations spanning many zones,
//! validates the batch as a whole, and hands accepted batches to a
//! downstream processor for asynchronous application against DNS
//! authoritative servers.
//!
//! ## Overview
//!
//! A submitted batch flows through a fixed pipeline:
//!
//! 1. Per-change input validation — syntactic checks with accumulated,
//!    position-aligned errors
//! 2. Zone discovery — each change is mapped to its authoritative zone,
//!    including IPv4 classless (RFC 2317) and IPv6 reverse-zone resolution
//! 3. Contextual validation — checks against the current record inventory
//!    and zone access rules
//! 4. Assembly and conversion — an all-valid batch is persisted and
//!    enqueued; anything less is rejected whole with per-position errors
//!
//! ## Modules
//!
//! - [`batch`] - The intake pipeline and public service operations
//! - [`dns`] - Forward and reverse DNS name utilities
//! - [`repository`] - Persistence contracts and in-memory implementations
//! - [`converter`] - Handoff of accepted batches to the processor
//! - [`api`] - HTTP surface
//!
//! ## Example
//!
//! ```rust,no_run
//! use batchy::types::{BatchChangeInput, ChangeInput, ChangeType, RecordDataInput, RecordType};
//!
//! let input = BatchChangeInput {
//!     comments: Some("rotate web frontends".to_string()),
//!     changes: vec![ChangeInput {
//!         change_type: ChangeType::Add,
//!         input_name: "web.example.com.".to_string(),
//!         record_type: RecordType::A,
//!         ttl: Some(300),
//!         record: RecordDataInput {
//!             address: Some("10.0.0.1".to_string()),
//!             ..RecordDataInput::default()
//!         },
//!     }],
//! };
//! ```
//!
//! ## Guarantees
//!
//! - **Atomic acceptance** - a batch is persisted only when every change is
//!   valid; a rejected batch has no persistent side effects
//! - **Order preservation** - stored changes keep their submitted positions
//! - **Accumulating errors** - every invalid position reports everything
//!   wrong with it, not just the first failure

pub mod api;
pub mod batch;
pub mod config;
pub mod constants;
pub mod converter;
pub mod dns;
pub mod errors;
pub mod metrics;
pub mod repository;
pub mod types;
