// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for batch change intake.
//!
//! Two layers are kept distinct:
//! - [`ChangeError`] — domain failures attached to a single input position,
//!   accumulated across the batch without short-circuiting.
//! - [`BatchChangeError`] — batch-level failures (size gate, lookup, view
//!   authorization) and terminal transport/conversion failures that abort
//!   the whole request.
//!
//! Repository transport failures ([`RepositoryError`]) are deliberately not
//! part of the domain taxonomy; they surface through
//! [`BatchChangeError::Repository`].

use thiserror::Error;

use crate::types::InvalidBatchChangeResponses;

/// A typed failure attached to one input position.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChangeError {
    /// A required or malformed input field
    #[error("invalid value for \"{field}\": {reason}")]
    InvalidInputField {
        /// The offending field
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// TTL outside the configured bounds
    #[error("invalid TTL {ttl}: must be between {min} and {max} seconds")]
    InvalidTtl {
        /// Submitted TTL
        ttl: u32,
        /// Configured lower bound
        min: u32,
        /// Configured upper bound
        max: u32,
    },

    /// Name is not a well-formed domain name
    #[error("invalid domain name \"{name}\"")]
    InvalidDomainName {
        /// The offending name
        name: String,
    },

    /// Address is not a valid IP literal
    #[error("invalid IP address \"{address}\"")]
    InvalidIpAddress {
        /// The offending address
        address: String,
    },

    /// No authoritative zone found for the name
    #[error("no authoritative zone found for \"{name}\"")]
    ZoneDiscovery {
        /// The name that could not be resolved to a zone
        name: String,
    },

    /// A conflicting record set already exists
    #[error("record set \"{name}\" already exists")]
    RecordAlreadyExists {
        /// The conflicting name
        name: String,
    },

    /// Delete target does not exist
    #[error("record set \"{name}\" does not exist")]
    RecordDoesNotExist {
        /// The missing name
        name: String,
    },

    /// CNAME must be the only record at its name
    #[error("CNAME conflict: another record set exists at \"{name}\"")]
    CnameIsNotUnique {
        /// The contested name
        name: String,
    },

    /// Principal lacks write access to the zone
    #[error("user \"{user_name}\" is not authorized to modify zone \"{zone_name}\"")]
    UserIsNotAuthorized {
        /// The requesting user
        user_name: String,
        /// The protected zone
        zone_name: String,
    },

    /// NS target is not on the approved list
    #[error("name server \"{ns}\" is not an approved name server")]
    NotApprovedNameServer {
        /// The rejected name server
        ns: String,
    },

    /// Name is protected from batch mutation
    #[error("\"{name}\" is a high-value domain and cannot be modified in a batch change")]
    HighValueDomain {
        /// The protected name
        name: String,
    },

    /// Two adds in the batch target the same name and type
    #[error("record name \"{name}\" is not unique in the batch")]
    RecordNameNotUniqueInBatch {
        /// The duplicated name
        name: String,
    },
}

/// Transport-level repository failure, distinct from the domain taxonomy.
#[derive(Error, Debug, Clone)]
pub enum RepositoryError {
    /// The backing store could not be reached
    #[error("repository unavailable: {0}")]
    Unavailable(String),

    /// The backing store rejected or failed the operation
    #[error("repository operation failed: {0}")]
    Backend(String),
}

/// Failure handing an accepted batch to the downstream converter.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// Persisting the batch failed
    #[error("failed to store batch change: {0}")]
    Storage(#[from] RepositoryError),

    /// The processing queue is gone
    #[error("change processing queue is closed")]
    QueueClosed,
}

/// Batch-level failure of an intake or read operation.
#[derive(Error, Debug)]
pub enum BatchChangeError {
    /// The batch contained no changes
    #[error("batch change must contain at least one change")]
    BatchChangeIsEmpty,

    /// The batch exceeded the configured limit
    #[error("batch change exceeds the limit of {limit} changes")]
    BatchChangeIsTooLarge {
        /// Configured maximum batch size
        limit: usize,
    },

    /// No batch with the requested id
    #[error("batch change {id} not found")]
    BatchChangeNotFound {
        /// The requested id
        id: String,
    },

    /// The requester may not view the batch
    #[error("user \"{user_name}\" is not authorized to view batch change {id}")]
    UserNotAuthorizedToView {
        /// The requesting user
        user_name: String,
        /// The protected batch id
        id: String,
    },

    /// One or more positions failed validation; the submission is echoed in
    /// its original shape with accumulated errors, in position order
    #[error("batch change failed validation")]
    InvalidBatchChangeResponses {
        /// The echoed submission with per-position errors
        responses: InvalidBatchChangeResponses,
    },

    /// A repository call failed
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The downstream converter failed
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
