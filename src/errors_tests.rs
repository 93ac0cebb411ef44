// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for error display and conversions.

#[cfg(test)]
mod tests {
    use crate::errors::{BatchChangeError, ChangeError, ConversionError, RepositoryError};

    #[test]
    fn test_change_error_messages_name_the_subject() {
        let cases = vec![
            (
                ChangeError::InvalidDomainName {
                    name: "bad..name".to_string(),
                },
                "bad..name",
            ),
            (
                ChangeError::InvalidIpAddress {
                    address: "999.0.0.1".to_string(),
                },
                "999.0.0.1",
            ),
            (
                ChangeError::ZoneDiscovery {
                    name: "orphan.example.com.".to_string(),
                },
                "orphan.example.com.",
            ),
            (
                ChangeError::RecordAlreadyExists {
                    name: "dup.example.com.".to_string(),
                },
                "dup.example.com.",
            ),
            (
                ChangeError::RecordDoesNotExist {
                    name: "missing.example.com.".to_string(),
                },
                "missing.example.com.",
            ),
            (
                ChangeError::NotApprovedNameServer {
                    ns: "rogue.ns.example.".to_string(),
                },
                "rogue.ns.example.",
            ),
        ];
        for (error, subject) in cases {
            assert!(
                error.to_string().contains(subject),
                "{error} should mention {subject}"
            );
        }
    }

    #[test]
    fn test_invalid_ttl_message_includes_bounds() {
        let error = ChangeError::InvalidTtl {
            ttl: 5,
            min: 30,
            max: 86400,
        };
        let message = error.to_string();
        assert!(message.contains('5'));
        assert!(message.contains("30"));
        assert!(message.contains("86400"));
    }

    #[test]
    fn test_repository_error_converts_to_batch_error() {
        let error: BatchChangeError =
            RepositoryError::Unavailable("connection refused".to_string()).into();
        assert!(matches!(error, BatchChangeError::Repository(_)));
        assert!(error.to_string().contains("connection refused"));
    }

    #[test]
    fn test_conversion_error_wraps_storage_failure() {
        let error: ConversionError =
            RepositoryError::Backend("write failed".to_string()).into();
        assert!(error.to_string().contains("write failed"));

        let batch_error: BatchChangeError = error.into();
        assert!(matches!(batch_error, BatchChangeError::Conversion(_)));
    }

    #[test]
    fn test_batch_size_errors() {
        assert!(BatchChangeError::BatchChangeIsEmpty
            .to_string()
            .contains("at least one"));
        assert!(BatchChangeError::BatchChangeIsTooLarge { limit: 1000 }
            .to_string()
            .contains("1000"));
    }
}
