// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for configuration loading and compiled rules.

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.batch_change_limit, 1000);
        assert_eq!(config.min_ttl, 30);
        assert_eq!(config.max_ttl, 86400);
        assert_eq!(config.max_list_items, 100);
        assert!(config.approved_name_servers.is_empty());
        assert!(config.high_value_domains.is_empty());
        assert_eq!(config.api.port, 9090);
    }

    #[test]
    fn test_load_from_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "batch-change-limit: 20\n\
             min-ttl: 60\n\
             approved-name-servers:\n  - ns1\\.example\\.com\\.\n\
             high-value-domains:\n  - high-value\\..*\n\
             api:\n  port: 8081"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.batch_change_limit, 20);
        assert_eq!(config.min_ttl, 60);
        // Unspecified keys keep their defaults
        assert_eq!(config.max_ttl, 86400);
        assert_eq!(config.api.port, 8081);
        assert_eq!(config.approved_name_servers.len(), 1);
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(Config::load(std::path::Path::new("/nonexistent/batchy.yaml")).is_err());
    }

    #[test]
    fn test_high_value_rules_match_normalized_names() {
        let config = Config {
            high_value_domains: vec!["high-value\\..*".to_string()],
            ..Config::default()
        };
        let rules = config.rules().unwrap();

        assert!(rules.is_high_value("high-value.example.com."));
        // Normalization adds the trailing dot and lowercases
        assert!(rules.is_high_value("HIGH-VALUE.example.com"));
        assert!(!rules.is_high_value("ordinary.example.com."));
    }

    #[test]
    fn test_high_value_rules_match_ip_literals() {
        let config = Config {
            high_value_domains: vec!["192\\.0\\.2\\.252".to_string()],
            ..Config::default()
        };
        let rules = config.rules().unwrap();

        assert!(rules.is_high_value("192.0.2.252"));
        assert!(!rules.is_high_value("192.0.2.1"));
    }

    #[test]
    fn test_approved_name_servers_empty_list_approves_all() {
        let rules = Config::default().rules().unwrap();
        assert!(rules.is_approved_name_server("anything.example.com."));
    }

    #[test]
    fn test_approved_name_servers_restricts_when_configured() {
        let config = Config {
            approved_name_servers: vec!["ns[0-9]\\.example\\.com\\.".to_string()],
            ..Config::default()
        };
        let rules = config.rules().unwrap();

        assert!(rules.is_approved_name_server("ns1.example.com."));
        assert!(rules.is_approved_name_server("ns1.example.com"));
        assert!(!rules.is_approved_name_server("rogue.example.com."));
    }

    #[test]
    fn test_invalid_regex_is_an_error() {
        let config = Config {
            high_value_domains: vec!["(unclosed".to_string()],
            ..Config::default()
        };
        assert!(config.rules().is_err());
    }
}
