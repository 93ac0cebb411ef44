// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Service configuration.
//!
//! Configuration is a YAML file (kebab-case keys) with defaults for every
//! option, so an empty file — or no file — yields a working service. The
//! regex-valued options (`high-value-domains`, `approved-name-servers`) are
//! compiled once into a [`RuleSet`] at service construction.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_API_BIND_ADDRESS, DEFAULT_API_PORT, DEFAULT_BATCH_CHANGE_LIMIT,
    DEFAULT_MAX_LIST_ITEMS, DEFAULT_MAX_TTL_SECS, DEFAULT_MIN_TTL_SECS,
    DEFAULT_SYNC_DELAY_MILLIS,
};
use crate::dns::normalize_fqdn;

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ApiConfig {
    /// Address the API server binds
    pub bind_address: String,
    /// Port the API server listens on
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            bind_address: DEFAULT_API_BIND_ADDRESS.to_string(),
            port: DEFAULT_API_PORT,
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Maximum number of changes accepted in one batch
    pub batch_change_limit: usize,

    /// Lower TTL bound for submitted records (seconds)
    pub min_ttl: u32,

    /// Upper TTL bound for submitted records (seconds)
    pub max_ttl: u32,

    /// Allow-list for NS record targets; each entry is an anchored regex.
    /// An empty list disables the restriction.
    pub approved_name_servers: Vec<String>,

    /// Names whose mutation via batch change is forbidden; anchored regexes
    pub high_value_domains: Vec<String>,

    /// Delay between zone sync passes (milliseconds); consumed by the
    /// external zone-sync collaborator
    pub sync_delay: u64,

    /// Ceiling for `maxItems` on batch change listings
    pub max_list_items: usize,

    /// Optional YAML file of zones and record sets loaded into the
    /// in-memory stores at startup
    pub seed_file: Option<PathBuf>,

    /// API server settings
    pub api: ApiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            batch_change_limit: DEFAULT_BATCH_CHANGE_LIMIT,
            min_ttl: DEFAULT_MIN_TTL_SECS,
            max_ttl: DEFAULT_MAX_TTL_SECS,
            approved_name_servers: Vec::new(),
            high_value_domains: Vec::new(),
            sync_delay: DEFAULT_SYNC_DELAY_MILLIS,
            max_list_items: DEFAULT_MAX_LIST_ITEMS,
            seed_file: None,
            api: ApiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&raw)?;
        Ok(config)
    }

    /// Compile the regex-valued options into a [`RuleSet`].
    ///
    /// # Errors
    ///
    /// Returns the first pattern that fails to compile.
    pub fn rules(&self) -> Result<RuleSet, regex::Error> {
        let high_value = self
            .high_value_domains
            .iter()
            .map(|pattern| Regex::new(&format!("^(?:{pattern})$")))
            .collect::<Result<Vec<_>, _>>()?;
        let approved_name_servers = self
            .approved_name_servers
            .iter()
            .map(|pattern| Regex::new(&format!("^(?:{pattern})$")))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RuleSet {
            high_value,
            approved_name_servers,
        })
    }
}

/// Compiled name-matching rules derived from [`Config`].
#[derive(Debug, Default)]
pub struct RuleSet {
    high_value: Vec<Regex>,
    approved_name_servers: Vec<Regex>,
}

impl RuleSet {
    /// Whether `name` is protected from batch mutation.
    ///
    /// Forward names are matched in normalized form; PTR changes pass the IP
    /// literal through unchanged.
    #[must_use]
    pub fn is_high_value(&self, name: &str) -> bool {
        let trimmed = name.trim().to_lowercase();
        let normalized = normalize_fqdn(name);
        self.high_value
            .iter()
            .any(|regex| regex.is_match(&trimmed) || regex.is_match(&normalized))
    }

    /// Whether `ns` is an approved name server target.
    ///
    /// An empty allow-list approves everything.
    #[must_use]
    pub fn is_approved_name_server(&self, ns: &str) -> bool {
        if self.approved_name_servers.is_empty() {
            return true;
        }
        let normalized = normalize_fqdn(ns);
        self.approved_name_servers
            .iter()
            .any(|regex| regex.is_match(&normalized))
    }
}
