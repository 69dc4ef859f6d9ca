//! Static bidirectional domain table.
//!
//! # Responsibilities
//! - Hold the ordered {real domain ↔ decoy prefix} rows
//! - Answer reverse lookups (decoy prefix → real domain)
//!
//! # Design Decisions
//! - Built once from validated config, shared read-only via Arc
//! - Reverse index precomputed at construction; first row wins on ties

use std::collections::HashMap;

use crate::config::DomainsConfig;

/// One row of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainMapping {
    pub real_domain: String,
    pub decoy_prefix: String,
}

impl DomainMapping {
    pub fn new(real_domain: impl Into<String>, decoy_prefix: impl Into<String>) -> Self {
        Self {
            real_domain: real_domain.into(),
            decoy_prefix: decoy_prefix.into(),
        }
    }
}

/// Immutable domain table in insertion order.
#[derive(Debug, Clone)]
pub struct DomainMap {
    mappings: Vec<DomainMapping>,
    by_prefix: HashMap<String, usize>,
    shortcut: String,
}

impl DomainMap {
    /// Build a table from ordered rows and the shortcut prefix.
    pub fn new(mappings: Vec<DomainMapping>, shortcut: impl Into<String>) -> Self {
        let mut by_prefix = HashMap::with_capacity(mappings.len());
        for (index, mapping) in mappings.iter().enumerate() {
            by_prefix.entry(mapping.decoy_prefix.clone()).or_insert(index);
        }

        Self {
            mappings,
            by_prefix,
            shortcut: shortcut.into(),
        }
    }

    /// Build the table from the `[domains]` config section.
    pub fn from_config(config: &DomainsConfig) -> Self {
        let mappings = config
            .mappings
            .iter()
            .map(|m| DomainMapping::new(&m.real_domain, &m.decoy_prefix))
            .collect();
        Self::new(mappings, &config.shortcut_prefix)
    }

    /// Rows in insertion order.
    pub fn mappings(&self) -> &[DomainMapping] {
        &self.mappings
    }

    pub fn shortcut(&self) -> &str {
        &self.shortcut
    }

    /// Real domain configured for `decoy_prefix`.
    pub fn real_domain(&self, decoy_prefix: &str) -> Option<&str> {
        self.by_prefix
            .get(decoy_prefix)
            .map(|&index| self.mappings[index].real_domain.as_str())
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl Default for DomainMap {
    fn default() -> Self {
        Self::from_config(&DomainsConfig::default())
    }
}
