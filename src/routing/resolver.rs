//! Decoy prefix resolution.
//!
//! # Responsibilities
//! - Find which decoy prefix an inbound hostname starts with
//! - Map that prefix back to the real upstream domain
//!
//! # Design Decisions
//! - The shortcut prefix is checked before the table scan
//! - Table scan is in insertion order; first match wins
//! - No match is an explicit `None`, turned into a 404 by the caller

use std::sync::Arc;

use crate::routing::domain_map::DomainMap;

/// Outcome of resolving an inbound hostname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub decoy_prefix: String,
    pub real_domain: String,
}

/// Resolves decoy hostnames against a shared [`DomainMap`].
#[derive(Debug, Clone)]
pub struct PrefixResolver {
    map: Arc<DomainMap>,
}

impl PrefixResolver {
    pub fn new(map: Arc<DomainMap>) -> Self {
        Self { map }
    }

    pub fn map(&self) -> &Arc<DomainMap> {
        &self.map
    }

    /// Decoy prefix that `hostname` starts with, if any.
    pub fn resolve_prefix(&self, hostname: &str) -> Option<&str> {
        let shortcut = self.map.shortcut();
        if !shortcut.is_empty() && hostname.starts_with(shortcut) {
            return Some(shortcut);
        }

        self.map
            .mappings()
            .iter()
            .map(|m| m.decoy_prefix.as_str())
            .find(|prefix| hostname.starts_with(prefix))
    }

    /// Real domain configured for `decoy_prefix`, if any.
    pub fn resolve_real_domain(&self, decoy_prefix: &str) -> Option<&str> {
        self.map.real_domain(decoy_prefix)
    }

    /// Resolve both halves for an inbound hostname.
    pub fn resolve(&self, hostname: &str) -> Option<Resolution> {
        let decoy_prefix = self.resolve_prefix(hostname)?;
        let real_domain = self.resolve_real_domain(decoy_prefix)?;
        Some(Resolution {
            decoy_prefix: decoy_prefix.to_string(),
            real_domain: real_domain.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::domain_map::DomainMapping;

    fn default_resolver() -> PrefixResolver {
        PrefixResolver::new(Arc::new(DomainMap::default()))
    }

    #[test]
    fn test_every_mapping_round_trips() {
        let resolver = default_resolver();
        for mapping in resolver.map().mappings() {
            for suffix in ["example.com", "mirror.example.org:8443", ""] {
                let host = format!("{}{}", mapping.decoy_prefix, suffix);
                assert_eq!(
                    resolver.resolve_prefix(&host),
                    Some(mapping.decoy_prefix.as_str()),
                    "host {host}"
                );
            }
            assert_eq!(
                resolver.resolve_real_domain(&mapping.decoy_prefix),
                Some(mapping.real_domain.as_str())
            );
        }
    }

    #[test]
    fn test_shortcut_host() {
        let resolution = default_resolver().resolve("gh.example.com").unwrap();
        assert_eq!(resolution.decoy_prefix, "gh.");
        assert_eq!(resolution.real_domain, "github.com");
    }

    #[test]
    fn test_shortcut_checked_before_table() {
        // The table lists a broader prefix first; the shortcut still wins.
        let map = DomainMap::new(
            vec![
                DomainMapping::new("gitlab.com", "g"),
                DomainMapping::new("github.com", "gh."),
            ],
            "gh.",
        );
        let resolver = PrefixResolver::new(Arc::new(map));
        assert_eq!(resolver.resolve_prefix("gh.example.com"), Some("gh."));
        assert_eq!(resolver.resolve_prefix("gl.example.com"), Some("g"));
    }

    #[test]
    fn test_unmapped_host() {
        let resolver = default_resolver();
        assert_eq!(resolver.resolve_prefix("www.example.com"), None);
        assert_eq!(resolver.resolve("www.example.com"), None);
        assert_eq!(resolver.resolve(""), None);
    }

    #[test]
    fn test_shortcut_without_row_does_not_resolve() {
        let map = DomainMap::new(vec![DomainMapping::new("api.github.com", "api.")], "gh.");
        let resolver = PrefixResolver::new(Arc::new(map));
        assert_eq!(resolver.resolve_prefix("gh.example.com"), Some("gh."));
        assert_eq!(resolver.resolve("gh.example.com"), None);
    }
}
