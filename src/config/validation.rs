//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Keep prefix matching unambiguous (unique prefixes, none a prefix of another)
//! - Validate value ranges (timeouts > 0, URLs absolute)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("domain table is empty")]
    EmptyDomainTable,

    #[error("mapping #{index} has an empty {field}")]
    EmptyField { index: usize, field: &'static str },

    #[error("decoy prefix '{0}' is configured more than once")]
    DuplicatePrefix(String),

    #[error("real domain '{0}' is configured more than once")]
    DuplicateDomain(String),

    #[error("decoy prefix '{shorter}' is a prefix of '{longer}'")]
    OverlappingPrefix { shorter: String, longer: String },

    #[error("shortcut prefix is empty")]
    EmptyShortcut,

    #[error("shortcut prefix '{0}' has no mapping")]
    UnmappedShortcut(String),

    #[error("real domain '{0}' does not form a valid https URL")]
    InvalidRealDomain(String),

    #[error("redirect target '{0}' is not an absolute URL")]
    InvalidRedirectTarget(String),

    #[error("redirect path '{0}' must start with '/'")]
    InvalidRedirectPath(String),

    #[error("invalid socket address for {field}: '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Validate the whole configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_domains(config, &mut errors);
    validate_redirect(config, &mut errors);

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::Zero("upstream.connect_timeout_secs"));
    }
    if config.upstream.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero("upstream.request_timeout_secs"));
    }
    if config.upstream.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("upstream.max_body_bytes"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_domains(config: &GatewayConfig, errors: &mut Vec<ValidationError>) {
    let mappings = &config.domains.mappings;
    if mappings.is_empty() {
        errors.push(ValidationError::EmptyDomainTable);
        return;
    }

    let mut prefixes = HashSet::new();
    let mut domains = HashSet::new();

    for (index, mapping) in mappings.iter().enumerate() {
        if mapping.real_domain.is_empty() {
            errors.push(ValidationError::EmptyField { index, field: "real_domain" });
        } else {
            if !domains.insert(mapping.real_domain.as_str()) {
                errors.push(ValidationError::DuplicateDomain(mapping.real_domain.clone()));
            }
            let parsed = Url::parse(&format!("https://{}/", mapping.real_domain));
            let clean = parsed
                .map(|u| u.path() == "/" && u.query().is_none() && u.username().is_empty())
                .unwrap_or(false);
            if !clean {
                errors.push(ValidationError::InvalidRealDomain(mapping.real_domain.clone()));
            }
        }

        if mapping.decoy_prefix.is_empty() {
            errors.push(ValidationError::EmptyField { index, field: "decoy_prefix" });
        } else if !prefixes.insert(mapping.decoy_prefix.as_str()) {
            errors.push(ValidationError::DuplicatePrefix(mapping.decoy_prefix.clone()));
        }
    }

    for a in mappings.iter().filter(|m| !m.decoy_prefix.is_empty()) {
        for b in mappings.iter() {
            if a.decoy_prefix != b.decoy_prefix && b.decoy_prefix.starts_with(&a.decoy_prefix) {
                errors.push(ValidationError::OverlappingPrefix {
                    shorter: a.decoy_prefix.clone(),
                    longer: b.decoy_prefix.clone(),
                });
            }
        }
    }

    let shortcut = &config.domains.shortcut_prefix;
    if shortcut.is_empty() {
        errors.push(ValidationError::EmptyShortcut);
    } else if !prefixes.contains(shortcut.as_str()) {
        errors.push(ValidationError::UnmappedShortcut(shortcut.clone()));
    }
}

fn validate_redirect(config: &GatewayConfig, errors: &mut Vec<ValidationError>) {
    let target_ok = Url::parse(&config.redirect.target)
        .map(|u| u.has_host())
        .unwrap_or(false);
    if !target_ok {
        errors.push(ValidationError::InvalidRedirectTarget(config.redirect.target.clone()));
    }

    for path in &config.redirect.paths {
        if !path.starts_with('/') {
            errors.push(ValidationError::InvalidRedirectPath(path.clone()));
        }
    }
}
