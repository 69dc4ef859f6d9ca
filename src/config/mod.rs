//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → domain table / rewriter / client built once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults matching the compiled-in deployment
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    DomainMappingConfig, DomainsConfig, GatewayConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, RedirectConfig, ResponseConfig, TlsConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
