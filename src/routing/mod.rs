//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound effective host
//!     → resolver.rs (shortcut check, then ordered prefix scan)
//!     → domain_map.rs (decoy prefix → real domain)
//!     → Return: Resolution or None (404)
//!
//! Inbound path
//!     → path.rs (strip nested sub-URLs)
//!     → path sent upstream
//! ```
//!
//! # Design Decisions
//! - Table built at startup, immutable at runtime
//! - Deterministic: same host always resolves to the same prefix
//! - First match wins (table order, shortcut first)

pub mod domain_map;
pub mod path;
pub mod resolver;

pub use domain_map::{DomainMap, DomainMapping};
pub use path::PathNormalizer;
pub use resolver::{PrefixResolver, Resolution};
