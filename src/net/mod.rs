//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → plain listener (TLS terminated upstream of the gateway), or
//!     → tls.rs (rustls handshake via axum-server)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - TLS is optional; when enabled, inbound requests count as secure

pub mod tls;

pub use tls::load_tls_config;
