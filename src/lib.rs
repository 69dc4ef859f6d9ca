//! Decoy-domain rewriting gateway.
//!
//! Requests addressed to decoy hostnames are mapped to real upstream domains,
//! forwarded, and the textual responses are rewritten so every link keeps
//! pointing at decoy hostnames.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::GatewayConfig;
pub use error::{GatewayError, StartupError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
