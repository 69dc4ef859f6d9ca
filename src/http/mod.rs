//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, fixed redirects, HTTPS enforcement)
//!     → request.rs (request ID, effective host, inbound scheme)
//!     → [routing resolves decoy prefix and real domain, cleans path]
//!     → forward.rs (upstream request, Host/Referer swap, call)
//!     → response.rs + rewrite.rs (header policy, body rewrite)
//!     → Send to client
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod rewrite;
pub mod server;

pub use forward::Forwarder;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use rewrite::ResponseRewriter;
pub use server::{AppState, HttpServer};
