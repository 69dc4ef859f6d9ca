//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request:
//!     → headers.rs (strip hop-by-hop, set Host/Referer for upstream)
//!     → forwarded
//!
//! Upstream response:
//!     → headers.rs (drop CSP / clear-site-data / stale length+encoding,
//!                   add CORS and cache directives)
//!     → returned to client
//! ```
//!
//! # Design Decisions
//! - Security policy headers are removed: they would block the rewritten
//!   cross-domain content
//! - No trust in client-supplied hop-by-hop headers

pub mod headers;

pub use headers::{strip_hop_by_hop, upstream_request_headers, ResponsePolicy};
