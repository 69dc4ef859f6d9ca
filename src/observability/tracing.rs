//! Request spans.
//!
//! Every inbound request gets one span carrying its correlation ID, so all
//! events emitted while resolving, forwarding and rewriting can be grouped.

use axum::http::Request;
use tracing::Span;

use crate::http::request::{effective_host, request_id};

/// Span factory for `TraceLayer::make_span_with`.
pub fn make_request_span<B>(request: &Request<B>) -> Span {
    tracing::info_span!(
        "request",
        request_id = %request_id(request.headers()),
        method = %request.method(),
        host = %effective_host(request),
        path = %request.uri().path(),
    )
}
