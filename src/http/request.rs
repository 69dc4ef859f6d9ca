//! Inbound request inspection.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Derive the effective host (Host header, else URI authority)
//! - Decide whether the inbound request arrived over HTTPS
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Hosts are compared lower-cased; a port stays part of the host

use axum::http::{header, HeaderMap, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Generates a UUID v4 request ID for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request ID set by [`UuidRequestId`], or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Hostname the client addressed, lower-cased.
pub fn effective_host<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .or_else(|| request.uri().authority().map(|a| a.as_str()))
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Whether the request reached the gateway over HTTPS.
///
/// The URI scheme wins when present, then the first `X-Forwarded-Proto`
/// value, then the listener's own transport.
pub fn is_secure<B>(request: &Request<B>, listener_tls: bool) -> bool {
    if let Some(scheme) = request.uri().scheme_str() {
        return scheme.eq_ignore_ascii_case("https");
    }

    request
        .headers()
        .get(X_FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|proto| proto.trim().eq_ignore_ascii_case("https"))
        .unwrap_or(listener_tls)
}
