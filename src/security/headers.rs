//! Header manipulation in both directions.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers
//! - Prepare inbound headers for the upstream (drop Host, swap Referer)
//! - Apply the response policy (CORS, cache, removed security headers)
//!
//! # Design Decisions
//! - Response policy applies regardless of content type
//! - `Accept-Encoding` is never forwarded; the client negotiates compression
//!   itself and hands back decoded bodies
//! - No `Host` is sent along; the client derives it from each URL it
//!   requests, so followed redirects reach other hosts under their own name

use axum::http::{
    header::{self, HeaderName, HeaderValue, InvalidHeaderValue},
    HeaderMap,
};

/// Connection-scoped headers that must not cross the proxy.
pub const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Upstream response headers dropped before the response reaches the client.
pub const STRIPPED_RESPONSE_HEADERS: [&str; 5] = [
    "content-security-policy",
    "content-security-policy-report-only",
    "clear-site-data",
    "content-encoding",
    "content-length",
];

/// Remove hop-by-hop headers, including any named in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Build the header set sent upstream from the inbound headers.
pub fn upstream_request_headers(
    inbound: &HeaderMap,
    referer: &str,
) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut headers = inbound.clone();
    strip_hop_by_hop(&mut headers);
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);
    headers.remove(header::ACCEPT_ENCODING);

    headers.insert(header::REFERER, HeaderValue::from_str(referer)?);
    Ok(headers)
}

/// Headers forced onto every proxied response.
#[derive(Debug, Clone)]
pub struct ResponsePolicy {
    cache_control: HeaderValue,
}

impl ResponsePolicy {
    pub fn new(cache_max_age_secs: u64) -> Self {
        let cache_control = HeaderValue::from_str(&format!("public, max-age={cache_max_age_secs}"))
            .unwrap_or_else(|_| HeaderValue::from_static("public, max-age=14400"));
        Self { cache_control }
    }

    /// Rewrite upstream response headers in place.
    pub fn apply(&self, headers: &mut HeaderMap) {
        strip_hop_by_hop(headers);
        for name in STRIPPED_RESPONSE_HEADERS {
            headers.remove(name);
        }

        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
        headers.insert(header::CACHE_CONTROL, self.cache_control.clone());
    }
}

impl Default for ResponsePolicy {
    fn default() -> Self {
        Self::new(14_400)
    }
}
