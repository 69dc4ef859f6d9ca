//! Final response assembly.
//!
//! # Responsibilities
//! - Apply the response header policy to upstream headers
//! - Rewrite text bodies; stream everything else through untouched
//! - Build redirect responses
//!
//! # Design Decisions
//! - Text bodies are buffered whole (the rewriter needs full context) and
//!   decoded as UTF-8 regardless of the declared charset
//! - Binary bodies are never buffered or re-encoded
//! - Upstream status is preserved

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::GatewayError;
use crate::http::rewrite::{is_rewritable, ResponseRewriter};
use crate::observability::metrics;
use crate::security::ResponsePolicy;

/// Request-scoped inputs to the rewriter.
#[derive(Debug, Clone, Copy)]
pub struct RewriteContext<'a> {
    pub decoy_prefix: &'a str,
    pub effective_host: &'a str,
}

/// Turn an upstream response into the response returned to the client.
pub async fn finalize(
    upstream: reqwest::Response,
    rewriter: &ResponseRewriter,
    policy: &ResponsePolicy,
    ctx: RewriteContext<'_>,
) -> Result<Response, GatewayError> {
    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    let rewritable = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(is_rewritable)
        .unwrap_or(false);
    policy.apply(&mut headers);

    let body = if rewritable {
        let bytes = upstream.bytes().await?;
        let text = String::from_utf8_lossy(&bytes);
        let rewritten = rewriter.rewrite_text(&text, ctx.decoy_prefix, ctx.effective_host);
        metrics::record_rewrite(true);
        Body::from(rewritten)
    } else {
        metrics::record_rewrite(false);
        Body::from_stream(upstream.bytes_stream())
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

/// Redirect to `location` with `status`.
pub fn redirect(status: StatusCode, location: &str) -> Response {
    match HeaderValue::try_from(location) {
        Ok(location) => (status, [(header::LOCATION, location)]).into_response(),
        Err(_) => (StatusCode::BAD_REQUEST, "Invalid redirect location").into_response(),
    }
}
