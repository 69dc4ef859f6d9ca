//! Gateway error types.
//!
//! Every request-time failure is a [`GatewayError`] that renders itself as a
//! plain-text response, so nothing escapes the handler as a fault.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Request-time failures, each mapped to a client-facing status.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Inbound host has no decoy prefix, or the prefix has no real domain.
    #[error("Domain not configured for proxy")]
    DomainNotConfigured,

    /// Inbound body exceeded the configured limit.
    #[error("Request body too large")]
    BodyTooLarge,

    /// The upstream URL could not be formed.
    #[error("Proxy Error: {0}")]
    InvalidUpstreamUrl(#[from] url::ParseError),

    /// A forwarded header value could not be formed.
    #[error("Proxy Error: {0}")]
    InvalidUpstreamHeader(#[from] axum::http::header::InvalidHeaderValue),

    /// DNS, TLS, connect, timeout or body-read failure talking upstream.
    #[error("Proxy Error: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::DomainNotConfigured => StatusCode::NOT_FOUND,
            GatewayError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::InvalidUpstreamUrl(_)
            | GatewayError::InvalidUpstreamHeader(_)
            | GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

/// Failures while assembling the gateway before it serves traffic.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to compile rewrite pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_domain_not_configured_is_404_plain_text() {
        let response = GatewayError::DomainNotConfigured.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Domain not configured for proxy");
    }

    #[tokio::test]
    async fn test_bad_url_is_502_proxy_error() {
        let err = url::Url::parse("https://exa mple.com").unwrap_err();
        let response = GatewayError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.starts_with(b"Proxy Error: "));
    }
}
