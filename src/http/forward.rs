//! Upstream forwarding.
//!
//! # Responsibilities
//! - Build the upstream URL (secure scheme, real domain, normalized path)
//! - Copy inbound headers, leaving Host to the client and swapping Referer
//! - Attach the body for methods that carry one
//! - Perform the call; failures become `GatewayError::Upstream`
//!
//! # Design Decisions
//! - No retries: a failed call surfaces immediately as 502
//! - Timeouts come from config and are enforced by the client

use std::time::Duration;

use axum::{
    body::Bytes,
    http::{request::Parts, HeaderMap, Method},
};
use url::Url;

use crate::config::UpstreamConfig;
use crate::error::GatewayError;
use crate::security::upstream_request_headers;

/// A fully prepared upstream request.
#[derive(Debug)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// Methods whose inbound body is forwarded.
pub fn carries_body(method: &Method) -> bool {
    method != Method::GET && method != Method::HEAD
}

/// Issues requests to real upstream domains.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    scheme: &'static str,
}

impl Forwarder {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            scheme: "https",
        })
    }

    /// Plain-HTTP forwarder for talking to in-process test upstreams.
    #[cfg(test)]
    pub(crate) fn plaintext(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            scheme: "http",
            ..Self::new(config)?
        })
    }

    /// Upstream URL for `path` (and optional query) on `real_domain`.
    pub fn upstream_url(
        &self,
        real_domain: &str,
        path: &str,
        query: Option<&str>,
    ) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!("{}://{}/", self.scheme, real_domain))?;
        url.set_path(path);
        url.set_query(query);
        Ok(url)
    }

    /// Prepare the upstream request for an inbound request's `parts`.
    pub fn build(
        &self,
        parts: &Parts,
        real_domain: &str,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<UpstreamRequest, GatewayError> {
        let url = self.upstream_url(real_domain, path, parts.uri.query())?;
        let headers = upstream_request_headers(&parts.headers, url.as_str())?;
        let body = body.filter(|_| carries_body(&parts.method));

        Ok(UpstreamRequest {
            method: parts.method.clone(),
            url,
            headers,
            body,
        })
    }

    /// Perform the call.
    pub async fn send(&self, request: UpstreamRequest) -> Result<reqwest::Response, GatewayError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        Ok(builder.send().await?)
    }
}
