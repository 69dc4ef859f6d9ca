//! HTTP server setup and the gateway request pipeline.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all gateway handler
//! - Wire up middleware (tracing, request ID, body limit)
//! - Answer fixed redirects and enforce HTTPS
//! - Resolve decoy host → real domain, clean the path, forward upstream
//! - Rewrite the upstream response for the client
//! - Serve over a plain listener or terminate TLS

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{GatewayConfig, RedirectConfig};
use crate::error::{GatewayError, StartupError};
use crate::http::forward::{carries_body, Forwarder};
use crate::http::request::{effective_host, is_secure, request_id, UuidRequestId};
use crate::http::response::{finalize, redirect, RewriteContext};
use crate::http::rewrite::ResponseRewriter;
use crate::lifecycle::shutdown::wait_for;
use crate::observability::{metrics, tracing::make_request_span};
use crate::routing::{DomainMap, PathNormalizer, PrefixResolver, Resolution};
use crate::security::ResponsePolicy;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: PrefixResolver,
    pub normalizer: Arc<PathNormalizer>,
    pub forwarder: Forwarder,
    pub rewriter: Arc<ResponseRewriter>,
    pub policy: ResponsePolicy,
    pub redirect: Arc<RedirectConfig>,
    pub listener_tls: bool,
    pub max_body_bytes: usize,
}

impl AppState {
    /// Build every per-process component from validated configuration.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, StartupError> {
        let forwarder = Forwarder::new(&config.upstream)?;
        Self::with_forwarder(config, forwarder)
    }

    pub(crate) fn with_forwarder(
        config: &GatewayConfig,
        forwarder: Forwarder,
    ) -> Result<Self, StartupError> {
        let map = Arc::new(DomainMap::from_config(&config.domains));
        let rewriter = Arc::new(ResponseRewriter::new(&map)?);

        Ok(Self {
            resolver: PrefixResolver::new(map),
            normalizer: Arc::new(PathNormalizer::new()?),
            forwarder,
            rewriter,
            policy: ResponsePolicy::new(config.response.cache_max_age_secs),
            redirect: Arc::new(config.redirect.clone()),
            listener_tls: config.listener.tls.is_some(),
            max_body_bytes: config.upstream.max_body_bytes,
        })
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, StartupError> {
        let state = AppState::from_config(&config)?;
        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.upstream.max_body_bytes))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// Run the server on a plain TCP listener until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, tls = false, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(wait_for(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server terminating TLS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, tls = true, "HTTP server starting");

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            wait_for(shutdown).await;
            drain.graceful_shutdown(Some(Duration::from_secs(10)));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Gateway handler: redirects, resolution, forwarding, rewriting.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let request_id = request_id(request.headers()).to_string();
    let host = effective_host(&request);
    let path = request.uri().path().to_string();

    // 1. Fixed redirects, regardless of host
    if state.redirect.paths.iter().any(|p| *p == path) {
        tracing::debug!(path = %path, target = %state.redirect.target, "Fixed redirect");
        metrics::record_request(method.as_str(), 302, "redirect", start_time);
        return redirect(StatusCode::FOUND, &state.redirect.target);
    }

    // 2. Insecure scheme
    if state.redirect.enforce_https && !host.is_empty() && !is_secure(&request, state.listener_tls)
    {
        let path_and_query = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let location = format!("https://{host}{path_and_query}");
        tracing::debug!(location = %location, "Redirecting to HTTPS");
        metrics::record_request(method.as_str(), 301, "redirect", start_time);
        return redirect(StatusCode::MOVED_PERMANENTLY, &location);
    }

    // 3. Resolve decoy prefix and real domain
    let Some(resolution) = state.resolver.resolve(&host) else {
        tracing::warn!(request_id = %request_id, host = %host, "Domain not configured for proxy");
        metrics::record_request(method.as_str(), 404, "none", start_time);
        return GatewayError::DomainNotConfigured.into_response();
    };

    // 4. Forward and rewrite
    let response = match proxy(&state, request, &host, &resolution, &request_id).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                upstream = %resolution.real_domain,
                error = %e,
                "Proxy request failed"
            );
            e.into_response()
        }
    };

    metrics::record_request(
        method.as_str(),
        response.status().as_u16(),
        &resolution.real_domain,
        start_time,
    );
    response
}

async fn proxy(
    state: &AppState,
    request: Request<Body>,
    host: &str,
    resolution: &Resolution,
    request_id: &str,
) -> Result<Response, GatewayError> {
    let (parts, body) = request.into_parts();
    let path = state.normalizer.normalize(parts.uri.path());

    let body = if carries_body(&parts.method) {
        let bytes = axum::body::to_bytes(body, state.max_body_bytes)
            .await
            .map_err(|_| GatewayError::BodyTooLarge)?;
        Some(bytes)
    } else {
        None
    };

    let upstream_request = state
        .forwarder
        .build(&parts, &resolution.real_domain, &path, body)?;

    tracing::debug!(
        request_id = %request_id,
        decoy_prefix = %resolution.decoy_prefix,
        url = %upstream_request.url,
        "Forwarding upstream"
    );

    let upstream = state.forwarder.send(upstream_request).await?;

    tracing::debug!(
        request_id = %request_id,
        status = %upstream.status(),
        "Upstream responded"
    );

    let ctx = RewriteContext {
        decoy_prefix: &resolution.decoy_prefix,
        effective_host: host,
    };
    finalize(upstream, &state.rewriter, &state.policy, ctx).await
}
