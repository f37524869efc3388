//! HTTP server setup and the proxy handler.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy and liveness handlers
//! - Wire up middleware (request ID, tracing)
//! - Translate inbound requests into a single outbound call
//! - Turn every outcome into a JSON response
//! - Bind server to listener and drain on shutdown

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use http_body_util::LengthLimitError;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{Environment, ProxyConfig};
use crate::error::ProxyError;
use crate::http::forward::{BackendReply, ForwardRequest, Forwarder};
use crate::http::health::get_status;
use crate::http::request::{self, forwarded_headers, is_allowed, InboundBody};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::routing::{wildcard_segments, BackendTarget};
use crate::security::role_from_authorization;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub target: BackendTarget,
    pub forwarder: Forwarder,
    pub mount_path: Arc<str>,
    pub environment: Environment,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn from_config(config: &ProxyConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            target: BackendTarget::new(&config.backend.base_url),
            forwarder: Forwarder::new(&config.timeouts)?,
            mount_path: Arc::from(config.listener.mount_path.as_str()),
            environment: config.environment,
            max_body_bytes: config.limits.max_body_bytes,
        })
    }
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let state = AppState::from_config(&config)?;
        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let mount = config.listener.mount_path.as_str();

        Router::new()
            .route("/healthz", get(get_status))
            .route(mount, any(proxy_handler))
            .route(&format!("{mount}/"), any(proxy_handler))
            .route(&format!("{mount}/{{*path}}"), any(proxy_handler))
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(
                TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %req.method(),
                        uri = %req.uri(),
                        request_id = %request::request_id(req.headers()),
                    )
                }),
            )
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for embedding or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mount_path = %self.config.listener.mount_path,
            backend = %self.config.backend.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler. Every outcome, including failures, is JSON.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();

    match proxy(&state, request).await {
        Ok(reply) => {
            metrics::record_request(&method, reply.status.as_u16(), start);
            (reply.status, Json(reply.body)).into_response()
        }
        Err(e) => {
            match &e {
                ProxyError::Timeout(_) | ProxyError::ConnectTimeout(_) | ProxyError::Transport(_) => {
                    tracing::error!(error = %e, method = %method, "Proxy error");
                }
                _ => tracing::warn!(error = %e, method = %method, "Rejected request"),
            }
            metrics::record_error(e.kind());
            metrics::record_request(&method, e.status().as_u16(), start);
            e.into_response_for(state.environment)
        }
    }
}

async fn proxy(state: &AppState, request: Request<Body>) -> Result<BackendReply, ProxyError> {
    let method = request.method().clone();
    if !is_allowed(&method) {
        return Err(ProxyError::MethodNotAllowed(method));
    }

    let (parts, body) = request.into_parts();
    let url = state.target.url_for(
        &wildcard_segments(parts.uri.path(), &state.mount_path),
        parts.uri.query(),
    );

    if let Some(role) = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(role_from_authorization)
    {
        tracing::debug!(role = %role, "Caller role from bearer token");
    }

    let bytes = axum::body::to_bytes(body, state.max_body_bytes)
        .await
        .map_err(|e| body_error(e, state.max_body_bytes))?;

    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let body = InboundBody::classify(&method, content_type, bytes).into_payload();
    let headers = forwarded_headers(&method, &parts.headers);

    tracing::debug!(
        method = %method,
        url = %url,
        body_bytes = body.as_ref().map_or(0, |b| b.len()),
        "Forwarding request"
    );

    state
        .forwarder
        .forward(ForwardRequest {
            method,
            url,
            headers,
            body,
        })
        .await
}

fn body_error(e: axum::Error, limit: usize) -> ProxyError {
    let too_large = std::error::Error::source(&e)
        .is_some_and(|source| source.is::<LengthLimitError>());

    if too_large {
        ProxyError::PayloadTooLarge { limit }
    } else {
        ProxyError::BodyRead(e)
    }
}
