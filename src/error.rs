//! Proxy error taxonomy and the JSON error envelope.
//!
//! Every failure the proxy can hit ends as a well-formed JSON response; no
//! variant is allowed to escape as a protocol-level fault.

use std::time::Duration;

use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Environment;

pub const MSG_METHOD_NOT_ALLOWED: &str = "Method not allowed";
pub const MSG_PAYLOAD_TOO_LARGE: &str = "Payload too large";
pub const MSG_BAD_BODY: &str = "Invalid request body";
pub const MSG_CONNECT_FAILED: &str = "Erro ao conectar com o servidor";
pub const MSG_TIMEOUT: &str = "Timeout ao conectar com o servidor";

/// Body returned for every error: `{ "message": ..., "error"?: ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
        }
    }
}

/// Errors produced while handling a proxied request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Inbound method is outside the allow-list.
    #[error("method {0} is not allowed")]
    MethodNotAllowed(Method),

    /// Inbound body exceeded the configured limit.
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// Inbound body could not be read (client aborted, bad framing).
    #[error("failed to read request body: {0}")]
    BodyRead(#[source] axum::Error),

    /// Backend did not answer within the deadline.
    #[error("backend did not respond within {}ms", .0.as_millis())]
    Timeout(Duration),

    /// TCP connection to the backend was not established in time.
    #[error("backend connection not established within {}ms", .0.as_millis())]
    ConnectTimeout(Duration),

    /// DNS, connect, or body read failure talking to the backend.
    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::BodyRead(_) => StatusCode::BAD_REQUEST,
            ProxyError::Timeout(_) | ProxyError::ConnectTimeout(_) | ProxyError::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::MethodNotAllowed(_) => "method_not_allowed",
            ProxyError::PayloadTooLarge { .. } => "payload_too_large",
            ProxyError::BodyRead(_) => "body_read",
            ProxyError::Timeout(_) => "timeout",
            ProxyError::ConnectTimeout(_) => "connect_timeout",
            ProxyError::Transport(_) => "transport",
        }
    }

    /// Build the envelope for this error. Underlying detail is only exposed
    /// outside production.
    pub fn envelope(&self, environment: Environment) -> ErrorEnvelope {
        let message = match self {
            ProxyError::MethodNotAllowed(_) => return ErrorEnvelope::new(MSG_METHOD_NOT_ALLOWED),
            ProxyError::PayloadTooLarge { .. } => return ErrorEnvelope::new(MSG_PAYLOAD_TOO_LARGE),
            ProxyError::BodyRead(_) => MSG_BAD_BODY,
            ProxyError::Timeout(_) | ProxyError::ConnectTimeout(_) => MSG_TIMEOUT,
            ProxyError::Transport(_) => MSG_CONNECT_FAILED,
        };

        ErrorEnvelope {
            message: message.to_string(),
            error: (!environment.is_production()).then(|| self.to_string()),
        }
    }

    pub fn into_response_for(self, environment: Environment) -> Response {
        (self.status(), Json(self.envelope(environment))).into_response()
    }
}

impl IntoResponse for ProxyError {
    /// Renders with production semantics (no detail).
    fn into_response(self) -> Response {
        self.into_response_for(Environment::Production)
    }
}
