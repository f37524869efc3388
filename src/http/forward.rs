//! Outbound call to the backend API.
//!
//! # Responsibilities
//! - Send exactly one request per inbound request (no retries, no caching)
//! - Bound the whole call, body read included, by the request deadline
//! - Hand the backend body to the translation table in `response.rs`

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method, StatusCode};
use serde_json::Value;

use crate::config::TimeoutConfig;
use crate::error::ProxyError;
use crate::http::response::{translate_body, ContentKind};
use crate::resilience::with_deadline;

/// A fully prepared outbound request.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// Backend answer after translation to JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendReply {
    pub status: StatusCode,
    pub body: Value,
}

/// HTTP client wrapper that forwards to the backend.
#[derive(Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    connect: Duration,
    deadline: Duration,
}

impl Forwarder {
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeouts.connect())
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            connect: timeouts.connect(),
            deadline: timeouts.request(),
        })
    }

    /// Perform the outbound call.
    pub async fn forward(&self, request: ForwardRequest) -> Result<BackendReply, ProxyError> {
        let (connect, deadline) = (self.connect, self.deadline);
        let to_proxy_error = move |e: reqwest::Error| {
            if e.is_timeout() {
                timeout_error(e.is_connect(), connect, deadline)
            } else {
                ProxyError::Transport(e)
            }
        };

        with_deadline(deadline, async {
            let mut builder = self
                .client
                .request(request.method, &request.url)
                .headers(request.headers);
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(to_proxy_error)?;
            let status = response.status();
            let kind = ContentKind::from_content_type(
                response
                    .headers()
                    .get(header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok()),
            );

            let text = response.text().await.map_err(to_proxy_error)?;

            Ok(BackendReply {
                status,
                body: translate_body(kind, &text),
            })
        })
        .await
    }
}

/// A timed-out connect attempt reports the connect budget, anything later
/// the request deadline.
fn timeout_error(during_connect: bool, connect: Duration, deadline: Duration) -> ProxyError {
    if during_connect {
        ProxyError::ConnectTimeout(connect)
    } else {
        ProxyError::Timeout(deadline)
    }
}
