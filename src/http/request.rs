//! Inbound request handling and transformation.
//!
//! # Responsibilities
//! - Enforce the method allow-list
//! - Select the headers that may be forwarded
//! - Classify the inbound body and decide what (if anything) to forward
//! - Expose the request ID assigned by the middleware stack
//!
//! # Design Decisions
//! - Only `Authorization` and `Content-Type` ever leave the proxy
//! - Body shape is an explicit tagged union, decided once per request

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method};
use serde_json::Value;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Methods the proxy accepts. Anything else gets a 405.
pub const ALLOWED_METHODS: [Method; 7] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
];

pub fn is_allowed(method: &Method) -> bool {
    ALLOWED_METHODS.contains(method)
}

/// Methods whose inbound body is forwarded.
pub fn carries_body(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

fn defaults_content_type(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Build the header set for the outbound call.
///
/// `Authorization` is copied verbatim. `Content-Type` is copied if present,
/// otherwise defaulted to `application/json` for body-carrying methods.
pub fn forwarded_headers(method: &Method, inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Some(auth) = inbound.get(header::AUTHORIZATION) {
        headers.insert(header::AUTHORIZATION, auth.clone());
    }

    match inbound.get(header::CONTENT_TYPE) {
        Some(ct) => {
            headers.insert(header::CONTENT_TYPE, ct.clone());
        }
        None if defaults_content_type(method) => {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }
        None => {}
    }

    headers
}

/// Request ID assigned (or preserved) by the middleware stack.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

pub fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
}

/// Shape of an inbound body.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundBody {
    /// Opaque text, forwarded byte-for-byte.
    Raw(Bytes),
    /// Parsed JSON object or array, re-serialized when forwarded.
    Structured(Value),
    /// Nothing to forward.
    Absent,
}

impl InboundBody {
    /// Classify the body of a request with the given method and content type.
    ///
    /// Methods outside POST/PUT/PATCH/DELETE never forward a body. A JSON
    /// string literal counts as text; JSON null, numbers and booleans carry
    /// nothing worth forwarding. A declared-JSON body that fails to parse is
    /// passed through untouched and left for the backend to reject.
    pub fn classify(method: &Method, content_type: Option<&str>, bytes: Bytes) -> Self {
        if !carries_body(method) || bytes.is_empty() {
            return InboundBody::Absent;
        }

        if !is_json_content_type(content_type) {
            return InboundBody::Raw(bytes);
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::String(s)) => InboundBody::Raw(Bytes::from(s)),
            Ok(v @ (Value::Object(_) | Value::Array(_))) => InboundBody::Structured(v),
            Ok(_) => InboundBody::Absent,
            Err(_) => InboundBody::Raw(bytes),
        }
    }

    /// Bytes to send upstream, or `None` to omit the body entirely.
    pub fn into_payload(self) -> Option<Bytes> {
        match self {
            InboundBody::Raw(bytes) if bytes.is_empty() => None,
            InboundBody::Raw(bytes) => Some(bytes),
            InboundBody::Structured(Value::Object(map)) if map.is_empty() => None,
            InboundBody::Structured(Value::Array(items)) if items.is_empty() => None,
            InboundBody::Structured(value) => serde_json::to_vec(&value).ok().map(Bytes::from),
            InboundBody::Absent => None,
        }
    }
}
