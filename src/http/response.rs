//! Backend response translation.
//!
//! # Responsibilities
//! - Decide how a backend body is parsed from its content type
//! - Turn every backend body into JSON for the caller
//!
//! # Decision Table
//! ```text
//! content-type         body           result
//! ------------------   ------------   ----------------------------------------
//! application/json     empty          {}
//! application/json     valid JSON     parsed value
//! application/json     invalid        { "message": "Erro ao processar resposta JSON" }
//! anything else        empty          { "message": "Resposta não JSON" }
//! anything else        valid JSON     parsed value (mislabelled backend)
//! anything else        other text     { "message": <text> }
//! ```
//! The backend status code is passed through unchanged in every row.

use serde_json::{json, Value};
use thiserror::Error;

use crate::http::request::is_json_content_type;

pub const MSG_INVALID_JSON: &str = "Erro ao processar resposta JSON";
pub const MSG_NOT_JSON: &str = "Resposta não JSON";

/// Parse strategy selected from the backend content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Json,
    Other,
}

impl ContentKind {
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        if is_json_content_type(content_type) {
            ContentKind::Json
        } else {
            ContentKind::Other
        }
    }
}

/// Backend declared JSON but sent something else.
#[derive(Debug, Error)]
#[error("backend body is not valid JSON: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Parse a body the backend labelled as JSON. An empty body is `{}`.
pub fn parse_declared_json(text: &str) -> Result<Value, DecodeError> {
    if text.is_empty() {
        return Ok(json!({}));
    }
    Ok(serde_json::from_str(text)?)
}

/// Translate a backend body into the JSON value returned to the caller.
pub fn translate_body(kind: ContentKind, text: &str) -> Value {
    match kind {
        ContentKind::Json => match parse_declared_json(text) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "Backend sent malformed JSON");
                json!({ "message": MSG_INVALID_JSON })
            }
        },
        ContentKind::Other if text.is_empty() => json!({ "message": MSG_NOT_JSON }),
        ContentKind::Other => {
            serde_json::from_str(text).unwrap_or_else(|_| json!({ "message": text }))
        }
    }
}
