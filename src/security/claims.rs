//! Bearer token inspection.
//!
//! Reads the role claim out of a JWT payload without verifying the
//! signature. The result only annotates logs; authorization stays with the
//! backend.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde_json::Value;

/// Claim keys checked for the caller's role, in order.
const ROLE_CLAIMS: [&str; 5] = [
    "http://schemas.microsoft.com/ws/2008/06/identity/claims/role",
    "role",
    "Role",
    "userRole",
    "UserRole",
];

/// Dashboard role carried in the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Admin,
    GameMaster,
    Player,
    Other(String),
}

impl Role {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "admin" | "administrator" => Role::Admin,
            "gm" | "gamemaster" => Role::GameMaster,
            "player" => Role::Player,
            _ => Role::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "Admin",
            Role::GameMaster => "GameMaster",
            Role::Player => "Player",
            Role::Other(raw) => raw,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extract the role from an `Authorization` header value.
///
/// Accepts `Bearer <jwt>` or a bare JWT. Returns `None` if the value is
/// not a decodable JWT or carries no non-empty role claim.
pub fn role_from_authorization(value: &str) -> Option<Role> {
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .unwrap_or(value)
        .trim();

    let payload = decode_payload(token)?;
    role_from_payload(&payload)
}

fn decode_payload(token: &str) -> Option<Value> {
    let mut parts = token.split('.');
    let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    // Some issuers pad their segments.
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

fn role_from_payload(payload: &Value) -> Option<Role> {
    let from_keys = ROLE_CLAIMS
        .iter()
        .filter_map(|key| payload.get(*key))
        .find_map(claim_str);

    let raw = from_keys.or_else(|| {
        payload
            .get("roles")
            .and_then(Value::as_array)
            .and_then(|roles| roles.first())
            .and_then(claim_str)
    })?;

    Some(Role::parse(raw))
}

fn claim_str(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        // Multi-role tokens put an array under the same claim.
        Value::Array(items) => items.first().and_then(claim_str),
        _ => None,
    }
}
