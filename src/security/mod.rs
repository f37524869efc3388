//! Security subsystem.
//!
//! # Components
//! - `claims.rs`: unverified role extraction from bearer tokens, used for
//!   log annotation only
//!
//! # Design Decisions
//! - The proxy never makes authorization decisions; `Authorization` is
//!   forwarded verbatim and the backend decides
//! - Inbound body limits are enforced in the proxy handler

pub mod claims;

pub use claims::{role_from_authorization, Role};
