//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request (ANY /proxy/*path)
//!     → server.rs (request ID, tracing span, method allow-list)
//!     → request.rs (header selection, body classification)
//!     → routing (target URL)
//!     → forward.rs (single outbound call under a deadline)
//!     → response.rs (content-type decision table → JSON)
//!     → JSON response to the caller, backend status preserved
//! ```

pub mod forward;
pub mod health;
pub mod request;
pub mod response;
pub mod server;

pub use forward::{BackendReply, ForwardRequest, Forwarder};
pub use request::{InboundBody, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
