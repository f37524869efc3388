//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → timeouts.rs (enforce the request deadline)
//!     → On failure: surfaced to the caller as a JSON error
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries: a single attempt either succeeds or reports an error,
//!   retry policy belongs to the caller

pub mod timeouts;

pub use timeouts::with_deadline;
