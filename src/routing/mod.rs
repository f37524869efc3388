//! Request routing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound path (/proxy/auth/login?x=1)
//!     → target.rs (strip mount path, split wildcard segments)
//!     → target.rs (join onto backend base URL)
//!     → Outbound URL (http://backend/api/auth/login?x=1)
//! ```
//!
//! # Design Decisions
//! - Single backend; no host or priority matching
//! - Raw path used so percent-encoding survives untouched

pub mod target;

pub use target::{wildcard_segments, BackendTarget};
