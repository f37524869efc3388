//! Hshield dashboard forwarding proxy.
//!
//! Serves `ANY /proxy/*path` on the dashboard's origin and forwards each
//! request to the backend REST API, so the browser never talks to the
//! backend across origins. Responses are always JSON.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod security;

pub use config::ProxyConfig;
pub use error::{ErrorEnvelope, ProxyError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
