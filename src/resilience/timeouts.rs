//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap the backend call with a wall-clock deadline
//! - Cancel the in-flight call cleanly on expiry
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; expiry drops the wrapped future,
//!   which closes the outbound connection
//! - Timeout errors are distinct from other errors

use std::future::Future;
use std::time::Duration;

use crate::error::ProxyError;

/// Run `fut` under `deadline`, mapping expiry to [`ProxyError::Timeout`].
pub async fn with_deadline<F, T>(deadline: Duration, fut: F) -> Result<T, ProxyError>
where
    F: Future<Output = Result<T, ProxyError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(ProxyError::Timeout(deadline)),
    }
}
