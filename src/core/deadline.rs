//! Caller-supplied timeouts for store operations.
//!
//! When the limit expires the wrapped future is dropped. Any transaction it held is
//! rolled back on drop, so a timed-out payment leaves no partial write behind.

use crate::errors::{Error, Result};
use std::future::Future;
use std::time::Duration;

/// Runs `operation`, failing with `Unavailable` if it does not finish within `limit`.
pub async fn with_timeout<T, F>(limit: Duration, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(limit, operation)
        .await
        .map_err(|_| Error::Unavailable {
            message: format!("store did not respond within {:.1}s", limit.as_secs_f64()),
        })?
}
