//! Timeout enforcement for single RPC calls.

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;

use crate::blockchain::types::{TransportError, TransportResult};

/// Run `fut` with a deadline; elapsed deadlines become [`TransportError::Timeout`].
pub async fn with_timeout<T, F>(duration: Duration, fut: F) -> TransportResult<T>
where
    F: Future<Output = TransportResult<T>>,
{
    match timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout(duration)),
    }
}
