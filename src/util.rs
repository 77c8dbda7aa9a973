//! Shared utility functions.

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::{Error, Result};

/// Run `fut` with an upper bound on its duration, giving up early if `cancel`
/// fires. Cancellation wins when both are ready.
pub async fn bounded<F, T>(
    operation: &'static str,
    duration: Duration,
    cancel: &CancellationToken,
    fut: F,
) -> Result<T>
where
    F: Future<Output = T>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled(operation)),
        res = timeout(duration, fut) => res.map_err(|_| Error::Timeout(duration)),
    }
}
