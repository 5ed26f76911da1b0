pub mod persist;
pub mod pipeline;

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::PipelineError;

/// Race a future against the caller's cancellation token.
///
/// Every suspension point in a run goes through here so a deployment-level
/// timeout or a departing caller can abort early.
pub(crate) async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = T>,
) -> Result<T, PipelineError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PipelineError::Cancelled),
        value = fut => Ok(value),
    }
}
