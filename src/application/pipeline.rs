//! The orchestration entry point and poll loop.
//!
//! One run is a single sequence of suspending operations: submit the job,
//! drive it to a terminal state under the attempt budget, normalize the
//! output, persist to both stores. Concurrent runs are fully isolated.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::application::cancellable;
use crate::application::persist::DualPersister;
use crate::core::normalize::normalize;
use crate::core::ports::JobServicePort;
use crate::core::types::{JobHandle, JobState, JobStatus, PersistedResult, TransformRequest};
use crate::error::PipelineError;

pub struct TransformPipeline {
    jobs: Arc<dyn JobServicePort>,
    persister: DualPersister,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

impl TransformPipeline {
    pub fn new(
        jobs: Arc<dyn JobServicePort>,
        persister: DualPersister,
        poll_interval: Duration,
        max_poll_attempts: u32,
    ) -> Self {
        Self {
            jobs,
            persister,
            poll_interval,
            max_poll_attempts,
        }
    }

    /// Run one transformation end to end.
    ///
    /// Every failure kind from the sub-components is surfaced unchanged in
    /// kind; there is no local recovery or fallback path.
    pub async fn run(
        &self,
        request: &TransformRequest,
        cancel: &CancellationToken,
    ) -> Result<PersistedResult, PipelineError> {
        info!("Processing image: {}", request.source_image_url);
        let handle = cancellable(cancel, self.jobs.submit(request)).await??;
        info!("Started prediction: {}", handle.job_id);

        let status = self.poll(&handle, cancel).await?;
        let canonical = normalize(status.output.as_ref())?;

        let result = self
            .persister
            .persist(&canonical, &handle.job_id, cancel)
            .await?;
        info!("Transformation complete: {}", handle.job_id);
        Ok(result)
    }

    /// Drive the job to a terminal state.
    ///
    /// At most `max_poll_attempts` status queries, with a cancellable
    /// fixed-interval sleep before every query except the first: a job that
    /// succeeds on query N costs exactly N-1 sleeps. Exhausting the budget
    /// without a terminal state is a timeout.
    async fn poll(
        &self,
        handle: &JobHandle,
        cancel: &CancellationToken,
    ) -> Result<JobStatus, PipelineError> {
        for attempt in 0..self.max_poll_attempts {
            if attempt > 0 {
                cancellable(cancel, sleep(self.poll_interval)).await?;
            }

            let status = cancellable(cancel, self.jobs.status(handle)).await??;
            debug!(
                "Prediction status after attempt {}: {:?}",
                attempt + 1,
                status.state
            );

            match status.state {
                JobState::Succeeded => return Ok(status),
                JobState::Failed => {
                    return Err(PipelineError::TransformationFailed(
                        status
                            .error
                            .unwrap_or_else(|| "image transformation failed".to_string()),
                    ))
                }
                JobState::Pending => {}
            }
        }

        Err(PipelineError::Timeout)
    }
}
