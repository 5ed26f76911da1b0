//! Ports through which the pipeline reaches its collaborators.
//!
//! The application layer depends only on these traits; the reqwest and
//! filesystem adapters live in `infrastructure`.

use anyhow::Result;
use async_trait::async_trait;

use crate::core::types::{JobHandle, JobStatus, TransformRequest};
use crate::error::PipelineError;

/// Remote prediction service: submit a job, query its status.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobServicePort: Send + Sync {
    /// Submit a transformation job. A rejection is terminal for the run;
    /// there is no retry at this layer.
    async fn submit(&self, request: &TransformRequest) -> Result<JobHandle, PipelineError>;

    /// Query the job's current status. A non-success HTTP response is fatal.
    async fn status(&self, handle: &JobHandle) -> Result<JobStatus, PipelineError>;
}

/// Local output store: download the referenced image and write it under the
/// outputs directory, returning the stable public path.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocalStorePort: Send + Sync {
    async fn save(&self, url: &str, correlation_id: &str) -> Result<String>;
}

/// Cloud object store: upload-by-URL into the fixed logical folder,
/// returning a publicly addressable URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CloudStorePort: Send + Sync {
    async fn upload(&self, url: &str) -> Result<String>;
}
