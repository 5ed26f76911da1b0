//! Typed failure taxonomy for the transformation pipeline.
//!
//! Each variant maps to one failure kind a caller can observe; the cause
//! message from the remote service or the underlying store is preserved
//! verbatim so diagnostics survive the trip to the boundary.

use std::fmt;

use thiserror::Error;

/// Which half of the dual persistence step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistStage {
    Local,
    Cloud,
}

impl fmt::Display for PersistStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistStage::Local => f.write_str("local"),
            PersistStage::Cloud => f.write_str("cloud"),
        }
    }
}

/// All failure kinds the pipeline surfaces to its caller.
///
/// There is no internal recovery: every variant aborts the run and is
/// propagated unchanged in kind. The only designed repetition is the poll
/// loop's own status queries, which are not retries of a failed call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// The remote service rejected the job submission.
    #[error("failed to start transformation: {0}")]
    Submission(String),

    /// A status query failed at the HTTP level. Fatal; the query itself is
    /// never retried.
    #[error("failed to check prediction status: {0}")]
    Polling(String),

    /// The remote service reported the job as failed. Carries the remote
    /// error message when one was provided.
    #[error("{0}")]
    TransformationFailed(String),

    /// The attempt budget was exhausted without reaching a terminal state.
    #[error("transformation timed out")]
    Timeout,

    /// The terminal output payload had no recognizable image reference.
    #[error("invalid output format")]
    Normalization,

    /// Local save or cloud upload failed; the aggregate result is forfeited
    /// even if the other store succeeded.
    #[error("failed to persist output ({stage}): {cause}")]
    Persistence { stage: PersistStage, cause: String },

    /// The caller's cancellation token fired at a suspension point.
    #[error("transformation cancelled")]
    Cancelled,
}

impl PipelineError {
    pub(crate) fn persistence(stage: PersistStage, cause: impl fmt::Display) -> Self {
        PipelineError::Persistence {
            stage,
            cause: cause.to_string(),
        }
    }
}
