//! Imaginify Pipeline
//!
//! Asynchronous orchestration of image transformation jobs: submit a job to
//! the remote prediction service, poll it to a terminal state under bounded
//! time and attempt budgets, normalize the heterogeneous output payload into
//! a single canonical image reference, and persist the result to local disk
//! and a cloud object store.

pub mod application;
pub mod config;
pub mod core;
pub mod error;
pub mod infrastructure;

pub use crate::application::persist::DualPersister;
pub use crate::application::pipeline::TransformPipeline;
pub use crate::config::Settings;
pub use crate::core::types::{PersistedResult, TransformRequest};
pub use crate::error::PipelineError;
