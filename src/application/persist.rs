//! Dual persistence of the canonical output.
//!
//! Two independent sub-operations in a fixed order: local save first, cloud
//! upload second. Either one failing forfeits the whole call; the aggregate
//! result is only constructed after both succeed, so a caller never sees a
//! half-populated result.

use std::sync::Arc;

use log::info;
use tokio_util::sync::CancellationToken;

use crate::application::cancellable;
use crate::core::ports::{CloudStorePort, LocalStorePort};
use crate::core::types::{CanonicalOutputRef, PersistedResult};
use crate::error::{PersistStage, PipelineError};

pub struct DualPersister {
    local: Arc<dyn LocalStorePort>,
    cloud: Arc<dyn CloudStorePort>,
}

impl DualPersister {
    pub fn new(local: Arc<dyn LocalStorePort>, cloud: Arc<dyn CloudStorePort>) -> Self {
        Self { local, cloud }
    }

    /// Persist the canonical output to both stores, naming the local artifact
    /// after the correlation id.
    pub async fn persist(
        &self,
        output: &CanonicalOutputRef,
        correlation_id: &str,
        cancel: &CancellationToken,
    ) -> Result<PersistedResult, PipelineError> {
        let local_path = cancellable(cancel, self.local.save(&output.url, correlation_id))
            .await?
            .map_err(|e| PipelineError::persistence(PersistStage::Local, e))?;
        info!("Output saved locally at: {}", local_path);

        let cloudinary_url = cancellable(cancel, self.cloud.upload(&output.url))
            .await?
            .map_err(|e| PipelineError::persistence(PersistStage::Cloud, e))?;
        info!("Uploaded to cloud store: {}", cloudinary_url);

        Ok(PersistedResult {
            cloudinary_url,
            local_path,
            original_output: output.url.clone(),
        })
    }
}
