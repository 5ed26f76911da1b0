//! Job client for the remote prediction service.
//!
//! Submits a transformation job against a fixed, versioned job template and
//! queries its status by id. Submission and status queries share one reqwest
//! client; neither is retried here.

use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::core::ports::JobServicePort;
use crate::core::types::{JobHandle, JobStatus, TransformRequest};
use crate::error::PipelineError;

pub struct ReplicateClient {
    http: reqwest::Client,
    api_base: String,
    api_token: String,
    model_version: String,
}

#[derive(Serialize)]
struct PredictionRequest<'a> {
    version: &'a str,
    input: PredictionInput<'a>,
}

#[derive(Serialize)]
struct PredictionInput<'a> {
    image: &'a str,
}

#[derive(Deserialize)]
struct PredictionCreated {
    id: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
}

impl ReplicateClient {
    pub fn new(settings: &Settings) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: settings.replicate_api_base.trim_end_matches('/').to_string(),
            api_token: settings.replicate_api_token.clone(),
            model_version: settings.replicate_model_version.clone(),
        }
    }

    fn auth_header(&self) -> String {
        format!("Token {}", self.api_token)
    }
}

#[async_trait]
impl JobServicePort for ReplicateClient {
    async fn submit(&self, request: &TransformRequest) -> Result<JobHandle, PipelineError> {
        let body = PredictionRequest {
            version: &self.model_version,
            input: PredictionInput {
                image: &request.source_image_url,
            },
        };

        let response = self
            .http
            .post(format!("{}/v1/predictions", self.api_base))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::Submission(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .unwrap_or_else(|| format!("unexpected status {}", status));
            return Err(PipelineError::Submission(detail));
        }

        let created: PredictionCreated = response
            .json()
            .await
            .map_err(|e| PipelineError::Submission(e.to_string()))?;
        info!("Prediction created: {}", created.id);
        Ok(JobHandle { job_id: created.id })
    }

    async fn status(&self, handle: &JobHandle) -> Result<JobStatus, PipelineError> {
        let response = self
            .http
            .get(format!("{}/v1/predictions/{}", self.api_base, handle.job_id))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await
            .map_err(|e| PipelineError::Polling(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::Polling(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        let status: JobStatus = response
            .json()
            .await
            .map_err(|e| PipelineError::Polling(e.to_string()))?;
        debug!("Prediction {} is {:?}", handle.job_id, status.state);
        Ok(status)
    }
}
