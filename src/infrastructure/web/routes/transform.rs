//! The inbound transformation boundary.
//!
//! Accepts `{ "imageUrl": ... }`, drives one pipeline run, and returns the
//! persisted result. Every failure kind maps to the same 500 response with
//! the failure message in the body.

use std::convert::Infallible;
use std::sync::Arc;

use log::error;
use tokio_util::sync::CancellationToken;
use warp::http::StatusCode;
use warp::{Filter, Reply};

use crate::application::pipeline::TransformPipeline;
use crate::core::types::TransformRequest;

pub fn route(
    pipeline: Arc<TransformPipeline>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("api" / "transform")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_pipeline(pipeline))
        .and_then(handle_transform)
}

fn with_pipeline(
    pipeline: Arc<TransformPipeline>,
) -> impl Filter<Extract = (Arc<TransformPipeline>,), Error = Infallible> + Clone {
    warp::any().map(move || pipeline.clone())
}

async fn handle_transform(
    request: TransformRequest,
    pipeline: Arc<TransformPipeline>,
) -> Result<impl Reply, Infallible> {
    let cancel = CancellationToken::new();
    match pipeline.run(&request, &cancel).await {
        Ok(result) => Ok(warp::reply::with_status(
            warp::reply::json(&result),
            StatusCode::OK,
        )),
        Err(err) => {
            error!("Transformation failed: {}", err);
            let body = serde_json::json!({ "error": err.to_string() });
            Ok(warp::reply::with_status(
                warp::reply::json(&body),
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::persist::DualPersister;
    use crate::core::ports::{
        MockCloudStorePort, MockJobServicePort, MockLocalStorePort,
    };
    use crate::core::types::{JobHandle, JobState, JobStatus, PredictionOutput};
    use crate::error::PipelineError;
    use std::time::Duration;

    fn pipeline_with(jobs: MockJobServicePort, persister: DualPersister) -> Arc<TransformPipeline> {
        Arc::new(TransformPipeline::new(
            Arc::new(jobs),
            persister,
            Duration::from_millis(1),
            3,
        ))
    }

    #[tokio::test]
    async fn successful_run_returns_the_persisted_result_as_json() {
        let mut jobs = MockJobServicePort::new();
        jobs.expect_submit().returning(|_| {
            Ok(JobHandle {
                job_id: "job123".into(),
            })
        });
        jobs.expect_status().returning(|_| {
            Ok(JobStatus {
                state: JobState::Succeeded,
                output: Some(PredictionOutput::Url("https://x/y.png".into())),
                error: None,
            })
        });

        let mut local = MockLocalStorePort::new();
        local
            .expect_save()
            .returning(|_, _| Ok("/outputs/job123.png".to_string()));
        let mut cloud = MockCloudStorePort::new();
        cloud
            .expect_upload()
            .returning(|_| Ok("https://cdn/z.png".to_string()));

        let filter = route(pipeline_with(
            jobs,
            DualPersister::new(Arc::new(local), Arc::new(cloud)),
        ));

        let response = warp::test::request()
            .method("POST")
            .path("/api/transform")
            .json(&serde_json::json!({ "imageUrl": "https://source/input.png" }))
            .reply(&filter)
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "cloudinaryUrl": "https://cdn/z.png",
                "localPath": "/outputs/job123.png",
                "originalOutput": "https://x/y.png"
            })
        );
    }

    #[tokio::test]
    async fn any_pipeline_failure_maps_to_500_with_the_message() {
        let mut jobs = MockJobServicePort::new();
        jobs.expect_submit()
            .returning(|_| Err(PipelineError::Submission("insufficient credit".into())));

        let mut local = MockLocalStorePort::new();
        local.expect_save().times(0);
        let mut cloud = MockCloudStorePort::new();
        cloud.expect_upload().times(0);

        let filter = route(pipeline_with(
            jobs,
            DualPersister::new(Arc::new(local), Arc::new(cloud)),
        ));

        let response = warp::test::request()
            .method("POST")
            .path("/api/transform")
            .json(&serde_json::json!({ "imageUrl": "https://source/input.png" }))
            .reply(&filter)
            .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "error": "failed to start transformation: insufficient credit"
            })
        );
    }
}
