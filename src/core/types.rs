//! Domain types for one transformation run.
//!
//! Every entity here is transient: a request produces a fresh job handle and
//! an independent pipeline instance, and nothing is shared across runs.

use serde::{Deserialize, Serialize};

/// A caller-supplied transformation request. Consumed once by the job client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformRequest {
    #[serde(rename = "imageUrl")]
    pub source_image_url: String,
}

/// Opaque identifier of a submitted job, owned by the poller until a terminal
/// state is reached. Doubles as the correlation id naming the local artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub job_id: String,
}

/// Lifecycle state reported by the remote service. Anything that is not an
/// explicit terminal state decodes as `Pending` and keeps the poll loop going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Succeeded,
    Failed,
    #[serde(other)]
    Pending,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

/// One status-query response. Only the most recent one is retained.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatus {
    #[serde(rename = "status")]
    pub state: JobState,
    #[serde(default)]
    pub output: Option<PredictionOutput>,
    #[serde(default)]
    pub error: Option<String>,
}

/// The heterogeneous `output` field, decoded once into an explicit sum type.
///
/// The remote schema varies by job template version: a single URL, a sequence
/// of URLs, or a sequence of objects carrying an image reference. Shapes that
/// match none of these land in `Other` so decoding never fails ahead of
/// normalization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PredictionOutput {
    Url(String),
    Urls(Vec<String>),
    Images(Vec<ImageOutput>),
    Other(serde_json::Value),
}

/// Element of the object-sequence output shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageOutput {
    #[serde(default)]
    pub image: Option<String>,
}

/// The single normalized URL extracted from a successful terminal status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalOutputRef {
    pub url: String,
}

/// Terminal artifact of the pipeline. Both fields are independently
/// meaningful; the aggregate is only constructed after both stores succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedResult {
    pub cloudinary_url: String,
    pub local_path: String,
    pub original_output: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn job_state_decodes_terminal_and_pending_states() {
        let decode = |s: &str| serde_json::from_value::<JobState>(json!(s)).unwrap();
        assert_eq!(decode("succeeded"), JobState::Succeeded);
        assert_eq!(decode("failed"), JobState::Failed);
        assert_eq!(decode("starting"), JobState::Pending);
        assert_eq!(decode("processing"), JobState::Pending);
        assert!(decode("succeeded").is_terminal());
        assert!(!decode("processing").is_terminal());
    }

    #[test]
    fn job_status_decodes_with_missing_output_and_error() {
        let status: JobStatus =
            serde_json::from_value(json!({ "status": "starting" })).unwrap();
        assert_eq!(status.state, JobState::Pending);
        assert!(status.output.is_none());
        assert!(status.error.is_none());
    }

    #[test]
    fn output_decodes_single_url() {
        let output: PredictionOutput =
            serde_json::from_value(json!("https://x/y.png")).unwrap();
        assert_eq!(output, PredictionOutput::Url("https://x/y.png".into()));
    }

    #[test]
    fn output_decodes_url_sequence() {
        let output: PredictionOutput =
            serde_json::from_value(json!(["https://x/a.png", "https://x/b.png"])).unwrap();
        assert_eq!(
            output,
            PredictionOutput::Urls(vec!["https://x/a.png".into(), "https://x/b.png".into()])
        );
    }

    #[test]
    fn output_decodes_image_object_sequence() {
        let output: PredictionOutput =
            serde_json::from_value(json!([{ "image": "https://x/y.png" }])).unwrap();
        assert_eq!(
            output,
            PredictionOutput::Images(vec![ImageOutput {
                image: Some("https://x/y.png".into())
            }])
        );
    }

    #[test]
    fn unrecognized_output_shapes_fall_into_other() {
        let output: PredictionOutput = serde_json::from_value(json!(42)).unwrap();
        assert!(matches!(output, PredictionOutput::Other(_)));

        let output: PredictionOutput = serde_json::from_value(json!([1, 2])).unwrap();
        assert!(matches!(output, PredictionOutput::Other(_)));
    }

    #[test]
    fn persisted_result_serializes_with_wire_names() {
        let result = PersistedResult {
            cloudinary_url: "https://cdn/z.png".into(),
            local_path: "/outputs/job123.png".into(),
            original_output: "https://x/y.png".into(),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "cloudinaryUrl": "https://cdn/z.png",
                "localPath": "/outputs/job123.png",
                "originalOutput": "https://x/y.png"
            })
        );
    }
}
