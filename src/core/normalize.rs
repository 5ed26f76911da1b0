//! Result normalization.
//!
//! Turns the decoded heterogeneous output payload into the single canonical
//! image reference, in one exhaustive match. First match wins: a sequence
//! contributes its first element (the object's `image` field when present,
//! the element itself otherwise); a scalar is used directly.

use reqwest::Url;

use crate::core::types::{CanonicalOutputRef, PredictionOutput};
use crate::error::PipelineError;

/// Extract the canonical output reference from a successful terminal status.
///
/// The extracted value must be a non-empty string that parses as a URL; any
/// other shape is a normalization failure, never a silent default.
pub fn normalize(
    output: Option<&PredictionOutput>,
) -> Result<CanonicalOutputRef, PipelineError> {
    let candidate = match output {
        Some(PredictionOutput::Url(url)) => Some(url.clone()),
        Some(PredictionOutput::Urls(urls)) => urls.first().cloned(),
        Some(PredictionOutput::Images(images)) => {
            images.first().and_then(|image| image.image.clone())
        }
        Some(PredictionOutput::Other(_)) | None => None,
    };

    match candidate {
        Some(url) if !url.is_empty() && Url::parse(&url).is_ok() => {
            Ok(CanonicalOutputRef { url })
        }
        _ => Err(PipelineError::Normalization),
    }
}
