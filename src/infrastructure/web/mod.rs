pub mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use warp::Filter;

use crate::application::pipeline::TransformPipeline;

/// All routes: the transform boundary plus static serving of saved outputs
/// under the public `/outputs` prefix.
pub fn routes(
    pipeline: Arc<TransformPipeline>,
    outputs_dir: PathBuf,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let outputs = warp::path("outputs").and(warp::fs::dir(outputs_dir));
    routes::transform::route(pipeline).or(outputs)
}
