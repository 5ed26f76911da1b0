use std::sync::Arc;

use anyhow::Result;
use log::info;
use tracing_subscriber::EnvFilter;

use imaginify_pipeline::application::persist::DualPersister;
use imaginify_pipeline::application::pipeline::TransformPipeline;
use imaginify_pipeline::config::Settings;
use imaginify_pipeline::infrastructure::cloudinary::CloudinaryClient;
use imaginify_pipeline::infrastructure::replicate::ReplicateClient;
use imaginify_pipeline::infrastructure::storage::FileOutputStorage;
use imaginify_pipeline::infrastructure::web;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env()?;

    let jobs = Arc::new(ReplicateClient::new(&settings));
    let local = Arc::new(FileOutputStorage::new(&settings)?);
    let cloud = Arc::new(CloudinaryClient::new(&settings)?);
    let persister = DualPersister::new(local, cloud);
    let pipeline = Arc::new(TransformPipeline::new(
        jobs,
        persister,
        settings.poll_interval,
        settings.max_poll_attempts,
    ));

    let routes = web::routes(pipeline, settings.outputs_dir.clone());
    info!("Listening on port {}", settings.webserver_port);
    warp::serve(routes)
        .run(([0, 0, 0, 0], settings.webserver_port))
        .await;

    Ok(())
}
