//! Local persistence of transformed outputs.
//!
//! Downloads the referenced image and writes it under the outputs directory,
//! named by the correlation id so concurrent runs never collide. The
//! directory doubles as shared storage for the public `/outputs` prefix.

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use log::info;

use crate::config::Settings;
use crate::core::ports::LocalStorePort;

/// Public path prefix under which saved outputs are served.
pub const PUBLIC_OUTPUTS_PREFIX: &str = "/outputs";

pub struct FileOutputStorage {
    http: reqwest::Client,
    outputs_dir: PathBuf,
}

impl FileOutputStorage {
    pub fn new(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.download_timeout)
            .build()
            .context("failed to build download client")?;
        Ok(Self {
            http,
            outputs_dir: settings.outputs_dir.clone(),
        })
    }

    fn ensure_outputs_dir(&self) -> Result<()> {
        if !self.outputs_dir.exists() {
            fs::create_dir_all(&self.outputs_dir)
                .with_context(|| format!("failed to create {:?}", self.outputs_dir))?;
        }
        Ok(())
    }
}

#[async_trait]
impl LocalStorePort for FileOutputStorage {
    async fn save(&self, url: &str, correlation_id: &str) -> Result<String> {
        self.ensure_outputs_dir()?;

        info!("Downloading image from: {}", url);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("failed to download output")?;
        if !response.status().is_success() {
            bail!("unexpected status {} while downloading output", response.status());
        }
        let content = response
            .bytes()
            .await
            .context("failed to read output body")?;

        let file_name = format!("{}.png", correlation_id);
        let file_path = self.outputs_dir.join(&file_name);
        let mut file = File::create(&file_path)
            .with_context(|| format!("failed to create {:?}", file_path))?;
        file.write_all(&content)
            .with_context(|| format!("failed to write {:?}", file_path))?;
        info!("File saved locally at: {:?}", file_path);

        Ok(format!("{}/{}", PUBLIC_OUTPUTS_PREFIX, file_name))
    }
}
