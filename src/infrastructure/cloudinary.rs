//! Cloud object store adapter.
//!
//! Uploads the transformed image by URL into a fixed logical folder through
//! the signed upload endpoint and returns the secure public URL.

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use log::info;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::config::Settings;
use crate::core::ports::CloudStorePort;

pub struct CloudinaryClient {
    http: reqwest::Client,
    api_base: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    folder: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    secure_url: Option<String>,
}

#[derive(Deserialize)]
struct UploadErrorBody {
    #[serde(default)]
    error: Option<UploadErrorDetail>,
}

#[derive(Deserialize)]
struct UploadErrorDetail {
    message: String,
}

impl CloudinaryClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.upload_timeout)
            .build()
            .context("failed to build upload client")?;
        Ok(Self {
            http,
            api_base: settings.cloudinary_api_base.trim_end_matches('/').to_string(),
            cloud_name: settings.cloudinary_cloud_name.clone(),
            api_key: settings.cloudinary_api_key.clone(),
            api_secret: settings.cloudinary_api_secret.clone(),
            folder: settings.cloudinary_folder.clone(),
        })
    }

    /// SHA-256 request signature over the signed parameters in alphabetical
    /// order, with the API secret appended. The account must be configured
    /// for the SHA-256 signature algorithm.
    fn sign(&self, timestamp: u64) -> String {
        let to_sign = format!(
            "folder={}&timestamp={}{}",
            self.folder, timestamp, self.api_secret
        );
        hex::encode(Sha256::digest(to_sign.as_bytes()))
    }
}

#[async_trait]
impl CloudStorePort for CloudinaryClient {
    async fn upload(&self, url: &str) -> Result<String> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let signature = self.sign(timestamp);
        let timestamp = timestamp.to_string();

        info!("Uploading to Cloudinary: {}", url);
        let response = self
            .http
            .post(format!(
                "{}/v1_1/{}/image/upload",
                self.api_base, self.cloud_name
            ))
            .form(&[
                ("file", url),
                ("api_key", &self.api_key),
                ("timestamp", &timestamp),
                ("signature", &signature),
                ("folder", &self.folder),
            ])
            .send()
            .await
            .context("failed to reach upload endpoint")?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<UploadErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .map(|detail| detail.message)
                .unwrap_or_else(|| format!("unexpected status {}", status));
            bail!("failed to upload transformed image: {}", message);
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .context("failed to decode upload response")?;
        match uploaded.secure_url {
            Some(secure_url) => {
                info!("Cloudinary upload complete: {}", secure_url);
                Ok(secure_url)
            }
            None => bail!("upload response carried no secure URL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use std::path::PathBuf;
    use std::time::Duration;

    fn client(api_base: String) -> CloudinaryClient {
        CloudinaryClient::new(&Settings {
            replicate_api_token: "r8_test".into(),
            replicate_api_base: "http://unused".into(),
            replicate_model_version: "version123".into(),
            poll_interval: Duration::from_millis(1),
            max_poll_attempts: 3,
            outputs_dir: PathBuf::from("public/outputs"),
            download_timeout: Duration::from_secs(5),
            upload_timeout: Duration::from_secs(5),
            cloudinary_api_base: api_base,
            cloudinary_cloud_name: "testcloud".into(),
            cloudinary_api_key: "key".into(),
            cloudinary_api_secret: "secret".into(),
            cloudinary_folder: "imaginify_transformed".into(),
            webserver_port: 0,
        })
        .expect("client builds")
    }

    #[tokio::test]
    async fn upload_sends_signed_form_into_the_fixed_folder() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1_1/testcloud/image/upload")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("file".into(), "https://x/y.png".into()),
                Matcher::UrlEncoded("folder".into(), "imaginify_transformed".into()),
                Matcher::UrlEncoded("api_key".into(), "key".into()),
                Matcher::Regex("signature=[0-9a-f]{64}".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"secure_url":"https://cdn/z.png"}"#)
            .create_async()
            .await;

        let client = client(server.url());
        let secure_url = client
            .upload("https://x/y.png")
            .await
            .expect("upload succeeds");

        assert_eq!(secure_url, "https://cdn/z.png");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_upload_surfaces_the_remote_message() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/v1_1/testcloud/image/upload")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Invalid signature"}}"#)
            .create_async()
            .await;

        let client = client(server.url());
        let err = client
            .upload("https://x/y.png")
            .await
            .expect_err("upload rejected");

        assert!(err.to_string().contains("Invalid signature"));
    }

    #[tokio::test]
    async fn response_without_secure_url_is_an_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/v1_1/testcloud/image/upload")
            .with_status(200)
            .with_body(r#"{"public_id":"abc"}"#)
            .create_async()
            .await;

        let client = client(server.url());
        let err = client
            .upload("https://x/y.png")
            .await
            .expect_err("missing URL");

        assert!(err.to_string().contains("no secure URL"));
    }

    #[test]
    fn signature_is_stable_for_fixed_inputs() {
        let client = client("http://unused".into());
        let expected = hex::encode(Sha256::digest(
            "folder=imaginify_transformed&timestamp=1700000000secret".as_bytes(),
        ));
        assert_eq!(client.sign(1_700_000_000), expected);
    }
}
