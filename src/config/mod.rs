//! Process configuration.
//!
//! Everything tunable lives in [`Settings`], constructed once at process
//! start from the environment and passed into each component. No component
//! reads ambient global state directly.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Default interval between status queries.
const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
/// Default cap on status queries per job; together with the interval this
/// bounds total poll wall time to roughly one minute.
const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 30;
const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 30;
const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 60;
const DEFAULT_OUTPUTS_DIR: &str = "public/outputs";
const DEFAULT_WEBSERVER_PORT: u16 = 3100;

const DEFAULT_REPLICATE_API_BASE: &str = "https://api.replicate.com";
const DEFAULT_CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com";
/// Versioned job template selecting the remote transformation model.
const DEFAULT_MODEL_VERSION: &str =
    "9451bfbf652b21a9bccc741e5c7046540faa5586cfa3aa45abc7dbb46151a4f7";
const DEFAULT_CLOUDINARY_FOLDER: &str = "imaginify_transformed";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {name}: {value}")]
    InvalidVar { name: &'static str, value: String },
}

/// Immutable process settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub replicate_api_token: String,
    pub replicate_api_base: String,
    pub replicate_model_version: String,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    pub outputs_dir: PathBuf,
    pub download_timeout: Duration,
    pub upload_timeout: Duration,
    pub cloudinary_api_base: String,
    pub cloudinary_cloud_name: String,
    pub cloudinary_api_key: String,
    pub cloudinary_api_secret: String,
    pub cloudinary_folder: String,
    pub webserver_port: u16,
}

impl Settings {
    /// Build settings from the process environment.
    ///
    /// API credentials are required; everything else falls back to the
    /// defaults above.
    pub fn from_env() -> Result<Self, SettingsError> {
        Ok(Self {
            replicate_api_token: require("REPLICATE_API_TOKEN")?,
            replicate_api_base: optional("REPLICATE_API_BASE", DEFAULT_REPLICATE_API_BASE),
            replicate_model_version: optional("REPLICATE_MODEL_VERSION", DEFAULT_MODEL_VERSION),
            poll_interval: Duration::from_millis(parse_or(
                "POLL_INTERVAL_MS",
                DEFAULT_POLL_INTERVAL_MS,
            )?),
            max_poll_attempts: parse_or("MAX_POLL_ATTEMPTS", DEFAULT_MAX_POLL_ATTEMPTS)?,
            outputs_dir: PathBuf::from(optional("OUTPUTS_DIR", DEFAULT_OUTPUTS_DIR)),
            download_timeout: Duration::from_secs(parse_or(
                "DOWNLOAD_TIMEOUT_SECS",
                DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            )?),
            upload_timeout: Duration::from_secs(parse_or(
                "UPLOAD_TIMEOUT_SECS",
                DEFAULT_UPLOAD_TIMEOUT_SECS,
            )?),
            cloudinary_api_base: optional("CLOUDINARY_API_BASE", DEFAULT_CLOUDINARY_API_BASE),
            cloudinary_cloud_name: require("CLOUDINARY_CLOUD_NAME")?,
            cloudinary_api_key: require("CLOUDINARY_API_KEY")?,
            cloudinary_api_secret: require("CLOUDINARY_API_SECRET")?,
            cloudinary_folder: optional("CLOUDINARY_FOLDER", DEFAULT_CLOUDINARY_FOLDER),
            webserver_port: parse_or("WEBSERVER_PORT", DEFAULT_WEBSERVER_PORT)?,
        })
    }
}

fn require(name: &'static str) -> Result<String, SettingsError> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(SettingsError::MissingVar(name)),
    }
}

fn optional(name: &str, default: &str) -> String {
    env::var(name).ok().filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, SettingsError> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => {
            value.parse().map_err(|_| SettingsError::InvalidVar {
                name,
                value,
            })
        }
        _ => Ok(default),
    }
}
