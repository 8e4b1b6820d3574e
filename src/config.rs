use crate::constants::{DEFAULT_BUCKET, DEFAULT_DATA_ROOT, DEFAULT_DELAY_MS, DEFAULT_TIMEOUT_SECONDS};
use crate::error::{Result, ScraperError};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const ENV_DATA_ROOT: &str = "JMA_DATA_ROOT";
pub const ENV_TIMEOUT_SECONDS: &str = "JMA_TIMEOUT_SECONDS";
pub const ENV_DELAY_MS: &str = "JMA_DELAY_MS";
pub const ENV_UPLOAD_ENDPOINT: &str = "JMA_UPLOAD_ENDPOINT";
pub const ENV_UPLOAD_BUCKET: &str = "JMA_UPLOAD_BUCKET";
pub const ENV_UPLOAD_TOKEN: &str = "JMA_UPLOAD_TOKEN";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_root: PathBuf,
    pub timeout_seconds: f64,
    pub delay_ms: u64,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub endpoint: Option<String>,
    pub bucket: String,
    pub token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from(DEFAULT_DATA_ROOT),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            delay_ms: DEFAULT_DELAY_MS,
            upload: UploadConfig::default(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            bucket: DEFAULT_BUCKET.to_string(),
            token: None,
        }
    }
}

impl Config {
    /// Read the TOML file (if any), then apply `JMA_*` environment overrides and validate.
    ///
    /// A missing file is only an error when its path was given explicitly.
    pub fn load(path: &Path, explicit: bool) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                ScraperError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
            })?;
            debug!("Loaded config from {}", path.display());
            Self::from_toml(&content)?
        } else if explicit {
            return Err(ScraperError::Config(format!(
                "Config file '{}' does not exist",
                path.display()
            )));
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_DATA_ROOT) {
            self.data_root = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_TIMEOUT_SECONDS) {
            self.timeout_seconds = v.trim().parse().map_err(|_| {
                ScraperError::Config(format!("{ENV_TIMEOUT_SECONDS} must be a number, got '{v}'"))
            })?;
        }
        if let Some(v) = lookup(ENV_DELAY_MS) {
            self.delay_ms = v.trim().parse().map_err(|_| {
                ScraperError::Config(format!("{ENV_DELAY_MS} must be an integer, got '{v}'"))
            })?;
        }
        if let Some(v) = lookup(ENV_UPLOAD_ENDPOINT) {
            self.upload.endpoint = Some(v);
        }
        if let Some(v) = lookup(ENV_UPLOAD_BUCKET) {
            self.upload.bucket = v;
        }
        if let Some(v) = lookup(ENV_UPLOAD_TOKEN) {
            self.upload.token = Some(v);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.timeout_seconds.is_finite() || self.timeout_seconds <= 0.0 {
            return Err(ScraperError::Config(format!(
                "timeout_seconds must be positive, got {}",
                self.timeout_seconds
            )));
        }
        Duration::try_from_secs_f64(self.timeout_seconds).map_err(|e| {
            ScraperError::Config(format!(
                "timeout_seconds {} is out of range: {}",
                self.timeout_seconds, e
            ))
        })?;
        self.upload.validate()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_seconds)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl UploadConfig {
    fn validate(&self) -> Result<()> {
        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ScraperError::Config(format!(
                    "upload endpoint must be an http(s) URL, got '{endpoint}'"
                )));
            }
        }
        let bucket_re = Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$")
            .map_err(|e| ScraperError::Config(e.to_string()))?;
        if !bucket_re.is_match(&self.bucket) {
            return Err(ScraperError::Config(format!(
                "upload bucket must be lower-case kebab-case, got '{}'",
                self.bucket
            )));
        }
        Ok(())
    }

    /// Base URL of a store that accepts `PUT {endpoint}/{bucket}/{key}` with a bearer token.
    ///
    /// There is no default target; HTTP uploads need it set explicitly.
    pub fn endpoint(&self) -> Result<String> {
        self.endpoint
            .clone()
            .ok_or_else(|| ScraperError::Config(format!("set {ENV_UPLOAD_ENDPOINT} to upload")))
    }
}
