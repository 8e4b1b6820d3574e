use crate::app::ports::PageFetcher;
use crate::constants::HTML_CONTENT_TYPE;
use crate::error::{Result, ScraperError};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

/// Blocking `reqwest` fetcher; the timeout is applied per request.
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl PageFetcher for ReqwestFetcher {
    fn fetch(&self, address: &str, timeout: Duration) -> Result<String> {
        let resp = self
            .client
            .get(address)
            .timeout(timeout)
            .send()
            .map_err(|e| ScraperError::FetchFailed(e.to_string()))?;
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = resp
            .text()
            .map_err(|e| ScraperError::FetchFailed(e.to_string()))?;
        debug!(
            "GET {} -> {} ({} bytes, content-type {:?})",
            address,
            status,
            body.len(),
            content_type
        );
        check_response(status, content_type.as_deref(), body)
    }
}

/// Accept only an HTTP success whose content type is exactly `text/html`.
pub fn check_response(status: StatusCode, content_type: Option<&str>, body: String) -> Result<String> {
    if !status.is_success() {
        return Err(ScraperError::FetchFailed(format!("HTTP {status}")));
    }
    match content_type {
        Some(HTML_CONTENT_TYPE) => Ok(body),
        Some(other) => Err(ScraperError::FetchFailed(format!(
            "content type should be {HTML_CONTENT_TYPE}, got {other}"
        ))),
        None => Err(ScraperError::FetchFailed(format!(
            "content type should be {HTML_CONTENT_TYPE}, got none"
        ))),
    }
}
