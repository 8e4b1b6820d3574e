#![allow(dead_code)]

use jma_scraper::app::ports::PageFetcher;
use jma_scraper::error::Result;
use jma_scraper::infra::http_client::check_response;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("missing fixture {}: {}", path.display(), e))
}

#[derive(Clone)]
pub struct CannedResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

impl CannedResponse {
    pub fn html(body: String) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: Some("text/html".to_string()),
            body,
        }
    }

    pub fn with(status: StatusCode, content_type: &str, body: &str) -> Self {
        Self {
            status,
            content_type: Some(content_type.to_string()),
            body: body.to_string(),
        }
    }
}

/// In-process fetcher: answers from canned responses and remembers every address asked for.
///
/// Addresses without a canned response get a 404.
#[derive(Clone, Default)]
pub struct FakeFetcher {
    responses: Arc<Mutex<HashMap<String, CannedResponse>>>,
    fallback: Option<CannedResponse>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeFetcher {
    pub fn always(response: CannedResponse) -> Self {
        Self {
            fallback: Some(response),
            ..Self::default()
        }
    }

    pub fn respond(&self, address: &str, response: CannedResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert(address.to_string(), response);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl PageFetcher for FakeFetcher {
    fn fetch(&self, address: &str, _timeout: Duration) -> Result<String> {
        self.calls.lock().unwrap().push(address.to_string());
        let canned = self
            .responses
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .or_else(|| self.fallback.clone())
            .unwrap_or_else(|| CannedResponse::with(StatusCode::NOT_FOUND, "text/html", ""));
        check_response(canned.status, canned.content_type.as_deref(), canned.body)
    }
}
