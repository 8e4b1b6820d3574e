use crate::app::ports::ObjectStore;
use crate::error::{Result, ScraperError};
use reqwest::blocking::Client;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Copies files under a local root directory; the key becomes the relative path.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }
}

impl ObjectStore for FsObjectStore {
    fn put(&self, file: &Path, key: &str) -> Result<String> {
        let dst = self.root.join(key);
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(file, &dst)?;
        debug!("Copied {} to {}", file.display(), dst.display());
        Ok(self.location(key))
    }

    fn location(&self, key: &str) -> String {
        self.root.join(key).display().to_string()
    }
}

/// Uploads with a plain HTTP PUT to `<endpoint>/<bucket>/<key>`.
///
/// An optional static bearer token is sent as-is; requests are not signed.
pub struct HttpObjectStore {
    client: Client,
    endpoint: String,
    bucket: String,
    token: Option<String>,
}

impl HttpObjectStore {
    pub fn new(endpoint: &str, bucket: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            token,
        })
    }
}

impl ObjectStore for HttpObjectStore {
    fn put(&self, file: &Path, key: &str) -> Result<String> {
        let url = self.location(key);
        let bytes = fs::read(file)?;
        let mut request = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, "text/csv")
            .body(bytes);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        let resp = request
            .send()
            .map_err(|e| ScraperError::Upload(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(ScraperError::Upload(format!("{} - {}", status, body)));
        }
        Ok(url)
    }

    fn location(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_store_copies_under_key() {
        let src_dir = tempfile::tempdir().unwrap();
        let dst_dir = tempfile::tempdir().unwrap();
        let file = src_dir.path().join("a.csv");
        fs::write(&file, "x,y\n1,2\n").unwrap();

        let store = FsObjectStore::new(dst_dir.path());
        let location = store.put(&file, "__data__/jma_csv/a.csv").unwrap();
        let copied = dst_dir.path().join("__data__/jma_csv/a.csv");
        assert_eq!(location, copied.display().to_string());
        assert_eq!(fs::read_to_string(copied).unwrap(), "x,y\n1,2\n");
    }

    #[test]
    fn test_http_store_location() {
        let store = HttpObjectStore::new(
            "https://storage.example.com/",
            "00-hq",
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            store.location("__data__/jma_csv/a.csv"),
            "https://storage.example.com/00-hq/__data__/jma_csv/a.csv"
        );
    }
}
