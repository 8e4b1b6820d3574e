//! Capabilities the pipeline and tasks are written against. Concrete adapters live in
//! `crate::infra` and `crate::storage`; tests substitute in-process fakes.

use crate::audit::AuditRecord;
use crate::error::Result;
use std::path::Path;
use std::time::Duration;

/// Retrieve a page as text.
///
/// Implementations succeed only for an HTTP success status with content type exactly
/// `text/html`; anything else is `ScraperError::FetchFailed`.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, address: &str, timeout: Duration) -> Result<String>;
}

/// Append-only sink for audit events
pub trait AuditSink: Send + Sync {
    fn append(&self, record: &AuditRecord) -> Result<()>;
}

/// Put a local file under a key, returning the location it was stored at.
pub trait ObjectStore: Send + Sync {
    fn put(&self, file: &Path, key: &str) -> Result<String>;

    /// Location a key would be stored at, used for audit events when `put` fails
    fn location(&self, key: &str) -> String;
}
