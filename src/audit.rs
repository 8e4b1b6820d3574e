use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Something worth remembering about a fetch, a local write or an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditEvent {
    FetchSucceeded { address: String, raw_text: String },
    FetchFailed { address: String, reason: String },
    /// The page was fetched but its table could not be extracted or normalized
    ExtractFailed { address: String, reason: String },
    LocalWriteSucceeded { path: String },
    RemoteUploadSucceeded { url: String },
    RemoteUploadFailed { url: String, reason: String },
}

impl AuditEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            AuditEvent::FetchSucceeded { .. } => "fetch_succeeded",
            AuditEvent::FetchFailed { .. } => "fetch_failed",
            AuditEvent::ExtractFailed { .. } => "extract_failed",
            AuditEvent::LocalWriteSucceeded { .. } => "local_write_succeeded",
            AuditEvent::RemoteUploadSucceeded { .. } => "remote_upload_succeeded",
            AuditEvent::RemoteUploadFailed { .. } => "remote_upload_failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub event: AuditEvent,
}

impl AuditRecord {
    pub fn new(event: AuditEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            event,
        }
    }
}
