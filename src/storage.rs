use crate::app::ports::AuditSink;
use crate::audit::{AuditEvent, AuditRecord};
use crate::constants::{DB_DIR, DB_FILE};
use crate::error::Result;
use chrono::SecondsFormat;
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Tables of the audit database, one per event kind
pub const AUDIT_TABLES: [&str; 6] = [
    "fetch_succeeded",
    "fetch_failed",
    "extract_failed",
    "local_write_succeeded",
    "remote_upload_succeeded",
    "remote_upload_failed",
];

/// SQLite-backed audit log with one append-only table per event kind.
pub struct SqliteAuditLog {
    conn: Mutex<Connection>,
}

impl SqliteAuditLog {
    /// Open (creating if needed) `<data_root>/jma_db/jma_app.db`.
    pub fn open_at_root<P: AsRef<Path>>(data_root: P) -> Result<Self> {
        let db_path = data_root.as_ref().join(DB_DIR).join(DB_FILE);
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::from_connection(Connection::open(db_path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            CREATE TABLE IF NOT EXISTS fetch_succeeded (
                id              TEXT PRIMARY KEY,
                recorded_at     TEXT NOT NULL,
                address         TEXT NOT NULL,
                raw_text        TEXT NOT NULL,
                content_sha256  TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS fetch_failed (
                id           TEXT PRIMARY KEY,
                recorded_at  TEXT NOT NULL,
                address      TEXT NOT NULL,
                reason       TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS extract_failed (
                id           TEXT PRIMARY KEY,
                recorded_at  TEXT NOT NULL,
                address      TEXT NOT NULL,
                reason       TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS local_write_succeeded (
                id           TEXT PRIMARY KEY,
                recorded_at  TEXT NOT NULL,
                path         TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS remote_upload_succeeded (
                id           TEXT PRIMARY KEY,
                recorded_at  TEXT NOT NULL,
                url          TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS remote_upload_failed (
                id           TEXT PRIMARY KEY,
                recorded_at  TEXT NOT NULL,
                url          TEXT NOT NULL,
                reason       TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_fetch_failed_address ON fetch_failed(address);
            CREATE INDEX IF NOT EXISTS idx_fetch_succeeded_address ON fetch_succeeded(address);
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Addresses whose fetch failed and that have not been fetched successfully since,
    /// oldest failure first.
    pub fn failed_fetch_addresses(&self) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT f.address FROM fetch_failed f
             WHERE NOT EXISTS (
                 SELECT 1 FROM fetch_succeeded s
                 WHERE s.address = f.address AND s.recorded_at > f.recorded_at
             )
             GROUP BY f.address
             ORDER BY MIN(f.recorded_at)",
        )?;
        let addresses = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(addresses)
    }

    /// Row count per event table
    pub fn counts(&self) -> Result<Vec<(&'static str, u64)>> {
        let conn = self.conn();
        AUDIT_TABLES
            .iter()
            .map(|table| -> Result<(&'static str, u64)> {
                let n: i64 =
                    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
                Ok((*table, n as u64))
            })
            .collect()
    }
}

impl AuditSink for SqliteAuditLog {
    fn append(&self, record: &AuditRecord) -> Result<()> {
        let id = record.id.to_string();
        // Fixed-width timestamps so text order is time order
        let recorded_at = record.recorded_at.to_rfc3339_opts(SecondsFormat::Micros, true);
        let conn = self.conn();
        match &record.event {
            AuditEvent::FetchSucceeded { address, raw_text } => {
                let digest = hex::encode(Sha256::digest(raw_text.as_bytes()));
                conn.execute(
                    "INSERT INTO fetch_succeeded (id, recorded_at, address, raw_text, content_sha256)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![id, recorded_at, address, raw_text, digest],
                )?;
            }
            AuditEvent::FetchFailed { address, reason } => {
                conn.execute(
                    "INSERT INTO fetch_failed (id, recorded_at, address, reason) VALUES (?1, ?2, ?3, ?4)",
                    params![id, recorded_at, address, reason],
                )?;
            }
            AuditEvent::ExtractFailed { address, reason } => {
                conn.execute(
                    "INSERT INTO extract_failed (id, recorded_at, address, reason) VALUES (?1, ?2, ?3, ?4)",
                    params![id, recorded_at, address, reason],
                )?;
            }
            AuditEvent::LocalWriteSucceeded { path } => {
                conn.execute(
                    "INSERT INTO local_write_succeeded (id, recorded_at, path) VALUES (?1, ?2, ?3)",
                    params![id, recorded_at, path],
                )?;
            }
            AuditEvent::RemoteUploadSucceeded { url } => {
                conn.execute(
                    "INSERT INTO remote_upload_succeeded (id, recorded_at, url) VALUES (?1, ?2, ?3)",
                    params![id, recorded_at, url],
                )?;
            }
            AuditEvent::RemoteUploadFailed { url, reason } => {
                conn.execute(
                    "INSERT INTO remote_upload_failed (id, recorded_at, url, reason) VALUES (?1, ?2, ?3, ?4)",
                    params![id, recorded_at, url, reason],
                )?;
            }
        }
        debug!("Appended {} audit record {}", record.event.kind(), record.id);
        Ok(())
    }
}

/// In-memory audit log for tests and dry runs
#[derive(Clone, Default)]
pub struct InMemoryAuditLog {
    records: Arc<Mutex<Vec<AuditRecord>>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.records().into_iter().map(|r| r.event).collect()
    }
}

impl AuditSink for InMemoryAuditLog {
    fn append(&self, record: &AuditRecord) -> Result<()> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(record.clone());
        debug!("Recorded {} audit event {}", record.event.kind(), record.id);
        Ok(())
    }
}
