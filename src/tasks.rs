//! Batch-level operations built on [`Pipeline`]: exporting one date, backfilling a range,
//! replaying failed fetches and uploading exported files.

use crate::address::{parse_date, parse_page, parse_site_codes};
use crate::app::ports::{AuditSink, ObjectStore};
use crate::audit::{AuditEvent, AuditRecord};
use crate::constants::CSV_DIR;
use crate::error::{Result, ScraperError};
use crate::export::{remote_key, write_csv, DestinationName};
use crate::metrics::{BatchKind, BatchMetrics};
use crate::pipeline::Pipeline;
use crate::registry::{SamplingInterval, Site};
use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct ExportResult {
    pub path: PathBuf,
    pub records: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub target: String,
    pub reason: String,
}

/// What a batch run did, item by item
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    #[serde(skip)]
    kind: BatchKind,
    pub succeeded: Vec<String>,
    pub failed: Vec<BatchFailure>,
}

impl BatchSummary {
    pub fn new(kind: BatchKind) -> Self {
        Self {
            kind,
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn kind(&self) -> BatchKind {
        self.kind
    }

    fn success(&mut self, target: String) {
        BatchMetrics::record_item(self.kind, "success");
        self.succeeded.push(target);
    }

    fn failure(&mut self, target: String, err: &ScraperError) {
        BatchMetrics::record_item(self.kind, "failure");
        error!("{} failed: {}", target, err);
        self.failed.push(BatchFailure {
            target,
            reason: err.to_string(),
        });
    }
}

/// Run the pipeline for one date and write `<data_root>/jma_csv/<stem>.csv`.
pub fn export_date(
    pipeline: &Pipeline,
    site: &Site,
    date: NaiveDate,
    interval: SamplingInterval,
    data_root: &Path,
) -> Result<ExportResult> {
    let records = pipeline.run(site, date, interval)?;
    let path = DestinationName::new(date, &site.en_name, interval).local_path(data_root);
    write_csv(&records, &path)?;
    pipeline.record(AuditEvent::LocalWriteSucceeded {
        path: path.display().to_string(),
    })?;
    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(ExportResult {
        path,
        records: records.len(),
    })
}

/// Export every date in `start..=end`, newest first, pausing `delay` between dates.
///
/// A failing date is logged and skipped; the run carries on with the next one.
pub fn backfill_range(
    pipeline: &Pipeline,
    site: &Site,
    interval: SamplingInterval,
    start: NaiveDate,
    end: NaiveDate,
    data_root: &Path,
    delay: Duration,
) -> Result<BatchSummary> {
    if start > end {
        return Err(ScraperError::Config(format!(
            "start date {start} is after end date {end}"
        )));
    }
    info!(
        "Backfilling {} {} from {} back to {}",
        site.en_name, interval, end, start
    );

    let mut summary = BatchSummary::new(BatchKind::Dates);
    let mut date = end;
    loop {
        match export_date(pipeline, site, date, interval, data_root) {
            Ok(_) => summary.success(date.to_string()),
            Err(e) => summary.failure(date.to_string(), &e),
        }
        match date.pred_opt() {
            Some(previous) if previous >= start => date = previous,
            _ => break,
        }
        thread::sleep(delay);
    }
    info!(
        "Backfill finished: {} succeeded, {} failed",
        summary.succeeded.len(),
        summary.failed.len()
    );
    Ok(summary)
}

/// Re-run the export for addresses whose fetch failed earlier.
///
/// The site comes from the region/station codes and the interval from the page named in
/// the address.
pub fn retry_failed(
    pipeline: &Pipeline,
    addresses: &[String],
    data_root: &Path,
    delay: Duration,
) -> BatchSummary {
    let mut summary = BatchSummary::new(BatchKind::Dates);
    for (i, address) in addresses.iter().enumerate() {
        if i > 0 {
            thread::sleep(delay);
        }
        match retry_one(pipeline, address, data_root) {
            Ok(_) => summary.success(address.clone()),
            Err(e) => summary.failure(address.clone(), &e),
        }
    }
    summary
}

fn retry_one(pipeline: &Pipeline, address: &str, data_root: &Path) -> Result<ExportResult> {
    let (region_code, station_code) = parse_site_codes(address)?;
    let site = pipeline
        .registry()
        .site_by_codes(region_code, station_code)
        .ok_or_else(|| ScraperError::UnknownSite(format!("{region_code}/{station_code}")))?;
    let (interval, _) = parse_page(address)?;
    let date = parse_date(address)?;
    export_date(pipeline, site, date, interval, data_root)
}

/// Put one file in the object store and record the outcome.
pub fn upload_file(
    audit: &dyn AuditSink,
    store: &dyn ObjectStore,
    file: &Path,
    key: &str,
) -> Result<String> {
    match store.put(file, key) {
        Ok(url) => {
            info!("Uploaded {} to {}", file.display(), url);
            audit.append(&AuditRecord::new(AuditEvent::RemoteUploadSucceeded {
                url: url.clone(),
            }))?;
            Ok(url)
        }
        Err(e) => {
            let url = store.location(key);
            warn!("Upload of {} to {} failed: {}", file.display(), url, e);
            if let Err(audit_err) = audit.append(&AuditRecord::new(AuditEvent::RemoteUploadFailed {
                url,
                reason: e.to_string(),
            })) {
                warn!("Failed to record upload failure: {}", audit_err);
            }
            Err(e)
        }
    }
}

/// Upload every exported CSV under `<data_root>/jma_csv`, continuing past failures.
pub fn upload_exports(
    audit: &dyn AuditSink,
    store: &dyn ObjectStore,
    data_root: &Path,
) -> Result<BatchSummary> {
    let csv_dir = data_root.join(CSV_DIR);
    let mut files: Vec<PathBuf> = fs::read_dir(&csv_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    files.sort();

    let mut summary = BatchSummary::new(BatchKind::Uploads);
    for file in files {
        let Some(file_name) = file.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let key = remote_key(data_root, &file_name);
        match upload_file(audit, store, &file, &key) {
            Ok(_) => summary.success(key),
            Err(e) => summary.failure(key, &e),
        }
    }
    Ok(summary)
}
