use crate::address::QueryAddress;
use crate::app::ports::{AuditSink, PageFetcher};
use crate::audit::{AuditEvent, AuditRecord};
use crate::error::{Result, ScraperError};
use crate::metrics::PipelineMetrics;
use crate::normalize::normalize;
use crate::parser::extract_table;
use crate::registry::{Registry, SamplingInterval, Site};
use crate::types::{FetchOutcome, NormalizedRecordSet};
use chrono::NaiveDate;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Fetch, extract and normalize one page.
///
/// Runs strictly in sequence with no retry. Every fetch outcome is appended to the audit
/// sink; a page that was fetched but could not be turned into records is recorded as
/// `ExtractFailed` before the error is returned.
pub struct Pipeline {
    registry: Registry,
    fetcher: Box<dyn PageFetcher>,
    audit: Box<dyn AuditSink>,
    timeout: Duration,
}

impl Pipeline {
    pub fn new(
        registry: Registry,
        fetcher: Box<dyn PageFetcher>,
        audit: Box<dyn AuditSink>,
        timeout: Duration,
    ) -> Self {
        Self {
            registry,
            fetcher,
            audit,
            timeout,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Append an event, surfacing a sink failure to the caller.
    pub fn record(&self, event: AuditEvent) -> Result<()> {
        self.audit.append(&AuditRecord::new(event))
    }

    /// Append an event on a path that is already failing; a sink error is only logged.
    pub fn record_best_effort(&self, event: AuditEvent) {
        let kind = event.kind();
        if let Err(e) = self.record(event) {
            warn!("Failed to record {} audit event: {}", kind, e);
        }
    }

    #[instrument(skip(self, site), fields(site = %site.en_name))]
    pub fn run(
        &self,
        site: &Site,
        date: NaiveDate,
        interval: SamplingInterval,
    ) -> Result<NormalizedRecordSet> {
        let address = QueryAddress::for_site(site, date, interval)?;
        let url = address.url();
        let schema = self.registry.schema(site.schema_class, interval)?;

        let outcome = {
            let _timing = PipelineMetrics::time_fetch();
            FetchOutcome::from(self.fetcher.fetch(&url, self.timeout))
        };

        let raw_text = match outcome {
            FetchOutcome::Success { raw_text } => {
                PipelineMetrics::record_fetch("success");
                self.record(AuditEvent::FetchSucceeded {
                    address: url.clone(),
                    raw_text: raw_text.clone(),
                })?;
                raw_text
            }
            FetchOutcome::Failure { reason } => {
                PipelineMetrics::record_fetch("failure");
                warn!("Fetch failed for {}: {}", url, reason);
                self.record_best_effort(AuditEvent::FetchFailed {
                    address: url,
                    reason: reason.clone(),
                });
                return Err(ScraperError::FetchFailed(reason));
            }
        };
        debug!("Fetched {} bytes from {}", raw_text.len(), url);

        let normalized = extract_table(&raw_text)
            .and_then(|table| normalize(table, schema))
            .and_then(NormalizedRecordSet::try_from);
        match normalized {
            Ok(records) => {
                PipelineMetrics::record_records(records.len());
                info!("Normalized {} records from {}", records.len(), url);
                Ok(records)
            }
            Err(e) => {
                warn!("Extraction failed for {}: {}", url, e);
                self.record_best_effort(AuditEvent::ExtractFailed {
                    address: url,
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }
}
