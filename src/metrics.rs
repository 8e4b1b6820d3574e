//! Metric names and recording helpers.
//!
//! Recording goes through the `metrics` facade; without an installed recorder every
//! call is a no-op.

use std::time::Instant;

pub const FETCH_TOTAL: &str = "jma_fetch_total";
pub const FETCH_DURATION_SECONDS: &str = "jma_fetch_duration_seconds";
pub const RECORDS_TOTAL: &str = "jma_records_total";
pub const BATCH_DATES_TOTAL: &str = "jma_batch_dates_total";
pub const UPLOADS_TOTAL: &str = "jma_uploads_total";

/// Records the elapsed time into a histogram when dropped
pub struct TimingGuard {
    start: Instant,
    histogram_name: &'static str,
}

impl TimingGuard {
    pub fn new(histogram_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            histogram_name,
        }
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        ::metrics::histogram!(self.histogram_name).record(duration);
    }
}

pub struct PipelineMetrics;

impl PipelineMetrics {
    pub fn time_fetch() -> TimingGuard {
        TimingGuard::new(FETCH_DURATION_SECONDS)
    }

    pub fn record_fetch(outcome: &'static str) {
        ::metrics::counter!(FETCH_TOTAL, "outcome" => outcome).increment(1);
    }

    pub fn record_records(count: usize) {
        ::metrics::counter!(RECORDS_TOTAL).increment(count as u64);
    }
}

/// What the items of a batch are; each kind counts under its own metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    /// Observation dates (backfill) or failed addresses (retry)
    Dates,
    /// Exported files sent to an object store
    Uploads,
}

impl BatchKind {
    pub fn counter_name(self) -> &'static str {
        match self {
            BatchKind::Dates => BATCH_DATES_TOTAL,
            BatchKind::Uploads => UPLOADS_TOTAL,
        }
    }
}

pub struct BatchMetrics;

impl BatchMetrics {
    pub fn record_item(kind: BatchKind, outcome: &'static str) {
        ::metrics::counter!(kind.counter_name(), "outcome" => outcome).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::metrics::{
        Counter, CounterFn, Gauge, Histogram, HistogramFn, Key, KeyName, Metadata, Recorder,
        SharedString, Unit,
    };
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    type Counted = Arc<Mutex<Vec<(String, String, u64)>>>;
    type Observed = Arc<Mutex<Vec<(String, f64)>>>;

    /// Keeps every counter increment and histogram sample in order
    #[derive(Default)]
    struct CapturingRecorder {
        counters: Counted,
        histograms: Observed,
    }

    struct CapturedCounter {
        name: String,
        outcome: String,
        sink: Counted,
    }

    impl CounterFn for CapturedCounter {
        fn increment(&self, value: u64) {
            self.sink
                .lock()
                .unwrap()
                .push((self.name.clone(), self.outcome.clone(), value));
        }

        fn absolute(&self, _value: u64) {}
    }

    struct CapturedHistogram {
        name: String,
        sink: Observed,
    }

    impl HistogramFn for CapturedHistogram {
        fn record(&self, value: f64) {
            self.sink.lock().unwrap().push((self.name.clone(), value));
        }
    }

    impl Recorder for CapturingRecorder {
        fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
        fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
        fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

        fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
            let outcome = key
                .labels()
                .find(|label| label.key() == "outcome")
                .map(|label| label.value().to_string())
                .unwrap_or_default();
            Counter::from_arc(Arc::new(CapturedCounter {
                name: key.name().to_string(),
                outcome,
                sink: self.counters.clone(),
            }))
        }

        fn register_gauge(&self, _key: &Key, _metadata: &Metadata<'_>) -> Gauge {
            Gauge::noop()
        }

        fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
            Histogram::from_arc(Arc::new(CapturedHistogram {
                name: key.name().to_string(),
                sink: self.histograms.clone(),
            }))
        }
    }

    #[test]
    fn test_uploads_and_dates_count_separately() {
        let recorder = CapturingRecorder::default();
        ::metrics::with_local_recorder(&recorder, || {
            BatchMetrics::record_item(BatchKind::Dates, "success");
            BatchMetrics::record_item(BatchKind::Uploads, "failure");
            PipelineMetrics::record_fetch("success");
            PipelineMetrics::record_records(3);
        });

        let counters = recorder.counters.lock().unwrap().clone();
        assert_eq!(
            counters,
            [
                ("jma_batch_dates_total".to_string(), "success".to_string(), 1),
                ("jma_uploads_total".to_string(), "failure".to_string(), 1),
                ("jma_fetch_total".to_string(), "success".to_string(), 1),
                ("jma_records_total".to_string(), String::new(), 3),
            ]
        );
    }

    #[test]
    fn test_fetch_timing_is_recorded_on_drop() {
        let recorder = CapturingRecorder::default();
        ::metrics::with_local_recorder(&recorder, || {
            let _timing = PipelineMetrics::time_fetch();
            thread::sleep(Duration::from_millis(5));
        });

        let histograms = recorder.histograms.lock().unwrap().clone();
        assert_eq!(histograms.len(), 1);
        assert_eq!(histograms[0].0, FETCH_DURATION_SECONDS);
        assert!(histograms[0].1 >= 0.005);
    }
}
