//! Collecting error sink.

use cascade_core::{FetchError, LevelKey};
use cascade_resolver::{ErrorSink, RetryHandle};
use parking_lot::Mutex;
use std::sync::Arc;

/// One surfaced fetch failure.
#[derive(Clone, Debug)]
pub struct ReportedError {
    /// Key of the level that failed.
    pub level: LevelKey,
    /// Display name handed to the sink.
    pub display_name: String,
    /// The failure itself.
    pub error: FetchError,
}

/// An [`ErrorSink`] that records every report and keeps the retry
/// handles so tests can replay failed fetches on demand.
#[derive(Default)]
pub struct CollectingErrorSink {
    reports: Mutex<Vec<ReportedError>>,
    retries: Mutex<Vec<RetryHandle>>,
}

impl CollectingErrorSink {
    /// Create an empty sink.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// All reports so far, in order.
    pub fn reports(&self) -> Vec<ReportedError> {
        self.reports.lock().clone()
    }

    /// Number of reports so far.
    pub fn report_count(&self) -> usize {
        self.reports.lock().len()
    }

    /// The retry handle from the most recent report.
    pub fn last_retry(&self) -> Option<RetryHandle> {
        self.retries.lock().last().cloned()
    }
}

impl ErrorSink for CollectingErrorSink {
    fn fetch_failed(&self, level: &LevelKey, display_name: &str, error: &FetchError, retry: RetryHandle) {
        self.reports.lock().push(ReportedError {
            level: level.clone(),
            display_name: display_name.to_string(),
            error: error.clone(),
        });
        self.retries.lock().push(retry);
    }
}
