//! In-memory runtime endpoint.
//!
//! Useful for development and testing: invocations are queued up front and
//! every report is recorded for inspection.

use crate::endpoint::{
    EndpointError, FailureReport, InitErrorReport, RuntimeEndpoint, SuccessReport,
};
use crate::invocation::InvocationRecord;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// A report observed by the stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedReport {
    Success(SuccessReport),
    Failure(FailureReport),
    InitError(InitErrorReport),
}

#[derive(Default)]
struct StubState {
    pending: VecDeque<Result<InvocationRecord, EndpointError>>,
    reports: Vec<RecordedReport>,
    report_error: Option<EndpointError>,
}

/// In-memory implementation of [`RuntimeEndpoint`].
///
/// Clones share the same queue and call counters.
#[derive(Clone, Default)]
pub struct StubEndpoint {
    state: Arc<Mutex<StubState>>,
    calls: Arc<AtomicUsize>,
    latency: Option<Duration>,
}

impl StubEndpoint {
    /// Create an empty stub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every `fetch_next` by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queue an invocation for a later `fetch_next`.
    pub fn push_invocation(&self, record: InvocationRecord) {
        self.lock().pending.push_back(Ok(record));
    }

    /// Queue a failed `fetch_next`.
    pub fn push_failure(&self, error: EndpointError) {
        self.lock().pending.push_back(Err(error));
    }

    /// Make every subsequent report fail with `error`.
    pub fn fail_reports(&self, error: EndpointError) {
        self.lock().report_error = Some(error);
    }

    /// Number of endpoint operations performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// All reports observed so far, oldest first.
    pub fn reports(&self) -> Vec<RecordedReport> {
        self.lock().reports.clone()
    }

    /// The most recent report.
    pub fn last_report(&self) -> Option<RecordedReport> {
        self.lock().reports.last().cloned()
    }

    fn lock(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, report: RecordedReport) -> Result<(), EndpointError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.lock();
        if let Some(err) = state.report_error.clone() {
            return Err(err);
        }
        state.reports.push(report);
        Ok(())
    }
}

impl RuntimeEndpoint for StubEndpoint {
    fn fetch_next(&self) -> Result<InvocationRecord, EndpointError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }
        self.lock()
            .pending
            .pop_front()
            .unwrap_or_else(|| Err(EndpointError::Transport("no pending invocation".to_string())))
    }

    fn report_success(&self, report: &SuccessReport) -> Result<(), EndpointError> {
        self.record(RecordedReport::Success(report.clone()))
    }

    fn report_failure(&self, report: &FailureReport) -> Result<(), EndpointError> {
        self.record(RecordedReport::Failure(report.clone()))
    }

    fn report_init_error(&self, report: &InitErrorReport) -> Result<(), EndpointError> {
        self.record(RecordedReport::InitError(report.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    #[test]
    fn test_stub_serves_queued_invocations_in_order() {
        let stub = StubEndpoint::new();
        stub.push_invocation(InvocationRecord::new("a", "{}", SystemTime::UNIX_EPOCH));
        stub.push_invocation(InvocationRecord::new("b", "{}", SystemTime::UNIX_EPOCH));

        assert_eq!(stub.fetch_next().unwrap().request_id, "a");
        assert_eq!(stub.fetch_next().unwrap().request_id, "b");
        assert!(stub.fetch_next().is_err());
        assert_eq!(stub.calls(), 3);
    }

    #[test]
    fn test_stub_records_reports() {
        let stub = StubEndpoint::new();
        let shared = stub.clone();

        stub.report_success(&SuccessReport::new("a", "1")).unwrap();
        assert_eq!(
            shared.last_report(),
            Some(RecordedReport::Success(SuccessReport::new("a", "1")))
        );
    }

    #[test]
    fn test_stub_failing_reports() {
        let stub = StubEndpoint::new();
        stub.fail_reports(EndpointError::Status(500));

        let result = stub.report_failure(&FailureReport::new("a", "{}", ""));
        assert_eq!(result, Err(EndpointError::Status(500)));
        assert!(stub.reports().is_empty());
        assert_eq!(stub.calls(), 1);
    }
}
