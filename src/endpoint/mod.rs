//! Runtime endpoint: the transport that talks to the Runtime API.
//!
//! The [`RuntimeEndpoint`] trait is the seam between the protocol client and
//! the network. [`HttpEndpoint`] speaks the Runtime API over HTTP/1.1;
//! [`StubEndpoint`] keeps everything in memory for development and tests.

mod http;
mod stub;

pub use http::HttpEndpoint;
pub use stub::{RecordedReport, StubEndpoint};

use crate::invocation::InvocationRecord;

/// Content type of every posted outcome.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A success outcome for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessReport {
    pub request_id: String,
    pub body: String,
    pub content_type: String,
}

impl SuccessReport {
    /// Create a JSON success report.
    pub fn new(request_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            body: body.into(),
            content_type: JSON_CONTENT_TYPE.to_string(),
        }
    }
}

/// A failure outcome for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    pub request_id: String,
    pub body: String,
    pub content_type: String,
    /// Forwarded to the endpoint unchanged. Empty means none.
    pub trace_context: String,
}

impl FailureReport {
    /// Create a JSON failure report.
    pub fn new(
        request_id: impl Into<String>,
        body: impl Into<String>,
        trace_context: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            body: body.into(),
            content_type: JSON_CONTENT_TYPE.to_string(),
            trace_context: trace_context.into(),
        }
    }
}

/// A failure that happened before the first invocation could be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitErrorReport {
    pub body: String,
    pub error_type: String,
}

/// Error type for endpoint operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    /// The request could not be built.
    #[error("invalid request: {0}")]
    Request(String),

    /// Connection or I/O failure.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status.
    #[error("unexpected status {0}")]
    Status(u16),

    /// The response could not be decoded.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// The three network operations of the Runtime API, plus init-error posting.
///
/// Calls block the current thread until the round trip completes.
pub trait RuntimeEndpoint: Send + Sync {
    /// Wait for the next pending invocation. May block for a long time.
    fn fetch_next(&self) -> Result<InvocationRecord, EndpointError>;

    /// Post a success outcome.
    fn report_success(&self, report: &SuccessReport) -> Result<(), EndpointError>;

    /// Post a failure outcome.
    fn report_failure(&self, report: &FailureReport) -> Result<(), EndpointError>;

    /// Post an initialization failure.
    fn report_init_error(&self, report: &InitErrorReport) -> Result<(), EndpointError>;
}
