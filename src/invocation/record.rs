//! The data carried by one fetched invocation.

use std::time::{Duration, SystemTime};

/// One invocation handed out by the Runtime API.
///
/// Produced by `fetch_next` and consumed immediately; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRecord {
    /// Function input, passed through as opaque text.
    pub payload: String,
    /// Absolute point in time by which an outcome must be reported.
    pub deadline: SystemTime,
    /// Identifier used by the matching report call.
    pub request_id: String,
    /// Tracing correlation identifier. May be empty.
    pub trace_id: String,
    /// Identifier of the invoked function.
    pub invoked_function_arn: String,
    /// Client context blob, empty unless the invoker supplied one.
    pub client_context: String,
    /// Identity context blob, empty unless the invoker supplied one.
    pub cognito_identity: String,
}

impl InvocationRecord {
    /// Create a record with the required fields; optional fields start empty.
    pub fn new(
        request_id: impl Into<String>,
        payload: impl Into<String>,
        deadline: SystemTime,
    ) -> Self {
        Self {
            payload: payload.into(),
            deadline,
            request_id: request_id.into(),
            trace_id: String::new(),
            invoked_function_arn: String::new(),
            client_context: String::new(),
            cognito_identity: String::new(),
        }
    }

    /// Set the trace id.
    pub fn trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = trace_id.into();
        self
    }

    /// Set the invoked function ARN.
    pub fn invoked_function_arn(mut self, arn: impl Into<String>) -> Self {
        self.invoked_function_arn = arn.into();
        self
    }

    /// Set the client context blob.
    pub fn client_context(mut self, client_context: impl Into<String>) -> Self {
        self.client_context = client_context.into();
        self
    }

    /// Set the identity context blob.
    pub fn cognito_identity(mut self, cognito_identity: impl Into<String>) -> Self {
        self.cognito_identity = cognito_identity.into();
        self
    }

    /// Deadline as whole milliseconds since the UNIX epoch, truncated.
    ///
    /// Deadlines before the epoch clamp to zero.
    pub fn deadline_ms(&self) -> u64 {
        self.deadline
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Convert milliseconds since the UNIX epoch into a `SystemTime`.
pub fn deadline_from_ms(ms: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_millis(ms)
}
