//! Runtime function trait and its error type.

use crate::invocation::InvocationContext;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A function driven by the [`Runtime`](crate::runtime::Runtime) loop.
#[async_trait]
pub trait RuntimeFunction: Send + Sync {
    /// Called once before the first invocation is fetched.
    /// A failure here is reported as an initialization error.
    async fn on_init(&mut self) -> Result<(), FunctionError> {
        Ok(())
    }

    /// Handle one invocation. `event` is the parsed payload.
    async fn invoke(&self, event: Value, ctx: &InvocationContext) -> Result<Value, FunctionError>;

    /// Get the function name.
    fn name(&self) -> &str;
}

/// Error raised by a function, reported to the Runtime API as the failure body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionError {
    /// Error category, e.g. `"TypeError"`.
    pub error_type: String,
    /// Human-readable message.
    pub error_message: String,
    /// Stack lines, innermost first.
    pub trace: Vec<String>,
}

impl FunctionError {
    /// Create a new FunctionError.
    pub fn new(error_type: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            error_message: error_message.into(),
            trace: Vec::new(),
        }
    }

    /// Attach stack lines.
    pub fn with_trace(mut self, trace: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.trace = trace.into_iter().map(Into::into).collect();
        self
    }

    /// Serialize to the JSON failure body.
    pub fn to_body(&self) -> String {
        serde_json::json!({
            "errorType": self.error_type,
            "errorMessage": self.error_message,
            "trace": self.trace,
        })
        .to_string()
    }
}

impl std::fmt::Display for FunctionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_type, self.error_message)
    }
}

impl std::error::Error for FunctionError {}

impl From<serde_json::Error> for FunctionError {
    fn from(err: serde_json::Error) -> Self {
        FunctionError::new("Runtime.InvalidPayload", err.to_string())
    }
}
