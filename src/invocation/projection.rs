//! Projection of an invocation record into the caller-visible header mapping.

use crate::invocation::InvocationRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Header keys of the projected mapping.
pub mod headers {
    pub const DEADLINE_MS: &str = "lambda-runtime-deadline-ms";
    pub const REQUEST_ID: &str = "lambda-runtime-aws-request-id";
    pub const TRACE_ID: &str = "lambda-runtime-trace-id";
    pub const INVOKED_FUNCTION_ARN: &str = "lambda-runtime-invoked-function-arn";
    pub const CLIENT_CONTEXT: &str = "lambda-runtime-client-context";
    pub const COGNITO_IDENTITY: &str = "lambda-runtime-cognito-identity";
}

/// Caller-visible result of `fetch_next`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextInvocation {
    /// The invocation payload, unparsed.
    #[serde(rename = "bodyJson")]
    pub body_json: String,
    /// Projected invocation metadata.
    pub headers: HashMap<String, String>,
}

impl NextInvocation {
    /// Get a header value.
    pub fn get_header(&self, key: &str) -> Option<&String> {
        self.headers.get(key)
    }

    /// The request id, if present.
    pub fn request_id(&self) -> Option<&str> {
        self.get_header(headers::REQUEST_ID).map(String::as_str)
    }
}

impl From<InvocationRecord> for NextInvocation {
    fn from(record: InvocationRecord) -> Self {
        project(record)
    }
}

/// Convert a record into the header mapping plus the pass-through payload.
///
/// Context keys are only emitted for non-empty values.
pub fn project(record: InvocationRecord) -> NextInvocation {
    let mut map = HashMap::with_capacity(6);
    map.insert(
        headers::DEADLINE_MS.to_string(),
        record.deadline_ms().to_string(),
    );
    map.insert(headers::REQUEST_ID.to_string(), record.request_id);
    map.insert(headers::TRACE_ID.to_string(), record.trace_id);
    map.insert(
        headers::INVOKED_FUNCTION_ARN.to_string(),
        record.invoked_function_arn,
    );
    if !record.client_context.is_empty() {
        map.insert(headers::CLIENT_CONTEXT.to_string(), record.client_context);
    }
    if !record.cognito_identity.is_empty() {
        map.insert(headers::COGNITO_IDENTITY.to_string(), record.cognito_identity);
    }

    NextInvocation {
        body_json: record.payload,
        headers: map,
    }
}
