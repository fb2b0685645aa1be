//! Typed invocation context decoded from the projected headers.

use crate::error::{Result, RuntimeError};
use crate::invocation::projection::{headers, NextInvocation};
use crate::invocation::record::deadline_from_ms;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, SystemTime};

/// Function settings supplied by the hosting environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionEnvironment {
    pub function_name: Option<String>,
    pub function_version: Option<String>,
    pub memory_limit_in_mb: Option<String>,
    pub log_group_name: Option<String>,
    pub log_stream_name: Option<String>,
}

impl FunctionEnvironment {
    /// Read the function settings from the process environment.
    pub fn from_env() -> Self {
        let var = |key: &str| std::env::var(key).ok();
        Self {
            function_name: var("AWS_LAMBDA_FUNCTION_NAME"),
            function_version: var("AWS_LAMBDA_FUNCTION_VERSION"),
            memory_limit_in_mb: var("AWS_LAMBDA_FUNCTION_MEMORY_SIZE"),
            log_group_name: var("AWS_LAMBDA_LOG_GROUP_NAME"),
            log_stream_name: var("AWS_LAMBDA_LOG_STREAM_NAME"),
        }
    }

    /// Set the function name.
    pub fn function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = Some(name.into());
        self
    }
}

/// Execution context handed to a function for one invocation.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    /// Request ID of this invocation.
    pub request_id: String,
    /// Absolute deadline.
    pub deadline: SystemTime,
    /// Tracing correlation identifier. May be empty.
    pub trace_id: String,
    /// ARN the invoker used.
    pub invoked_function_arn: String,
    /// Parsed client context, if the invoker supplied one.
    pub client_context: Option<Value>,
    /// Parsed identity context, if the invoker supplied one.
    pub identity: Option<Value>,
    /// Function settings from the hosting environment.
    pub env: FunctionEnvironment,
}

impl InvocationContext {
    /// Decode the context from a fetched invocation.
    pub fn from_invocation(next: &NextInvocation, env: &FunctionEnvironment) -> Result<Self> {
        let request_id = next
            .request_id()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| RuntimeError::invalid_argument("invocation id is missing or invalid"))?
            .to_string();

        let deadline_ms = next
            .get_header(headers::DEADLINE_MS)
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or_else(|| RuntimeError::invalid_argument("invocation deadline is missing or invalid"))?;

        let header = |key: &str| next.get_header(key).cloned().unwrap_or_default();

        Ok(Self {
            request_id,
            deadline: deadline_from_ms(deadline_ms),
            trace_id: header(headers::TRACE_ID),
            invoked_function_arn: header(headers::INVOKED_FUNCTION_ARN),
            client_context: parse_json(next.get_header(headers::CLIENT_CONTEXT), "ClientContext")?,
            identity: parse_json(next.get_header(headers::COGNITO_IDENTITY), "CognitoIdentity")?,
            env: env.clone(),
        })
    }

    /// Time left until the deadline, zero once it has passed.
    pub fn remaining_time(&self) -> Duration {
        self.deadline
            .duration_since(SystemTime::now())
            .unwrap_or(Duration::ZERO)
    }
}

fn parse_json(value: Option<&String>, name: &str) -> Result<Option<Value>> {
    match value {
        None => Ok(None),
        Some(raw) if raw.is_empty() => Ok(None),
        Some(raw) => serde_json::from_str(raw)
            .map(Some)
            .map_err(|e| RuntimeError::invalid_argument(format!("Cannot parse {name} as json: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invocation::{project, InvocationRecord};

    fn next_with(record: InvocationRecord) -> NextInvocation {
        project(record)
    }

    #[test]
    fn test_context_from_invocation() {
        let deadline = SystemTime::now() + Duration::from_secs(3);
        let next = next_with(
            InvocationRecord::new("abc-123", "{}", deadline)
                .trace_id("Root=1-5759e988")
                .client_context("{\"custom\":{\"k\":\"v\"}}"),
        );
        let env = FunctionEnvironment::default().function_name("echo");

        let ctx = InvocationContext::from_invocation(&next, &env).unwrap();
        assert_eq!(ctx.request_id, "abc-123");
        assert_eq!(ctx.trace_id, "Root=1-5759e988");
        assert_eq!(ctx.client_context.as_ref().unwrap()["custom"]["k"], "v");
        assert!(ctx.identity.is_none());
        assert_eq!(ctx.env.function_name.as_deref(), Some("echo"));

        let remaining = ctx.remaining_time();
        assert!(remaining <= Duration::from_secs(3));
        assert!(remaining > Duration::from_secs(1));
    }

    #[test]
    fn test_remaining_time_saturates() {
        let next = next_with(InvocationRecord::new("abc", "{}", deadline_from_ms(1)));
        let ctx = InvocationContext::from_invocation(&next, &FunctionEnvironment::default()).unwrap();
        assert_eq!(ctx.remaining_time(), Duration::ZERO);
    }

    #[test]
    fn test_malformed_client_context() {
        let next = next_with(InvocationRecord::new("abc", "{}", deadline_from_ms(1)).client_context("{not json"));
        let err = InvocationContext::from_invocation(&next, &FunctionEnvironment::default()).unwrap_err();
        assert!(err.to_string().contains("ClientContext"));
    }

    #[test]
    fn test_missing_request_id() {
        let mut next = next_with(InvocationRecord::new("abc", "{}", deadline_from_ms(1)));
        next.headers.remove(headers::REQUEST_ID);
        let err = InvocationContext::from_invocation(&next, &FunctionEnvironment::default()).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);
    }
}
