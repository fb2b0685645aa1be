//! # rapid-bridge - Runtime API invocation lifecycle client
//!
//! rapid-bridge connects a function host process to a Lambda-style Runtime
//! API. The Runtime API hands out one pending invocation at a time; the host
//! fetches it, runs user code and reports a success or failure outcome before
//! fetching the next one.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────┐   ┌──────────────────────────────┐
//! │        BlockingBridge        │   │          AsyncBridge         │
//! │  (caller thread blocks)      │   │ (fetch on the blocking pool) │
//! └──────────────┬───────────────┘   └──────────────┬───────────────┘
//!                └───────────────┬──────────────────┘
//!                                ▼
//!                ┌───────────────────────────────┐
//!                │   ClientSlot / RuntimeClient  │
//!                └───────────────┬───────────────┘
//!                                ▼
//!                ┌───────────────────────────────┐
//!                │ RuntimeEndpoint (HTTP / stub) │
//!                └───────────────────────────────┘
//! ```
//!
//! Fetched invocations are projected into `{ bodyJson, headers }`, where
//! `headers` carries `lambda-runtime-deadline-ms`,
//! `lambda-runtime-aws-request-id`, `lambda-runtime-trace-id`,
//! `lambda-runtime-invoked-function-arn` and, when present,
//! `lambda-runtime-client-context` and `lambda-runtime-cognito-identity`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rapid_bridge::prelude::*;
//! use serde_json::json;
//!
//! # async fn demo() -> Result<(), RuntimeError> {
//! let bridge = Bridge::new(RuntimeConfig::from_env());
//! bridge.initialize(&[json!("my-host/1.0")])?;
//!
//! let nonblocking = bridge.nonblocking()?;
//! let next = nonblocking.fetch_next().await?;
//! let request_id = next.request_id().unwrap_or_default().to_string();
//! nonblocking.report_success(&[json!(request_id), json!(next.body_json)])?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Invocation lifecycle
//!
//! 1. **Fetch** (`fetch_next`): long-poll for the next invocation
//! 2. **Execute**: the host runs user code
//! 3. **Report** (`report_success` / `report_failure`): exactly once per request id
//!
//! [`Runtime`](runtime::Runtime) packages this loop around a
//! [`RuntimeFunction`](function::RuntimeFunction).

pub mod bridge;
pub mod endpoint;
pub mod error;
pub mod function;
pub mod invocation;
pub mod runtime;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::bridge::{AsyncBridge, BlockingBridge, Bridge, PendingInvocation};
    pub use crate::endpoint::{HttpEndpoint, RuntimeEndpoint, StubEndpoint};
    pub use crate::error::{ErrorKind, RuntimeError};
    pub use crate::function::{FunctionError, RuntimeFunction};
    pub use crate::invocation::{InvocationContext, InvocationRecord, NextInvocation};
    pub use crate::runtime::{ClientSlot, Runtime, RuntimeClient, RuntimeConfig};
    pub use async_trait::async_trait;
}

// Re-export for convenience
pub use bridge::{AsyncBridge, BlockingBridge, Bridge};
pub use error::{ErrorKind, RuntimeError};
pub use invocation::{InvocationRecord, NextInvocation};
pub use runtime::{ClientSlot, Runtime, RuntimeClient, RuntimeConfig};
