//! Calling-convention adapters over the runtime client.
//!
//! Entry points take the host's untyped argument values (`serde_json::Value`)
//! and check their shape before any network call. Both adapters share one
//! [`ClientSlot`] and the same header projection.
//!
//! ```text
//!  caller ──► BlockingBridge ─┐
//!                             ├─► RuntimeClient ──► RuntimeEndpoint
//!  caller ──► AsyncBridge ────┘        │
//!                 ▲                    ▼
//!                 └──── project(InvocationRecord) ◄──┘
//! ```

mod args;
mod blocking;
mod nonblocking;

pub use blocking::BlockingBridge;
pub use nonblocking::{AsyncBridge, PendingInvocation};

use crate::error::{Result, RuntimeError};
use crate::runtime::{ClientSlot, RuntimeClient, RuntimeConfig};
use args::string_args;
use serde_json::Value;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::info;

/// Entry point for hosts: owns the client slot and hands out both adapters.
#[derive(Clone)]
pub struct Bridge {
    slot: Arc<ClientSlot>,
}

impl Bridge {
    /// Create a bridge whose client will talk HTTP according to `config`.
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_slot(ClientSlot::new(config))
    }

    /// Create a bridge over an existing slot.
    pub fn with_slot(slot: ClientSlot) -> Self {
        Self {
            slot: Arc::new(slot),
        }
    }

    /// Initialize the client. Expects one string argument, the user agent.
    pub fn initialize(&self, args: &[Value]) -> Result<()> {
        let [user_agent] = string_args::<1>(args)?;
        self.slot.initialize(user_agent)?;
        info!("Runtime client initialized as '{}'", user_agent);
        Ok(())
    }

    /// The initialized client.
    pub fn client(&self) -> Result<Arc<RuntimeClient>> {
        self.slot.client()
    }

    /// The blocking adapter.
    pub fn blocking(&self) -> BlockingBridge {
        BlockingBridge::new(self.slot.clone())
    }

    /// The non-blocking adapter, bound to the current tokio runtime.
    pub fn nonblocking(&self) -> Result<AsyncBridge> {
        let handle = Handle::try_current().map_err(|e| {
            RuntimeError::configuration(format!("no tokio runtime for the async bridge: {}", e))
        })?;
        Ok(AsyncBridge::new(self.slot.clone(), handle))
    }
}

/// `report_success(request_id, body)`, shared by both adapters.
fn report_success(slot: &ClientSlot, args: &[Value]) -> Result<()> {
    let client = slot.client()?;
    let [request_id, body] = string_args::<2>(args)?;
    client.report_success(request_id, body)
}

/// `report_failure(request_id, body, trace_context)`, shared by both adapters.
fn report_failure(slot: &ClientSlot, args: &[Value]) -> Result<()> {
    let client = slot.client()?;
    let [request_id, body, trace_context] = string_args::<3>(args)?;
    client.report_failure(request_id, body, trace_context)
}
