//! Blocking adapter: every call runs on the caller's thread.

use crate::error::Result;
use crate::invocation::{project, NextInvocation};
use crate::runtime::ClientSlot;
use serde_json::Value;
use std::sync::Arc;

/// Direct call-through to the runtime client.
///
/// `fetch_next` blocks the calling thread for the whole long-poll. Use it when
/// the caller has nothing else to schedule in the meantime.
#[derive(Clone)]
pub struct BlockingBridge {
    slot: Arc<ClientSlot>,
}

impl BlockingBridge {
    pub(crate) fn new(slot: Arc<ClientSlot>) -> Self {
        Self { slot }
    }

    /// Wait for the next invocation and project it.
    pub fn fetch_next(&self) -> Result<NextInvocation> {
        let client = self.slot.client()?;
        client.fetch_next().map(project)
    }

    /// Report success. Arguments: `request_id`, `body`.
    pub fn report_success(&self, args: &[Value]) -> Result<()> {
        super::report_success(&self.slot, args)
    }

    /// Report failure. Arguments: `request_id`, `body`, `trace_context`.
    pub fn report_failure(&self, args: &[Value]) -> Result<()> {
        super::report_failure(&self.slot, args)
    }
}
