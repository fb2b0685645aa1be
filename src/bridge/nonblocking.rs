//! Non-blocking adapter: `fetch_next` runs on the tokio blocking pool.

use crate::endpoint::EndpointError;
use crate::error::{Result, RuntimeError};
use crate::invocation::{project, NextInvocation};
use crate::runtime::ClientSlot;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::debug;

/// Future-returning adapter over the runtime client.
///
/// Only `fetch_next` is offloaded; reports are short posts and stay
/// synchronous.
#[derive(Clone)]
pub struct AsyncBridge {
    slot: Arc<ClientSlot>,
    handle: Handle,
}

impl AsyncBridge {
    pub(crate) fn new(slot: Arc<ClientSlot>, handle: Handle) -> Self {
        Self { slot, handle }
    }

    /// Start fetching the next invocation.
    ///
    /// Returns at once. Exactly one blocking-pool task performs the fetch and
    /// settles the returned future. There is no cancellation: dropping the
    /// future leaves the fetch running and discards its result.
    pub fn fetch_next(&self) -> PendingInvocation {
        let (tx, rx) = oneshot::channel();

        match self.slot.client() {
            Ok(client) => {
                debug!("Dispatching fetch_next to the blocking pool");
                self.handle.spawn_blocking(move || {
                    let result = client.fetch_next().map(project);
                    let _ = tx.send(result);
                });
            }
            Err(err) => {
                let _ = tx.send(Err(err));
            }
        }

        PendingInvocation { rx }
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

/// Single-assignment result of [`AsyncBridge::fetch_next`].
#[must_use = "the fetched invocation is lost if the future is dropped"]
pub struct PendingInvocation {
    rx: oneshot::Receiver<Result<NextInvocation>>,
}

impl Future for PendingInvocation {
    type Output = Result<NextInvocation>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| {
            received.unwrap_or_else(|_| {
                Err(RuntimeError::EndpointUnavailable(EndpointError::Transport(
                    "background fetch ended without a result".to_string(),
                )))
            })
        })
    }
}
