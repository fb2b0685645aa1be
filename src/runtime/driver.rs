//! The fetch → invoke → report loop.

use crate::bridge::{AsyncBridge, Bridge};
use crate::error::Result;
use crate::function::{trace_cause, FunctionError, RuntimeFunction};
use crate::invocation::{headers, FunctionEnvironment, InvocationContext, NextInvocation};
use serde_json::{json, Value};
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Drives one [`RuntimeFunction`] through the invocation lifecycle.
///
/// Invocations are handled strictly one at a time: the next fetch starts only
/// after the previous outcome has been reported.
pub struct Runtime {
    bridge: Bridge,
    nonblocking: AsyncBridge,
    function: Box<dyn RuntimeFunction>,
    env: FunctionEnvironment,
    working_directory: String,
}

impl Runtime {
    /// Create a runtime loop on the current tokio runtime.
    ///
    /// `bridge` must be initialized before [`Runtime::run`] is called.
    pub fn new(bridge: &Bridge, function: Box<dyn RuntimeFunction>) -> Result<Self> {
        let working_directory = std::env::current_dir()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default();
        Ok(Self {
            bridge: bridge.clone(),
            nonblocking: bridge.nonblocking()?,
            function,
            env: FunctionEnvironment::from_env(),
            working_directory,
        })
    }

    /// Replace the function environment.
    pub fn env(mut self, env: FunctionEnvironment) -> Self {
        self.env = env;
        self
    }

    /// Initialize the function and handle invocations until the endpoint fails.
    ///
    /// If initialization fails, the error is posted as an init error and the
    /// loop returns without fetching.
    pub async fn run(mut self) -> Result<()> {
        if let Err(err) = self.function.on_init().await {
            error!("Function '{}' failed to initialize: {}", self.function.name(), err);
            self.bridge
                .client()?
                .report_init_error(&err.to_body(), &err.error_type)?;
            return Ok(());
        }
        info!("Function '{}' initialized", self.function.name());

        loop {
            self.handle_once().await?;
        }
    }

    /// Fetch, invoke and report exactly one invocation.
    ///
    /// Everything after the fetch runs inside an `invocation` span carrying
    /// the request id and trace id, so function logs are tagged with both.
    pub async fn handle_once(&self) -> Result<()> {
        let next = self.nonblocking.fetch_next().await?;
        let request_id = next.request_id().unwrap_or_default().to_string();
        let trace_id = next.get_header(headers::TRACE_ID).cloned().unwrap_or_default();

        let span = info_span!("invocation", request_id = %request_id, trace_id = %trace_id);
        self.dispatch(&next, &request_id).instrument(span).await
    }

    async fn dispatch(&self, next: &NextInvocation, request_id: &str) -> Result<()> {
        let outcome = match InvocationContext::from_invocation(next, &self.env) {
            Ok(ctx) => {
                debug!(
                    "Invoking '{}', {}ms remaining",
                    self.function.name(),
                    ctx.remaining_time().as_millis()
                );
                self.invoke(&next.body_json, &ctx).await
            }
            // Without a request id there is nothing to report against.
            Err(err) if request_id.is_empty() => return Err(err),
            Err(err) => Err(FunctionError::new("Runtime.InvalidContext", err.to_string())),
        };

        match outcome {
            Ok(result) => {
                self.nonblocking
                    .report_success(&[json!(request_id), json!(result.to_string())])?;
                info!("Invocation [{}] succeeded", request_id);
            }
            Err(err) => {
                warn!("Invocation [{}] failed: {}", request_id, err);
                let cause = trace_cause(&err, &self.working_directory);
                self.nonblocking
                    .report_failure(&[json!(request_id), json!(err.to_body()), json!(cause)])?;
            }
        }
        Ok(())
    }

    async fn invoke(&self, body: &str, ctx: &InvocationContext) -> Result<Value, FunctionError> {
        let event: Value = serde_json::from_str(body)?;
        self.function.invoke(event, ctx).await
    }
}
