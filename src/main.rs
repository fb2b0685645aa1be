//! rapid-bridge - Example runtime host
//!
//! Runs an echo function against the Runtime API named by
//! `AWS_LAMBDA_RUNTIME_API`.

use rapid_bridge::prelude::*;
use rapid_bridge::runtime::default_user_agent;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

/// Echoes the event back together with some invocation metadata.
struct EchoFunction;

#[async_trait]
impl RuntimeFunction for EchoFunction {
    async fn on_init(&mut self) -> Result<(), FunctionError> {
        tracing::info!("Loading function: {}", self.name());
        Ok(())
    }

    async fn invoke(&self, event: Value, ctx: &InvocationContext) -> Result<Value, FunctionError> {
        if event.get("fail").and_then(Value::as_bool) == Some(true) {
            return Err(FunctionError::new("EchoError", "failure requested by event"));
        }

        Ok(json!({
            "event": event,
            "request_id": ctx.request_id,
            "remaining_ms": ctx.remaining_time().as_millis() as u64,
            "function_name": ctx.env.function_name,
        }))
    }

    fn name(&self) -> &str {
        "echo"
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = RuntimeConfig::from_env();
    tracing::info!("Starting runtime host against '{}'", config.runtime_api);

    let bridge = Bridge::new(config);
    bridge.initialize(&[json!(default_user_agent())])?;

    let runtime = Runtime::new(&bridge, Box::new(EchoFunction))?;
    runtime.run().await?;
    Ok(())
}
