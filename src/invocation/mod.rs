//! Invocation data: the fetched record, its header projection and the decoded context.

mod context;
mod projection;
mod record;

pub use context::{FunctionEnvironment, InvocationContext};
pub use projection::{headers, project, NextInvocation};
pub use record::{deadline_from_ms, InvocationRecord};
