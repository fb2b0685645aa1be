//! User function interface for the runtime loop.

pub mod handler;
mod trace_cause;

pub use handler::{FunctionError, RuntimeFunction};
pub use trace_cause::trace_cause;
