//! Runtime client, its configuration and the invocation loop.

mod client;
mod config;
mod driver;

pub use client::{ClientSlot, RuntimeClient};
pub use config::{default_user_agent, RuntimeConfig, RUNTIME_API_ENV};
pub use driver::Runtime;
