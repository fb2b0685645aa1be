//! Runtime client configuration.

use serde::{Deserialize, Serialize};

/// Environment variable holding the Runtime API `host:port`.
pub const RUNTIME_API_ENV: &str = "AWS_LAMBDA_RUNTIME_API";

/// Configuration for the runtime client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Runtime API address (`host:port`).
    pub runtime_api: String,
    /// Identifies this runtime to the Runtime API.
    pub user_agent: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            runtime_api: String::new(),
            user_agent: default_user_agent(),
        }
    }
}

impl RuntimeConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config with the address taken from `AWS_LAMBDA_RUNTIME_API`.
    ///
    /// A missing variable leaves the address empty; the client rejects that
    /// at initialization.
    pub fn from_env() -> Self {
        Self::new().runtime_api(std::env::var(RUNTIME_API_ENV).unwrap_or_default())
    }

    /// Set the Runtime API address.
    pub fn runtime_api(mut self, address: impl Into<String>) -> Self {
        self.runtime_api = address.into();
        self
    }

    /// Set the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// `rapid-bridge/<version>`
pub fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
