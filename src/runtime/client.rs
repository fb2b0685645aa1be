//! Runtime client: the protocol driver over one runtime endpoint.

use crate::endpoint::{
    FailureReport, HttpEndpoint, InitErrorReport, RuntimeEndpoint, SuccessReport,
};
use crate::error::{Result, RuntimeError};
use crate::invocation::InvocationRecord;
use crate::runtime::RuntimeConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

/// Drives the fetch/report protocol against one [`RuntimeEndpoint`].
///
/// Holds no per-invocation state. Pairing each fetched request id with
/// exactly one report is the caller's job.
pub struct RuntimeClient {
    endpoint: Arc<dyn RuntimeEndpoint>,
    user_agent: String,
    fetch_in_flight: AtomicBool,
}

impl RuntimeClient {
    /// Create a client that talks HTTP to `config.runtime_api`.
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        if config.runtime_api.trim().is_empty() {
            return Err(RuntimeError::configuration("runtime API address is not set"));
        }
        let endpoint = HttpEndpoint::new(&config.runtime_api, &config.user_agent)?;
        info!(
            "Runtime client ready for {} as '{}'",
            config.runtime_api, config.user_agent
        );
        Ok(Self::with_endpoint(endpoint, config.user_agent.clone()))
    }

    /// Create a client over an existing endpoint.
    pub fn with_endpoint(
        endpoint: impl RuntimeEndpoint + 'static,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: Arc::new(endpoint),
            user_agent: user_agent.into(),
            fetch_in_flight: AtomicBool::new(false),
        }
    }

    /// The user agent this client identifies as.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Block until the next invocation is available.
    ///
    /// A second call while one is still waiting fails with
    /// [`RuntimeError::ProtocolViolation`].
    pub fn fetch_next(&self) -> Result<InvocationRecord> {
        let _guard = FetchGuard::acquire(&self.fetch_in_flight)?;

        let record = self.endpoint.fetch_next().map_err(|e| {
            warn!("Failed to get next invocation: {}", e);
            RuntimeError::from(e)
        })?;
        debug!("Fetched invocation [{}]", record.request_id);
        Ok(record)
    }

    /// Post a success outcome for `request_id`.
    pub fn report_success(&self, request_id: &str, body: &str) -> Result<()> {
        debug!("Reporting success [{}]", request_id);
        self.endpoint
            .report_success(&SuccessReport::new(request_id, body))
            .map_err(|e| {
                warn!("Failed to report success [{}]: {}", request_id, e);
                RuntimeError::from(e)
            })
    }

    /// Post a failure outcome for `request_id`, forwarding `trace_context` unchanged.
    pub fn report_failure(&self, request_id: &str, body: &str, trace_context: &str) -> Result<()> {
        debug!("Reporting failure [{}]", request_id);
        self.endpoint
            .report_failure(&FailureReport::new(request_id, body, trace_context))
            .map_err(|e| {
                warn!("Failed to report failure [{}]: {}", request_id, e);
                RuntimeError::from(e)
            })
    }

    /// Post a failure that happened before the first invocation.
    pub fn report_init_error(&self, body: &str, error_type: &str) -> Result<()> {
        self.endpoint
            .report_init_error(&InitErrorReport {
                body: body.to_string(),
                error_type: error_type.to_string(),
            })
            .map_err(RuntimeError::from)
    }
}

struct FetchGuard<'a>(&'a AtomicBool);

impl<'a> FetchGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| {
                RuntimeError::ProtocolViolation(
                    "fetch_next called while another fetch is in flight".to_string(),
                )
            })?;
        Ok(Self(flag))
    }
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

type ClientFactory = Box<dyn Fn(&str) -> Result<RuntimeClient> + Send + Sync>;

/// Holds the single runtime client of a hosting process.
///
/// The client is created by an explicit [`ClientSlot::initialize`] call and
/// lives as long as the slot. A second initialization is rejected and leaves
/// the first client in place.
pub struct ClientSlot {
    factory: ClientFactory,
    client: OnceLock<Arc<RuntimeClient>>,
}

impl ClientSlot {
    /// Create a slot whose client talks HTTP according to `config`.
    ///
    /// The user agent passed to `initialize` replaces `config.user_agent`.
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_factory(move |user_agent| {
            RuntimeClient::new(&config.clone().user_agent(user_agent))
        })
    }

    /// Create a slot whose client is built by `factory` from the user agent.
    pub fn with_factory(
        factory: impl Fn(&str) -> Result<RuntimeClient> + Send + Sync + 'static,
    ) -> Self {
        Self {
            factory: Box::new(factory),
            client: OnceLock::new(),
        }
    }

    /// Create a slot over `endpoint`, for tests and embedded hosts.
    pub fn with_endpoint(endpoint: impl RuntimeEndpoint + Clone + 'static) -> Self {
        Self::with_factory(move |user_agent| {
            Ok(RuntimeClient::with_endpoint(endpoint.clone(), user_agent))
        })
    }

    /// Create the client.
    pub fn initialize(&self, user_agent: &str) -> Result<()> {
        if self.client.get().is_some() {
            return Err(RuntimeError::AlreadyInitialized);
        }
        let client = (self.factory)(user_agent)?;
        self.client
            .set(Arc::new(client))
            .map_err(|_| RuntimeError::AlreadyInitialized)
    }

    /// The client, or [`RuntimeError::NotInitialized`].
    pub fn client(&self) -> Result<Arc<RuntimeClient>> {
        self.client.get().cloned().ok_or(RuntimeError::NotInitialized)
    }

    /// Whether `initialize` has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.client.get().is_some()
    }
}
