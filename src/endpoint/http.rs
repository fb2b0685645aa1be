//! Runtime API endpoint over HTTP/1.1.

use crate::endpoint::{
    EndpointError, FailureReport, InitErrorReport, RuntimeEndpoint, SuccessReport,
};
use crate::error::{Result, RuntimeError};
use crate::invocation::{deadline_from_ms, headers, InvocationRecord};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};
use hyper::{Method, Request, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::future::Future;
use std::sync::mpsc;
use tokio::runtime::Runtime;
use tracing::{debug, warn};

const API_VERSION: &str = "2018-06-01";
const ERROR_TYPE_HEADER: &str = "lambda-runtime-function-error-type";
const XRAY_ERROR_CAUSE_HEADER: &str = "lambda-runtime-function-xray-error-cause";
const UNHANDLED_ERROR_TYPE: &str = "Unhandled";

/// Characters left untouched when a request id is placed in a path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// HTTP implementation of [`RuntimeEndpoint`].
///
/// hyper runs on a private runtime with a single long-lived driver thread.
/// Each call hands its request to that thread and blocks the caller until the
/// response arrives, so calls are safe from plain threads, the blocking pool
/// and async tasks alike.
pub struct HttpEndpoint {
    /// `http://{address}/2018-06-01/runtime`
    base: String,
    user_agent: HeaderValue,
    client: Client<HttpConnector, Full<Bytes>>,
    /// Always `Some` until drop.
    runtime: Option<Runtime>,
}

impl HttpEndpoint {
    /// Create an endpoint for `address` (`host:port`).
    pub fn new(address: &str, user_agent: &str) -> Result<Self> {
        if address.trim().is_empty() {
            return Err(RuntimeError::configuration("runtime API address is empty"));
        }

        let base = format!("http://{}/{}/runtime", address, API_VERSION);
        let uri: Uri = base
            .parse()
            .map_err(|e| RuntimeError::configuration(format!("invalid runtime API address '{}': {}", address, e)))?;
        if uri.authority().is_none() {
            return Err(RuntimeError::configuration(format!(
                "invalid runtime API address '{}'",
                address
            )));
        }

        let user_agent = HeaderValue::from_str(user_agent)
            .map_err(|e| RuntimeError::configuration(format!("invalid user agent: {}", e)))?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("rapid-bridge-http")
            .enable_all()
            .build()
            .map_err(|e| RuntimeError::configuration(format!("failed to start HTTP runtime: {}", e)))?;

        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(1)
            .build_http();

        Ok(Self {
            base,
            user_agent,
            client,
            runtime: Some(runtime),
        })
    }

    /// Run `future` on the driver thread and wait for its output.
    fn call<F, T>(&self, future: F) -> Result<T, EndpointError>
    where
        F: Future<Output = Result<T, EndpointError>> + Send + 'static,
        T: Send + 'static,
    {
        let runtime = self
            .runtime
            .as_ref()
            .ok_or_else(|| EndpointError::Transport("HTTP runtime is shut down".to_string()))?;

        // A std channel: the caller may itself be an async worker thread.
        let (tx, rx) = mpsc::sync_channel(1);
        runtime.spawn(async move {
            let _ = tx.send(future.await);
        });
        rx.recv()
            .map_err(|_| EndpointError::Transport("HTTP driver dropped the request".to_string()))?
    }

    fn invocation_url(&self, request_id: &str, outcome: &str) -> String {
        format!(
            "{}/invocation/{}/{}",
            self.base,
            utf8_percent_encode(request_id, PATH_SEGMENT),
            outcome
        )
    }

    fn post(
        &self,
        url: String,
        body: &str,
        content_type: &str,
        extra: &[(&'static str, &str)],
    ) -> Result<(), EndpointError> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(&url)
            .header(USER_AGENT, self.user_agent.clone())
            .header(CONTENT_TYPE, content_type);
        for &(name, value) in extra {
            builder = builder.header(HeaderName::from_static(name), value);
        }
        let request = builder
            .body(Full::new(Bytes::from(body.to_owned())))
            .map_err(|e| EndpointError::Request(e.to_string()))?;

        debug!("POST {} ({} bytes)", url, body.len());

        let client = self.client.clone();
        self.call(async move {
            let response = client
                .request(request)
                .await
                .map_err(|e| EndpointError::Transport(e.to_string()))?;
            let status = response.status();
            // Drain so the connection can be reused.
            let _ = response.into_body().collect().await;
            if !status.is_success() {
                warn!("POST {} returned {}", url, status);
                return Err(EndpointError::Status(status.as_u16()));
            }
            Ok(())
        })
    }
}

impl Drop for HttpEndpoint {
    fn drop(&mut self) {
        // Dropping a runtime blocks, which panics inside async contexts.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl RuntimeEndpoint for HttpEndpoint {
    fn fetch_next(&self) -> Result<InvocationRecord, EndpointError> {
        let url = format!("{}/invocation/next", self.base);
        let request = Request::builder()
            .method(Method::GET)
            .uri(&url)
            .header(USER_AGENT, self.user_agent.clone())
            .body(Full::new(Bytes::new()))
            .map_err(|e| EndpointError::Request(e.to_string()))?;

        debug!("GET {}", url);

        let client = self.client.clone();
        self.call(async move {
            let response = client
                .request(request)
                .await
                .map_err(|e| EndpointError::Transport(e.to_string()))?;
            let status = response.status();
            if !status.is_success() {
                warn!("GET {} returned {}", url, status);
                return Err(EndpointError::Status(status.as_u16()));
            }
            let header_map = response.headers().clone();
            let body = response
                .into_body()
                .collect()
                .await
                .map_err(|e| EndpointError::Transport(e.to_string()))?
                .to_bytes();
            decode_invocation(&header_map, body)
        })
    }

    fn report_success(&self, report: &SuccessReport) -> Result<(), EndpointError> {
        let url = self.invocation_url(&report.request_id, "response");
        self.post(url, &report.body, &report.content_type, &[])
    }

    fn report_failure(&self, report: &FailureReport) -> Result<(), EndpointError> {
        let url = self.invocation_url(&report.request_id, "error");
        let mut extra = vec![(ERROR_TYPE_HEADER, UNHANDLED_ERROR_TYPE)];
        if !report.trace_context.is_empty() {
            extra.push((XRAY_ERROR_CAUSE_HEADER, report.trace_context.as_str()));
        }
        self.post(url, &report.body, &report.content_type, &extra)
    }

    fn report_init_error(&self, report: &InitErrorReport) -> Result<(), EndpointError> {
        let url = format!("{}/init/error", self.base);
        self.post(
            url,
            &report.body,
            super::JSON_CONTENT_TYPE,
            &[(ERROR_TYPE_HEADER, report.error_type.as_str())],
        )
    }
}

/// Build an invocation record from a `next` response.
fn decode_invocation(map: &HeaderMap, body: Bytes) -> Result<InvocationRecord, EndpointError> {
    let text = |name: &str| -> Result<Option<String>, EndpointError> {
        match map.get(name) {
            None => Ok(None),
            // Context blobs may carry UTF-8 beyond visible ASCII.
            Some(v) => std::str::from_utf8(v.as_bytes())
                .map(|s| Some(s.to_string()))
                .map_err(|_| EndpointError::MalformedResponse(format!("header {} is not valid UTF-8", name))),
        }
    };

    let request_id = text(headers::REQUEST_ID)?
        .filter(|id| !id.is_empty())
        .ok_or_else(|| EndpointError::MalformedResponse("missing request id".to_string()))?;
    let deadline_ms = text(headers::DEADLINE_MS)?
        .and_then(|v| v.trim().parse::<u64>().ok())
        .ok_or_else(|| EndpointError::MalformedResponse("missing or invalid deadline".to_string()))?;
    let payload = String::from_utf8(body.to_vec())
        .map_err(|_| EndpointError::MalformedResponse("payload is not valid UTF-8".to_string()))?;

    Ok(
        InvocationRecord::new(request_id, payload, deadline_from_ms(deadline_ms))
            .trace_id(text(headers::TRACE_ID)?.unwrap_or_default())
            .invoked_function_arn(text(headers::INVOKED_FUNCTION_ARN)?.unwrap_or_default())
            .client_context(text(headers::CLIENT_CONTEXT)?.unwrap_or_default())
            .cognito_identity(text(headers::COGNITO_IDENTITY)?.unwrap_or_default()),
    )
}
