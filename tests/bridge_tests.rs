//! Bridge behaviour against an in-memory runtime endpoint.

use rapid_bridge::endpoint::{EndpointError, RecordedReport, StubEndpoint};
use rapid_bridge::invocation::headers;
use rapid_bridge::prelude::*;
use serde_json::json;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

const ARN: &str = "arn:aws:lambda:us-east-1:123456789012:function:echo";

fn bridge_with(stub: &StubEndpoint) -> Bridge {
    Bridge::with_slot(ClientSlot::with_endpoint(stub.clone()))
}

fn initialized(stub: &StubEndpoint) -> Bridge {
    let bridge = bridge_with(stub);
    bridge.initialize(&[json!("test-host/1.0")]).unwrap();
    bridge
}

fn scenario_record(deadline: SystemTime) -> InvocationRecord {
    InvocationRecord::new("abc-123", "{\"x\":1}", deadline).invoked_function_arn(ARN)
}

fn millis_since_epoch(time: SystemTime) -> String {
    time.duration_since(UNIX_EPOCH).unwrap().as_millis().to_string()
}

#[test]
fn test_blocking_fetch_without_context() {
    let stub = StubEndpoint::new();
    let deadline = SystemTime::now() + Duration::from_millis(3000);
    stub.push_invocation(scenario_record(deadline));
    let bridge = initialized(&stub);

    let next = bridge.blocking().fetch_next().unwrap();

    assert_eq!(next.body_json, "{\"x\":1}");
    assert_eq!(next.headers.len(), 4);
    assert_eq!(next.headers[headers::DEADLINE_MS], millis_since_epoch(deadline));
    assert_eq!(next.headers[headers::REQUEST_ID], "abc-123");
    assert_eq!(next.headers[headers::TRACE_ID], "");
    assert_eq!(next.headers[headers::INVOKED_FUNCTION_ARN], ARN);
    assert!(!next.headers.contains_key(headers::CLIENT_CONTEXT));
    assert!(!next.headers.contains_key(headers::COGNITO_IDENTITY));
}

#[test]
fn test_blocking_fetch_with_client_context() {
    let stub = StubEndpoint::new();
    stub.push_invocation(
        scenario_record(SystemTime::now() + Duration::from_millis(3000)).client_context("{\"a\":1}"),
    );
    let bridge = initialized(&stub);

    let next = bridge.blocking().fetch_next().unwrap();

    assert_eq!(next.headers.len(), 5);
    assert_eq!(next.headers[headers::CLIENT_CONTEXT], "{\"a\":1}");
    assert!(!next.headers.contains_key(headers::COGNITO_IDENTITY));
}

#[test]
fn test_report_success_posts_json_body_verbatim() {
    let stub = StubEndpoint::new();
    let bridge = initialized(&stub);

    bridge
        .blocking()
        .report_success(&[json!("abc-123"), json!("{\"result\":true}")])
        .unwrap();

    match stub.last_report() {
        Some(RecordedReport::Success(report)) => {
            assert_eq!(report.request_id, "abc-123");
            assert_eq!(report.body, "{\"result\":true}");
            assert_eq!(report.content_type, "application/json");
        }
        other => panic!("unexpected report: {:?}", other),
    }
}

#[test]
fn test_report_before_initialize_is_rejected() {
    let stub = StubEndpoint::new();
    let bridge = bridge_with(&stub);

    let err = bridge
        .blocking()
        .report_failure(&[json!("abc-123"), json!("{}"), json!("")])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotInitialized);

    let err = bridge.blocking().fetch_next().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotInitialized);
    assert_eq!(stub.calls(), 0);
}

#[test]
fn test_second_initialize_keeps_first_client() {
    let stub = StubEndpoint::new();
    let bridge = initialized(&stub);

    let err = bridge.initialize(&[json!("other-host/2.0")]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyInitialized);
    assert_eq!(bridge.client().unwrap().user_agent(), "test-host/1.0");
}

#[test]
fn test_report_arguments_are_checked_before_any_call() {
    let stub = StubEndpoint::new();
    let bridge = initialized(&stub);
    let blocking = bridge.blocking();

    let cases: Vec<Vec<serde_json::Value>> = vec![
        vec![json!("abc-123"), json!(1)],
        vec![json!(null), json!("{}")],
        vec![json!("abc-123")],
    ];
    for args in &cases {
        let err = blocking.report_success(args).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument, "args: {:?}", args);
    }

    let err = blocking
        .report_failure(&[json!("abc-123"), json!("{}"), json!({"trace": 1})])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    let err = blocking.report_failure(&[json!("abc-123"), json!("{}")]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    assert_eq!(stub.calls(), 0);
    assert!(stub.reports().is_empty());
}

#[test]
fn test_failed_report_surfaces_endpoint_unavailable() {
    let stub = StubEndpoint::new();
    stub.fail_reports(EndpointError::Status(500));
    let bridge = initialized(&stub);

    let err = bridge
        .blocking()
        .report_success(&[json!("abc-123"), json!("{}")])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EndpointUnavailable);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_async_fetch_returns_before_network_completes() {
    let latency = Duration::from_millis(300);
    let stub = StubEndpoint::new().with_latency(latency);
    stub.push_invocation(scenario_record(SystemTime::now() + Duration::from_secs(3)));
    let bridge = initialized(&stub);
    let nonblocking = bridge.nonblocking().unwrap();

    let start = Instant::now();
    let mut pending = nonblocking.fetch_next();
    assert!(start.elapsed() < Duration::from_millis(200));

    let early = tokio::time::timeout(Duration::from_millis(50), &mut pending).await;
    assert!(early.is_err(), "resolved before the endpoint answered");

    let next = pending.await.unwrap();
    assert!(start.elapsed() >= latency);
    assert_eq!(next.request_id(), Some("abc-123"));
    assert_eq!(next.body_json, "{\"x\":1}");
}

#[tokio::test]
async fn test_async_fetch_rejects_with_stable_kind() {
    let stub = StubEndpoint::new();
    stub.push_failure(EndpointError::MalformedResponse("missing request id".to_string()));
    let bridge = initialized(&stub);

    let err = bridge.nonblocking().unwrap().fetch_next().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EndpointUnavailable);
    assert_eq!(err.kind().as_str(), "EndpointUnavailable");
}

#[tokio::test]
async fn test_async_fetch_before_initialize_rejects() {
    let stub = StubEndpoint::new();
    let bridge = bridge_with(&stub);

    let err = bridge.nonblocking().unwrap().fetch_next().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotInitialized);
    assert_eq!(stub.calls(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_async_concurrent_fetch_is_protocol_violation() {
    let stub = StubEndpoint::new().with_latency(Duration::from_millis(300));
    stub.push_invocation(scenario_record(SystemTime::now() + Duration::from_secs(3)));
    let bridge = initialized(&stub);
    let nonblocking = bridge.nonblocking().unwrap();

    let first = nonblocking.fetch_next();
    let second = nonblocking.fetch_next();
    let (first, second) = tokio::join!(first, second);

    let results = [first, second];
    let ok = results.iter().filter(|r| r.is_ok()).count();
    let violations = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.kind() == ErrorKind::ProtocolViolation))
        .count();
    assert_eq!(ok, 1);
    assert_eq!(violations, 1);
}

#[tokio::test]
async fn test_async_reports_stay_synchronous() {
    let stub = StubEndpoint::new();
    stub.push_invocation(scenario_record(SystemTime::now() + Duration::from_secs(3)));
    let bridge = initialized(&stub);
    let nonblocking = bridge.nonblocking().unwrap();

    let next = nonblocking.fetch_next().await.unwrap();
    let request_id = next.request_id().unwrap().to_string();
    nonblocking
        .report_failure(&[json!(request_id), json!("{\"errorType\":\"E\"}"), json!("\t{}")])
        .unwrap();

    assert_eq!(
        stub.last_report(),
        Some(RecordedReport::Failure(
            rapid_bridge::endpoint::FailureReport::new("abc-123", "{\"errorType\":\"E\"}", "\t{}")
        ))
    );
}
