//! Client API tests against a mock Rundeck server

use std::time::Duration;

use chrono::{DateTime, Utc};
use joblink_client::{ClientConfig, ClientError, ExecutionHandle, RundeckClient};
use mockito::Matcher;

fn client_for(server: &mockito::Server) -> RundeckClient {
    RundeckClient::new(ClientConfig::new(server.url(), "test-token")).unwrap()
}

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

#[tokio::test]
async fn run_job_posts_form_and_returns_handle() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/20/job/demo-job/executions")
        .match_header("accept", "application/json")
        .match_header("x-rundeck-auth-token", "test-token")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body(Matcher::Exact("argString=-delay+5&asUser=ops".into()))
        .with_body(r#"{"id": 42}"#)
        .create_async()
        .await;

    let config = ClientConfig::new(server.url(), "test-token").with_run_as_user("ops");
    let client = RundeckClient::new(config).unwrap();

    let handle = client.run_job("demo-job", Some("-delay 5")).await.unwrap();

    assert_eq!(handle, ExecutionHandle(42));
    mock.assert_async().await;
}

#[tokio::test]
async fn run_job_omits_blank_argument_string_and_user() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/20/job/demo-job/executions")
        .match_body(Matcher::Exact(String::new()))
        .with_body(r#"{"id": 7}"#)
        .create_async()
        .await;

    // Whitespace-only values count as absent
    let config = ClientConfig::new(server.url(), "test-token").with_run_as_user("   ");
    let client = RundeckClient::new(config).unwrap();

    let handle = client.run_job("demo-job", Some("   ")).await.unwrap();

    assert_eq!(handle, ExecutionHandle(7));
    mock.assert_async().await;
}

#[tokio::test]
async fn run_job_non_2xx_is_an_api_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/20/job/demo-job/executions")
        .with_status(403)
        .with_body("Unauthorized")
        .create_async()
        .await;

    let err = client_for(&server)
        .run_job("demo-job", None)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Api { status: 403, .. }));
}

#[tokio::test]
async fn run_job_missing_id_is_a_protocol_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/20/job/demo-job/executions")
        .with_body(r#"{"status": "accepted"}"#)
        .create_async()
        .await;

    let err = client_for(&server)
        .run_job("demo-job", None)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Protocol(_)));
}

#[tokio::test]
async fn run_job_transport_failure_yields_no_handle() {
    // Nothing listens on port 1; the connection fails outright
    let config = ClientConfig::new("http://127.0.0.1:1", "test-token")
        .with_timeout(Duration::from_secs(2));
    let client = RundeckClient::new(config).unwrap();

    let result = client.run_job("demo-job", None).await;

    assert!(matches!(result, Err(ClientError::Transport(_))));
}

#[tokio::test]
async fn is_complete_reads_the_completed_flag() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/20/execution/42/state")
        .match_header("x-rundeck-auth-token", "test-token")
        .with_body(r#"{"completed": false, "executionState": "RUNNING"}"#)
        .create_async()
        .await;

    let complete = client_for(&server)
        .is_complete(ExecutionHandle(42))
        .await
        .unwrap();

    assert!(!complete);
}

#[tokio::test]
async fn fetch_new_entries_keeps_only_entries_past_the_watermark() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/20/execution/42/output")
        .with_body(
            serde_json::json!({
                "execState": "running",
                "entries": [
                    {"log": "one", "absolute_time": "2024-05-01T00:00:01Z", "level": "NORMAL", "time": "00:00:01"},
                    {"log": "two", "absolute_time": "2024-05-01T00:00:02Z", "level": "WARNING", "time": "00:00:02"},
                    {"log": "three", "absolute_time": "2024-05-01T00:00:03Z", "level": "ERROR", "time": "00:00:03"}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let watermark = ts("2024-05-01T00:00:01Z");

    let (entries, next) = client
        .fetch_new_entries(ExecutionHandle(42), watermark)
        .await
        .unwrap();

    // Strictly greater: the entry at the watermark itself is not re-emitted
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].log, "two");
    assert_eq!(entries[1].log, "three");
    assert_eq!(next, ts("2024-05-01T00:00:03Z"));
}

#[tokio::test]
async fn fetch_new_entries_leaves_the_watermark_when_nothing_is_newer() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/20/execution/42/output")
        .with_body(
            serde_json::json!({
                "execState": "running",
                "entries": [
                    {"log": "one", "absolute_time": "2024-05-01T00:00:01Z", "level": "NORMAL", "time": "00:00:01"}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let watermark = ts("2024-05-01T00:00:05Z");

    let (entries, next) = client
        .fetch_new_entries(ExecutionHandle(42), watermark)
        .await
        .unwrap();

    assert!(entries.is_empty());
    assert_eq!(next, watermark);
}

#[tokio::test]
async fn repeated_fetches_with_advancing_watermark_never_duplicate() {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    let mut server = mockito::Server::new_async().await;
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_in_mock = Arc::clone(&calls);

    // First response has two entries, the second repeats them plus one new one
    server
        .mock("GET", "/api/20/execution/42/output")
        .with_body_from_request(move |_| {
            let body = if calls_in_mock.fetch_add(1, Ordering::SeqCst) == 0 {
                serde_json::json!({
                    "execState": "running",
                    "entries": [
                        {"log": "one", "absolute_time": "2024-05-01T00:00:01Z", "level": "NORMAL", "time": "00:00:01"},
                        {"log": "two", "absolute_time": "2024-05-01T00:00:02Z", "level": "NORMAL", "time": "00:00:02"}
                    ]
                })
            } else {
                serde_json::json!({
                    "execState": "running",
                    "entries": [
                        {"log": "one", "absolute_time": "2024-05-01T00:00:01Z", "level": "NORMAL", "time": "00:00:01"},
                        {"log": "two", "absolute_time": "2024-05-01T00:00:02Z", "level": "NORMAL", "time": "00:00:02"},
                        {"log": "three", "absolute_time": "2024-05-01T00:00:03Z", "level": "NORMAL", "time": "00:00:03"}
                    ]
                })
            };
            body.to_string().into_bytes()
        })
        .expect(2)
        .create_async()
        .await;

    let client = client_for(&server);

    let (first, watermark) = client
        .fetch_new_entries(ExecutionHandle(42), DateTime::<Utc>::UNIX_EPOCH)
        .await
        .unwrap();
    let (second, _) = client
        .fetch_new_entries(ExecutionHandle(42), watermark)
        .await
        .unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].log, "three");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn final_state_passes_remote_vocabulary_through() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/20/execution/42/output")
        .with_body(r#"{"execState": "custom", "entries": []}"#)
        .create_async()
        .await;

    let state = client_for(&server)
        .final_state(ExecutionHandle(42))
        .await
        .unwrap();

    assert_eq!(state, "custom");
}

#[tokio::test]
async fn final_state_missing_field_is_a_protocol_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/20/execution/42/output")
        .with_body(r#"{"entries": []}"#)
        .create_async()
        .await;

    let err = client_for(&server)
        .final_state(ExecutionHandle(42))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Protocol(_)));
}
