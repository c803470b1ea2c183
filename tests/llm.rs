use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use report_harness::config::AnthropicConfig;
use report_harness::llm::{AnthropicBackend, CompletionBackend};

#[derive(Clone)]
struct Mock {
    calls: Arc<AtomicUsize>,
    /// Requests answered with `fail_status` before the first success.
    failures: usize,
    fail_status: StatusCode,
}

async fn complete(
    State(mock): State<Mock>,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    let n = mock.calls.fetch_add(1, Ordering::SeqCst);
    if n < mock.failures {
        return (
            mock.fail_status,
            Json(serde_json::json!({ "error": { "type": "overloaded_error" } })),
        );
    }
    let prompt = body["prompt"].as_str().unwrap_or_default();
    assert!(prompt.starts_with("\n\nHuman: "));
    (
        StatusCode::OK,
        Json(serde_json::json!({ "completion": "  시장이 상승세입니다.\n" })),
    )
}

async fn spawn_mock(failures: usize, fail_status: StatusCode) -> (String, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/v1/complete", post(complete))
        .with_state(Mock {
            calls: calls.clone(),
            failures,
            fail_status,
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/v1/complete", addr), calls)
}

fn config(api_url: String, max_retries: u32) -> AnthropicConfig {
    AnthropicConfig {
        api_url,
        max_retries,
        backoff_ms: 10,
        timeout_secs: 5,
        ..AnthropicConfig::default()
    }
}

#[tokio::test]
async fn test_success_is_trimmed() {
    let (url, calls) = spawn_mock(0, StatusCode::SERVICE_UNAVAILABLE).await;
    let backend = AnthropicBackend::new(&config(url, 3), "test-key").unwrap();

    let answer = backend.complete("시장은?").await.unwrap();
    assert_eq!(answer, "시장이 상승세입니다.");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retries_server_errors() {
    let (url, calls) = spawn_mock(2, StatusCode::SERVICE_UNAVAILABLE).await;
    let backend = AnthropicBackend::new(&config(url, 3), "test-key").unwrap();

    let answer = backend.complete("시장은?").await.unwrap();
    assert_eq!(answer, "시장이 상승세입니다.");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retries_rate_limit_until_exhausted() {
    let (url, calls) = spawn_mock(10, StatusCode::TOO_MANY_REQUESTS).await;
    let backend = AnthropicBackend::new(&config(url, 2), "test-key").unwrap();

    let err = backend.complete("시장은?").await.unwrap_err();
    assert!(err.to_string().contains("429"), "{}", err);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let (url, calls) = spawn_mock(10, StatusCode::BAD_REQUEST).await;
    let backend = AnthropicBackend::new(&config(url, 3), "test-key").unwrap();

    let err = backend.complete("시장은?").await.unwrap_err();
    assert!(err.to_string().contains("400"), "{}", err);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
