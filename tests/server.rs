use anyhow::{bail, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use report_harness::config::Config;
use report_harness::engine;
use report_harness::llm::CompletionBackend;
use report_harness::server::{create_router, AppState};

const REPORT: &str = "오늘 날씨가 좋다\n주식 시장이 상승했다\n고양이가 귀엽다";

/// Returns a fixed answer and records every prompt it sees.
struct Recording {
    answer: String,
    prompts: Mutex<Vec<String>>,
}

impl Recording {
    fn new(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: answer.to_string(),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl CompletionBackend for Recording {
    fn name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.answer.clone())
    }
}

struct Failing;

#[async_trait]
impl CompletionBackend for Failing {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _prompt: &str) -> Result<String> {
        bail!("model unreachable")
    }
}

struct TestApp {
    base_url: String,
    tmp: TempDir,
}

async fn spawn_app(
    document: Option<&str>,
    chat: Arc<dyn CompletionBackend>,
    report: Arc<dyn CompletionBackend>,
) -> TestApp {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let path = tmp.path().join("report.md");
    if let Some(text) = document {
        std::fs::write(&path, text).unwrap();
    }

    let mut config = Config::minimal();
    config.document.path = path;

    let index = Arc::new(engine::create_handle(&config).unwrap());
    if let Some(text) = document {
        let _ = index.init(text);
    }

    let state = AppState::new(config, index, chat, report);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        base_url: format!("http://{}", addr),
        tmp,
    }
}

async fn spawn_default() -> (TestApp, Arc<Recording>, Arc<Recording>) {
    let chat = Recording::new("시장이 상승세입니다.");
    let report = Recording::new("채권 금리 하락\n배당 주식 비중 확대");
    let app = spawn_app(Some(REPORT), chat.clone(), report.clone()).await;
    (app, chat, report)
}

fn client() -> Client {
    Client::new()
}

async fn error_code(resp: reqwest::Response) -> String {
    let body: serde_json::Value = resp.json().await.unwrap();
    body["error"]["code"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn test_health_reports_index() {
    let (app, _, _) = spawn_default().await;

    let resp = client()
        .get(format!("{}/health", app.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["indexed"], true);
    assert_eq!(body["generation"], 1);
    assert_eq!(body["lines"], 3);
    assert_eq!(body["analyzer"], "rule-ko");
    assert!(body["features"].as_u64().unwrap() > 0);
    assert_eq!(body["fingerprint"].as_str().unwrap().len(), 64);
    assert!(body["built_at"].is_string());
}

#[tokio::test]
async fn test_search_returns_ranked_lines() {
    let (app, _, _) = spawn_default().await;

    let resp = client()
        .post(format!("{}/search", app.base_url))
        .json(&serde_json::json!({ "query": "주식 시장 전망" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["normalized_query"], "주식 시장 전망");
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["line"], 1);
    assert_eq!(results[0]["text"], "주식 시장이 상승했다");
    assert!(results[0]["score"].as_f64().unwrap() > 0.0);
    assert_eq!(body["context"], "주식 시장이 상승했다");
}

#[tokio::test]
async fn test_search_without_match_returns_sentinel_context() {
    let (app, _, _) = spawn_default().await;

    let resp = client()
        .post(format!("{}/search", app.base_url))
        .json(&serde_json::json!({ "query": "우주 비행선", "top_k": 5 }))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["results"].as_array().unwrap().is_empty());
    assert_eq!(body["context"], "관련된 정보가 없습니다.");
}

#[tokio::test]
async fn test_chat_grounds_prompt_in_document() {
    let (app, chat, _) = spawn_default().await;

    let resp = client()
        .post(format!("{}/chat", app.base_url))
        .json(&serde_json::json!({
            "prev_chat": "안녕하세요",
            "prompt": "주식 시장은 어때?"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["response"], "시장이 상승세입니다.");

    let prompt = chat.last_prompt();
    assert!(prompt.starts_with("문서에서 찾은 정보:\n주식 시장이 상승했다\n\n"));
    assert!(prompt.contains("질문: 주식 시장은 어때?"));
    assert!(prompt.contains("이전 대화: 안녕하세요"));
}

#[tokio::test]
async fn test_chat_rejects_empty_prompt() {
    let (app, _, _) = spawn_default().await;

    let resp = client()
        .post(format!("{}/chat", app.base_url))
        .json(&serde_json::json!({ "prompt": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(resp).await, "bad_request");
}

#[tokio::test]
async fn test_chat_backend_failure_is_bad_gateway() {
    let app = spawn_app(Some(REPORT), Arc::new(Failing), Arc::new(Failing)).await;

    let resp = client()
        .post(format!("{}/chat", app.base_url))
        .json(&serde_json::json!({ "prompt": "주식" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(error_code(resp).await, "llm_error");
}

#[tokio::test]
async fn test_unindexed_server_answers_unavailable() {
    let chat = Recording::new("x");
    let app = spawn_app(None, chat.clone(), Recording::new("x")).await;

    let health: serde_json::Value = client()
        .get(format!("{}/health", app.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["indexed"], false);
    assert_eq!(health["generation"], 0);

    for (path, body) in [
        ("chat", serde_json::json!({ "prompt": "주식" })),
        ("search", serde_json::json!({ "query": "주식" })),
    ] {
        let resp = client()
            .post(format!("{}/{}", app.base_url, path))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE, "/{}", path);
        assert_eq!(error_code(resp).await, "index_unavailable");
    }
    assert!(chat.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_get_report_missing_document() {
    let app = spawn_app(None, Recording::new("x"), Recording::new("x")).await;

    let resp = client()
        .get(format!("{}/get_report", app.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(resp).await, "not_found");
}

#[tokio::test]
async fn test_report_publishes_and_reindexes() {
    let (app, _, report) = spawn_default().await;

    let resp = client()
        .post(format!("{}/report", app.base_url))
        .json(&serde_json::json!({ "info": "30대 직장인, 공격형" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["response"], "채권 금리 하락\n배당 주식 비중 확대");

    let prompt = report.last_prompt();
    assert!(prompt.contains("[항목 코드]"));
    assert!(prompt.contains("30대 직장인, 공격형"));

    let saved = std::fs::read_to_string(app.tmp.path().join("report.md")).unwrap();
    assert_eq!(saved, "채권 금리 하락\n배당 주식 비중 확대");

    let current: serde_json::Value = client()
        .get(format!("{}/get_report", app.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(current["response"], saved);

    let health: serde_json::Value = client()
        .get(format!("{}/health", app.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["generation"], 2);
    assert_eq!(health["lines"], 2);

    let search: serde_json::Value = client()
        .post(format!("{}/search", app.base_url))
        .json(&serde_json::json!({ "query": "배당 주식" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(search["results"][0]["line"], 1);
}

#[tokio::test]
async fn test_report_backend_failure_keeps_document() {
    let app = spawn_app(Some(REPORT), Arc::new(Failing), Arc::new(Failing)).await;

    let resp = client()
        .post(format!("{}/report", app.base_url))
        .json(&serde_json::json!({ "info": "40대" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(error_code(resp).await, "llm_error");

    let saved = std::fs::read_to_string(app.tmp.path().join("report.md")).unwrap();
    assert_eq!(saved, REPORT);
}
