use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use docgate::{AnalysisOutput, Analyzer, GatewayConfig, ProviderError, TokenConfig};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use server::{build_router, ServerConfig, ServerState};
use tower::ServiceExt;

const BOUNDARY: &str = "docgate-test-boundary";

struct StubAnalyzer {
    name: &'static str,
    fail_with: Option<u16>,
    calls: AtomicUsize,
}

impl StubAnalyzer {
    fn new(name: &'static str, fail_with: Option<u16>) -> Arc<Self> {
        Arc::new(Self {
            name,
            fail_with,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Analyzer for StubAnalyzer {
    fn name(&self) -> &str {
        self.name
    }

    async fn analyze(&self, input: &str) -> Result<AnalysisOutput, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_with {
            Some(status) => Err(ProviderError::Status {
                provider: self.name.to_string(),
                status,
                body: "stub failure".to_string(),
            }),
            None => Ok(AnalysisOutput::Text(format!("{} saw {input}", self.name))),
        }
    }
}

struct Harness {
    app: Router,
    state: Arc<ServerState>,
    dir: tempfile::TempDir,
}

impl Harness {
    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn stored_docs(&self) -> usize {
        std::fs::read_dir(self.root().join("docs"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    fn bearer(&self, subject: &str) -> String {
        let token = self.state.issuer.issue_default(subject, false).unwrap();
        format!("Bearer {token}")
    }
}

async fn harness(dev_mode: bool, analyzers: Vec<Arc<StubAnalyzer>>) -> Harness {
    harness_with(dev_mode, analyzers, ServerConfig::default()).await
}

async fn harness_with(
    dev_mode: bool,
    analyzers: Vec<Arc<StubAnalyzer>>,
    config: ServerConfig,
) -> Harness {
    let dir = tempfile::tempdir().unwrap();

    let config = ServerConfig {
        static_dir: dir.path().join("static"),
        ..config
    };
    let mut gateway = GatewayConfig::default();
    gateway.auth = TokenConfig::with_secret("api-test-secret");
    gateway.dev_mode = dev_mode;
    gateway.storage.root = dir.path().to_path_buf();

    let analyzers = analyzers
        .into_iter()
        .map(|a| a as Arc<dyn Analyzer>)
        .collect();
    let state = Arc::new(
        ServerState::with_analyzers(config, gateway, analyzers)
            .await
            .unwrap(),
    );

    Harness {
        app: build_router(state.clone()),
        state,
        dir,
    }
}

fn multipart_body(field: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(authorization: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/upload_document")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::from(body)).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_ok_with_epoch_time() {
    let h = harness(false, vec![]).await;

    let response = h.app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["time"].as_f64().unwrap() > 1_600_000_000.0);
}

#[tokio::test]
async fn request_id_is_echoed() {
    let h = harness(false, vec![]).await;

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn landing_falls_back_to_banner_without_index_html() {
    let h = harness(false, vec![]).await;

    let response = h.app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Multi-Agent Interface is up and running!");
}

#[tokio::test]
async fn landing_serves_index_html_when_present() {
    let h = harness(false, vec![]).await;
    let static_dir = h.root().join("static");
    std::fs::create_dir_all(&static_dir).unwrap();
    std::fs::write(static_dir.join("index.html"), "<h1>docgate</h1>").unwrap();

    let response = h.app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"<h1>docgate</h1>");
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let h = harness(false, vec![]).await;

    let response = h.app.clone().oneshot(get("/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["detail"], "Not found");
}

#[tokio::test]
async fn metrics_is_404_without_exporter() {
    let h = harness(false, vec![]).await;

    let response = h.app.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn verify_dev_is_refused_when_dev_mode_is_off() {
    let h = harness(false, vec![]).await;

    let response = h
        .app
        .clone()
        .oneshot(get("/verify_dev?tx_signature=dev-ok&wallet_address=demo-wallet"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(
        body["detail"],
        "Only available in dev mode with tx_signature=dev-ok"
    );
}

#[tokio::test]
async fn verify_dev_issues_long_lived_token_in_dev_mode() {
    let h = harness(true, vec![]).await;

    let response = h.app.clone().oneshot(get("/verify_dev")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "verified");

    let claims = h.state.issuer.verify(body["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.sub, "demo-wallet");
    assert_eq!(claims.exp - claims.iat, 24 * 3600);

    let response = h
        .app
        .clone()
        .oneshot(get("/verify_dev?tx_signature=real-sig"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_payment_writes_reference_record() {
    let h = harness(false, vec![]).await;

    let request = Request::builder()
        .method("POST")
        .uri("/create_payment")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"wallet_address": "demo-wallet"}).to_string()))
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["to"], "DemoReceiver1");
    assert_eq!(body["currency"], "SOL");
    assert_eq!(body["amount"], 0.1);
    assert_eq!(body["message"], "Rental for demo-wallet");

    let reference = body["reference"].as_str().unwrap();
    let path = h.root().join("payments").join(format!("{reference}.json"));
    let record: Value = serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
    assert_eq!(record["wallet"], "demo-wallet");
    assert_eq!(record["request"], body);
}

#[tokio::test]
async fn create_payment_rejects_missing_wallet() {
    let h = harness(false, vec![]).await;

    let request = Request::builder()
        .method("POST")
        .uri("/create_payment")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"amount": 1.0}).to_string()))
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn upload_without_token_is_401_and_stores_nothing() {
    let a = StubAnalyzer::new("ai_ml", None);
    let h = harness(false, vec![a.clone()]).await;

    let request = upload_request(None, multipart_body("file", "report.pdf", b"0123456789"));
    let response = h.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "Authorization header missing or invalid");
    assert_eq!(h.stored_docs(), 0);
    assert_eq!(a.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn upload_with_garbage_token_is_401() {
    let h = harness(false, vec![StubAnalyzer::new("ai_ml", None)]).await;

    let request = upload_request(
        Some("Bearer not.a.jwt"),
        multipart_body("file", "report.pdf", b"x"),
    );
    let response = h.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert!(body["detail"].as_str().unwrap().starts_with("Invalid token:"));
    assert_eq!(h.stored_docs(), 0);
}

#[tokio::test]
async fn upload_returns_receipt_with_every_provider() {
    let h = harness(
        false,
        vec![
            StubAnalyzer::new("ai_ml", None),
            StubAnalyzer::new("mistral", None),
            StubAnalyzer::new("nebius", None),
        ],
    )
    .await;

    let auth = h.bearer("demo-wallet");
    let request = upload_request(Some(&auth), multipart_body("file", "report.pdf", b"0123456789"));
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "done");
    assert_eq!(body["owner"], "demo-wallet");
    let file = body["file"].as_str().unwrap();
    assert!(file.ends_with("_report.pdf"));
    assert_eq!(body["analysis"]["nebius"], format!("nebius saw {file}"));
    assert_eq!(body["analysis"].as_object().unwrap().len(), 3);

    let stored = std::fs::read(h.root().join("docs").join(file)).unwrap();
    assert_eq!(stored, b"0123456789");
}

#[tokio::test]
async fn upload_without_file_field_is_400() {
    let h = harness(false, vec![StubAnalyzer::new("ai_ml", None)]).await;

    let auth = h.bearer("demo-wallet");
    let request = upload_request(Some(&auth), multipart_body("document", "report.pdf", b"x"));
    let response = h.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "Bad request: missing multipart field 'file'");
    assert_eq!(h.stored_docs(), 0);
}

#[tokio::test]
async fn upload_with_overlong_file_name_is_400() {
    let stub = StubAnalyzer::new("ai_ml", None);
    let h = harness(false, vec![stub.clone()]).await;

    let auth = h.bearer("demo-wallet");
    let name = format!("{}.pdf", "a".repeat(240));
    let request = upload_request(Some(&auth), multipart_body("file", &name, b"x"));
    let response = h.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["detail"].as_str().unwrap().contains("invalid file name"));
    assert_eq!(h.stored_docs(), 0);
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn upload_over_body_limit_is_413() {
    let config = ServerConfig {
        max_body_size_mb: 1,
        ..ServerConfig::default()
    };
    let h = harness_with(false, vec![StubAnalyzer::new("ai_ml", None)], config).await;

    let auth = h.bearer("demo-wallet");
    let content = vec![b'z'; 2 * 1024 * 1024];
    let request = upload_request(Some(&auth), multipart_body("file", "big.bin", &content));
    let response = h.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json_body(response).await["error"]["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(h.stored_docs(), 0);
}

#[tokio::test]
async fn upload_fails_with_502_when_one_provider_errors() {
    let h = harness(
        false,
        vec![
            StubAnalyzer::new("ai_ml", None),
            StubAnalyzer::new("mistral", Some(500)),
        ],
    )
    .await;

    let auth = h.bearer("demo-wallet");
    let request = upload_request(Some(&auth), multipart_body("file", "report.pdf", b"x"));
    let response = h.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "PROVIDER_ERROR");
    assert_eq!(body["detail"], "mistral API error 500: stub failure");
    assert!(body.get("analysis").is_none());
}

#[tokio::test]
async fn sse_starts_with_connected_frame() {
    let h = harness(false, vec![]).await;

    let response = h
        .app
        .clone()
        .oneshot(get("/sse?agentId=tester&agentDescription=runner"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );

    let mut body = response.into_body();
    let frame = body.frame().await.unwrap().unwrap();
    let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
    assert!(text.starts_with("data: "), "unexpected frame {text:?}");

    let payload: Value = serde_json::from_str(text.trim_start_matches("data: ").trim()).unwrap();
    assert_eq!(
        payload,
        json!({"event": "connected", "agentId": "tester", "desc": "runner"})
    );

    let frame = body.frame().await.unwrap().unwrap();
    let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
    assert!(text.contains("\"event\":\"heartbeat\""), "unexpected frame {text:?}");
}
