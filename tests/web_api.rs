// Router tests for the public API and the scoring endpoint.
//
// Requests go through the real axum routers with `tower::ServiceExt::oneshot`.
// A counting predictor records whether any inference work was attempted.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use topicast::config::{Backend, Config};
use topicast::engine::mock::{MockClassifier, MockPredictor};
use topicast::engine::remote::RemotePredictor;
use topicast::engine::traits::TopicPredictor;
use topicast::error::PipelineError;
use topicast::pipeline::PredictionResult;
use topicast::web::{build_router, build_scoring_router, AppState};

const API_KEY: &str = "test-key";

#[derive(Clone, Copy)]
enum Behavior {
    Succeed,
    RemoteDown,
    Crash,
}

struct CountingPredictor {
    calls: Arc<AtomicUsize>,
    behavior: Behavior,
}

#[async_trait]
impl TopicPredictor for CountingPredictor {
    async fn predict(&self, texts: &[String]) -> Result<Vec<PredictionResult>, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Succeed => Ok(texts
                .iter()
                .map(|t| PredictionResult {
                    input_text: t.clone(),
                    predicted_topics: vec!["topic 0".to_string()],
                    decoded_topics: vec![vec!["Soccer".to_string()]],
                })
                .collect()),
            Behavior::RemoteDown => Err(PipelineError::RemoteCall {
                status: 503,
                body: "model is warming up".to_string(),
            }),
            Behavior::Crash => Err(PipelineError::Inference(
                "onnxruntime: segfault at 0xdeadbeef".to_string(),
            )),
        }
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

fn config() -> Config {
    Config {
        api_key: API_KEY.to_string(),
        api_key_header: "x-api-key".to_string(),
        backend: Backend::Mock,
        remote_endpoint: String::new(),
        remote_api_key: String::new(),
        artifact_dir: PathBuf::from("/nonexistent"),
        scoring_api_key: String::new(),
    }
}

fn app(behavior: Behavior) -> (Router, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let predictor = CountingPredictor {
        calls: Arc::clone(&calls),
        behavior,
    };
    let state = AppState {
        predictor: Arc::new(predictor),
        config: Arc::new(config()),
    };
    (build_router(state), calls)
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn predict_request(key: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/predict/")
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

// ============================================================
// Auth
// ============================================================

#[tokio::test]
async fn missing_key_is_forbidden_without_inference() {
    let (router, calls) = app(Behavior::Succeed);
    let (status, body) = send(router, predict_request(None, r#"{"text": ["hello"]}"#)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "topics": null, "error": "Forbidden" }));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn wrong_key_is_forbidden_without_inference() {
    let (router, calls) = app(Behavior::Succeed);
    let (status, _) = send(
        router,
        predict_request(Some("test-key-2"), r#"{"text": ["hello"]}"#),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn auth_runs_before_body_parsing() {
    // Garbage body with a bad key is still a 403, not a 422
    let (router, calls) = app(Behavior::Succeed);
    let (status, _) = send(router, predict_request(Some("nope"), "not json")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn custom_header_name_is_honoured() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut cfg = config();
    cfg.api_key_header = "x-topic-token".to_string();
    let state = AppState {
        predictor: Arc::new(CountingPredictor {
            calls: Arc::clone(&calls),
            behavior: Behavior::Succeed,
        }),
        config: Arc::new(cfg),
    };

    let request = Request::builder()
        .method("POST")
        .uri("/predict/")
        .header("content-type", "application/json")
        .header("x-topic-token", API_KEY)
        .body(Body::from(r#"{"text": ["hello"]}"#))
        .unwrap();
    let (status, _) = send(build_router(state.clone()), request).await;
    assert_eq!(status, StatusCode::OK);

    // The default header name no longer works
    let (status, _) = send(
        build_router(state),
        predict_request(Some(API_KEY), r#"{"text": ["hello"]}"#),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// ============================================================
// Validation
// ============================================================

#[tokio::test]
async fn empty_batch_rejected_before_inference() {
    let (router, calls) = app(Behavior::Succeed);
    let (status, body) = send(router, predict_request(Some(API_KEY), r#"{"text": []}"#)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["topics"].is_null());
    assert!(body["error"].as_str().unwrap().contains("between 1 and 100"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn oversized_batch_rejected_before_inference() {
    let (router, calls) = app(Behavior::Succeed);
    let texts: Vec<String> = (0..101).map(|i| format!("text {i}")).collect();
    let body = json!({ "text": texts }).to_string();
    let (status, _) = send(router, predict_request(Some(API_KEY), &body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn blank_text_rejected() {
    let (router, calls) = app(Behavior::Succeed);
    let (status, _) = send(
        router,
        predict_request(Some(API_KEY), r#"{"text": ["fine", ""]}"#),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_json_uses_error_body() {
    let (router, calls) = app(Behavior::Succeed);
    let (status, body) = send(router, predict_request(Some(API_KEY), r#"{"texts": "x"}"#)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["topics"].is_null());
    assert!(body["error"].is_string());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// ============================================================
// Success and failure bodies
// ============================================================

#[tokio::test]
async fn success_body_shape() {
    let (router, calls) = app(Behavior::Succeed);
    let (status, body) = send(
        router,
        predict_request(Some(API_KEY), r#"{"text": ["I love soccer", "and travel"]}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["error"].is_null());
    let topics = body["topics"].as_array().unwrap();
    assert_eq!(topics.len(), 2);
    assert_eq!(topics[0]["input_text"], "I love soccer");
    assert_eq!(topics[1]["input_text"], "and travel");
    assert_eq!(topics[0]["predicted_topics"], json!(["topic 0"]));
    assert_eq!(topics[0]["decoded_topics"], json!([["Soccer"]]));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn route_without_trailing_slash_works() {
    let (router, _) = app(Behavior::Succeed);
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from(r#"{"text": ["hello"]}"#))
        .unwrap();
    let (status, _) = send(router, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn remote_failure_is_server_error_with_status() {
    let (router, _) = app(Behavior::RemoteDown);
    let (status, body) = send(router, predict_request(Some(API_KEY), r#"{"text": ["hi"]}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["topics"].is_null());
    assert_eq!(body["error"], "Error: 503, model is warming up");
}

#[tokio::test]
async fn unexpected_failure_hides_internals() {
    let (router, _) = app(Behavior::Crash);
    let (status, body) = send(router, predict_request(Some(API_KEY), r#"{"text": ["hi"]}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn preflight_allows_key_header() {
    let (router, calls) = app(Behavior::Succeed);
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/predict/")
        .header("origin", "https://dashboard.example")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type,x-api-key")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let allowed = response
        .headers()
        .get("access-control-allow-headers")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    assert!(allowed.contains("x-api-key"), "allow-headers was {allowed:?}");
    assert!(allowed.contains("content-type"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn health_needs_no_key() {
    let (router, _) = app(Behavior::Succeed);
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

// ============================================================
// Scoring endpoint
// ============================================================

fn scoring_state(token: &str) -> AppState {
    let mut cfg = config();
    cfg.scoring_api_key = token.to_string();
    let predictor = MockPredictor::with_classifier(MockClassifier::with_seed(8, 3).with_probability(0.0));
    AppState {
        predictor: Arc::new(predictor),
        config: Arc::new(cfg),
    }
}

fn score_request(token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/score")
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn scoring_returns_predictions() {
    let router = build_scoring_router(scoring_state(""));
    let (status, body) = send(router, score_request(None, r#"{"text": ["a", "b"]}"#)).await;
    assert_eq!(status, StatusCode::OK);
    let predictions = body["predictions"].as_array().unwrap();
    assert_eq!(predictions.len(), 2);
    assert_eq!(predictions[0]["predicted_topics"], json!([]));
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn scoring_token_enforced_when_configured() {
    let (status, body) = send(
        build_scoring_router(scoring_state("score-secret")),
        score_request(Some("wrong"), r#"{"text": ["a"]}"#),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));

    let (status, _) = send(
        build_scoring_router(scoring_state("score-secret")),
        score_request(Some("score-secret"), r#"{"text": ["a"]}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn scoring_rejects_empty_batch() {
    let router = build_scoring_router(scoring_state(""));
    let (status, body) = send(router, score_request(None, r#"{"text": []}"#)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
}

// ============================================================
// RemotePredictor against a loopback scoring server
// ============================================================

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/score")
}

#[tokio::test]
async fn remote_predictor_round_trips_through_scoring_endpoint() {
    let endpoint = spawn(build_scoring_router(scoring_state("score-secret"))).await;
    let predictor = RemotePredictor::new(endpoint, "score-secret".to_string());
    let texts = vec!["one".to_string(), "two".to_string(), "three".to_string()];
    let results = predictor.predict(&texts).await.unwrap();
    let echoed: Vec<&str> = results.iter().map(|r| r.input_text.as_str()).collect();
    assert_eq!(echoed, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn remote_predictor_surfaces_downstream_status() {
    let endpoint = spawn(build_scoring_router(scoring_state("score-secret"))).await;
    let predictor = RemotePredictor::new(endpoint, "wrong-secret".to_string());
    let err = predictor.predict(&["x".to_string()]).await.unwrap_err();
    match err {
        PipelineError::RemoteCall { status, .. } => assert_eq!(status, 401),
        other => panic!("expected RemoteCall, got {other:?}"),
    }
}

#[tokio::test]
async fn remote_predictor_unreachable_is_transport_error() {
    // Bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let predictor = RemotePredictor::new(format!("http://{addr}/score"), String::new());
    let err = predictor.predict(&["x".to_string()]).await.unwrap_err();
    assert!(matches!(err, PipelineError::RemoteTransport(_)));
}

#[tokio::test]
async fn unreachable_scoring_endpoint_hides_its_address() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let endpoint = format!("http://{addr}/internal/score");

    let state = AppState {
        predictor: Arc::new(RemotePredictor::new(endpoint, String::new())),
        config: Arc::new(config()),
    };
    let (status, body) = send(
        build_router(state),
        predict_request(Some(API_KEY), r#"{"text": ["hi"]}"#),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
    let raw = body.to_string();
    assert!(!raw.contains("internal/score"));
    assert!(!raw.contains(&addr.to_string()));
}

/// Scoring endpoint that answers with the right count but reversed order.
async fn reversed_score(
    axum::Json(request): axum::Json<topicast::web::schemas::TextRequest>,
) -> axum::Json<Value> {
    let predictions: Vec<Value> = request
        .text
        .iter()
        .rev()
        .map(|t| json!({ "input_text": t, "predicted_topics": [], "decoded_topics": [] }))
        .collect();
    axum::Json(json!({ "predictions": predictions }))
}

#[tokio::test]
async fn remote_predictor_rejects_reordered_response() {
    let router = Router::new().route("/score", axum::routing::post(reversed_score));
    let endpoint = spawn(router).await;
    let predictor = RemotePredictor::new(endpoint, String::new());

    let err = predictor
        .predict(&["first".to_string(), "second".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Inference(_)));
    assert!(!err.is_client_visible());

    // A single text cannot be out of order
    let ok = predictor.predict(&["only".to_string()]).await.unwrap();
    assert_eq!(ok[0].input_text, "only");
}
