//! Integration tests for the OpenAI provider against a local stub server

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use pagesift_domain::{CompletionRequest, LlmProvider};
use pagesift_llm::{LlmError, OpenAiProvider};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the stub server does with each request
#[derive(Clone, Copy)]
enum Behaviour {
    Reply,
    RejectTemperature,
    RateLimited,
    Slow,
    NoChoices,
}

#[derive(Clone)]
struct Stub {
    behaviour: Behaviour,
    bodies: Arc<Mutex<Vec<Value>>>,
}

async fn chat_completions(
    State(stub): State<Stub>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    stub.bodies.lock().unwrap().push(body.clone());
    let reply = json!({
        "choices": [{ "message": { "role": "assistant", "content": "{\"price\": \"$245.00\"}" } }]
    });

    match stub.behaviour {
        Behaviour::Reply => (StatusCode::OK, Json(reply)),
        Behaviour::RejectTemperature if body.get("temperature").is_some() => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": { "message": "Unsupported value: 'temperature' does not support 0.1 with this model." }
            })),
        ),
        Behaviour::RejectTemperature => (StatusCode::OK, Json(reply)),
        Behaviour::RateLimited => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": { "message": "slow down" } })),
        ),
        Behaviour::Slow => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            (StatusCode::OK, Json(reply))
        }
        Behaviour::NoChoices => (StatusCode::OK, Json(json!({ "choices": [] }))),
    }
}

/// Start a stub server and return its base URL and the recorded bodies
async fn spawn_stub(behaviour: Behaviour) -> (String, Arc<Mutex<Vec<Value>>>) {
    let bodies = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(Stub {
            behaviour,
            bodies: Arc::clone(&bodies),
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/v1", addr), bodies)
}

fn request() -> CompletionRequest {
    CompletionRequest::json("Extract the fare.", "URL: https://example.com").with_temperature(0.1)
}

#[tokio::test]
async fn test_complete_returns_message_content() {
    let (base_url, bodies) = spawn_stub(Behaviour::Reply).await;
    let provider = OpenAiProvider::new("test-key", "gpt-4-turbo-preview")
        .unwrap()
        .with_base_url(base_url);

    let reply = provider.complete(&request()).await.unwrap();

    assert_eq!(reply, r#"{"price": "$245.00"}"#);
    let bodies = bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["model"], "gpt-4-turbo-preview");
    assert_eq!(bodies[0]["response_format"]["type"], "json_object");
    assert_eq!(bodies[0]["messages"][0]["content"], "Extract the fare.");
    assert!((bodies[0]["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
}

#[tokio::test]
async fn test_temperature_rejection_retries_once_without_it() {
    let (base_url, bodies) = spawn_stub(Behaviour::RejectTemperature).await;
    let provider = OpenAiProvider::new("test-key", "gpt-4.1")
        .unwrap()
        .with_base_url(base_url);

    let reply = provider.complete(&request()).await.unwrap();

    assert_eq!(reply, r#"{"price": "$245.00"}"#);
    let bodies = bodies.lock().unwrap();
    assert_eq!(bodies.len(), 2);
    assert!(bodies[0].get("temperature").is_some());
    assert!(bodies[1].get("temperature").is_none());
}

#[tokio::test]
async fn test_known_models_never_send_temperature() {
    let (base_url, bodies) = spawn_stub(Behaviour::RejectTemperature).await;
    let provider = OpenAiProvider::new("test-key", "o1-mini")
        .unwrap()
        .with_base_url(base_url);

    provider.complete(&request()).await.unwrap();

    let bodies = bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert!(bodies[0].get("temperature").is_none());
}

#[tokio::test]
async fn test_rate_limit_is_reported() {
    let (base_url, _) = spawn_stub(Behaviour::RateLimited).await;
    let provider = OpenAiProvider::new("test-key", "gpt-4")
        .unwrap()
        .with_base_url(base_url);

    let error = provider.complete(&request()).await.unwrap_err();
    assert_eq!(error, LlmError::RateLimitExceeded);
}

#[tokio::test]
async fn test_http_timeout_is_reported() {
    let (base_url, _) = spawn_stub(Behaviour::Slow).await;
    let provider = OpenAiProvider::new("test-key", "gpt-4")
        .unwrap()
        .with_base_url(base_url)
        .with_timeout(Duration::from_millis(100));

    let error = provider.complete(&request()).await.unwrap_err();
    assert!(error.is_timeout());
}

#[tokio::test]
async fn test_missing_choices_is_invalid_response() {
    let (base_url, _) = spawn_stub(Behaviour::NoChoices).await;
    let provider = OpenAiProvider::new("test-key", "gpt-4")
        .unwrap()
        .with_base_url(base_url);

    let error = provider.complete(&request()).await.unwrap_err();
    assert!(matches!(error, LlmError::InvalidResponse(_)));
}
