use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use chatbot_widget::chat::{ControllerConfig, ConversationController, MessageRole, SubmitOutcome};
use chatbot_widget::render::RecordingRenderer;
use chatbot_widget::session::Session;
use chatbot_widget::transport::{ChatError, ChatRequest, HttpTransport, Transport};
use serde_json::{Value, json};
use std::sync::Arc;

// Helper to serve `router` on an ephemeral port and return the endpoint URL
async fn spawn_endpoint(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/submit_query")
}

/// Mirrors the backend: validates the body and echoes the query back.
async fn submit_query(headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if content_type != "application/json" {
        return (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Json(json!({ "error": "expected JSON" })),
        );
    }

    let Some(query) = body.get("Query").and_then(Value::as_str) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing Query!" })),
        );
    };
    let Some(session_id) = body.get("SessionId").and_then(Value::as_str) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing SessionId!" })),
        );
    };

    (
        StatusCode::OK,
        Json(json!({ "response": format!("echo: {query}"), "SessionId": session_id })),
    )
}

fn request(query: &str) -> ChatRequest {
    ChatRequest {
        session_id: "sess_abc".to_string(),
        query: query.to_string(),
    }
}

#[tokio::test]
async fn test_successful_exchange() {
    let url = spawn_endpoint(Router::new().route("/submit_query", post(submit_query))).await;

    let reply = HttpTransport::new()
        .post(&url, &request("Price?"))
        .await
        .expect("exchange should succeed");

    assert_eq!(reply.response, "echo: Price?");
    assert_eq!(
        reply.session_id.as_ref().and_then(Value::as_str),
        Some("sess_abc")
    );
}

#[tokio::test]
async fn test_non_success_status() {
    let url = spawn_endpoint(Router::new().route(
        "/submit_query",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "response": "ignored" })),
            )
        }),
    ))
    .await;

    let err = HttpTransport::new()
        .post(&url, &request("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::Status(500)), "got {err:?}");
}

#[tokio::test]
async fn test_not_found_route() {
    let url = spawn_endpoint(Router::new()).await;

    let err = HttpTransport::new()
        .post(&url, &request("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::Status(404)), "got {err:?}");
}

#[tokio::test]
async fn test_non_json_body() {
    let url = spawn_endpoint(Router::new().route(
        "/submit_query",
        post(|| async { "<html>maintenance</html>" }),
    ))
    .await;

    let err = HttpTransport::new()
        .post(&url, &request("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::Protocol(_)), "got {err:?}");
}

#[tokio::test]
async fn test_missing_response_field() {
    let url = spawn_endpoint(Router::new().route(
        "/submit_query",
        post(|| async { Json(json!({ "answer": "wrong field" })) }),
    ))
    .await;

    let err = HttpTransport::new()
        .post(&url, &request("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::Protocol(_)), "got {err:?}");
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = HttpTransport::new()
        .post(&format!("http://{addr}/submit_query"), &request("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn test_invalid_url() {
    let err = HttpTransport::new()
        .post("not a url", &request("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn test_controller_over_http() {
    let url = spawn_endpoint(Router::new().route("/submit_query", post(submit_query))).await;

    let controller = ConversationController::initialize(
        ControllerConfig::with_endpoint(url),
        Session::from_id("sess_http"),
        Arc::new(HttpTransport::new()),
        Arc::new(RecordingRenderer::new()),
    );

    let outcome = controller.submit("  Do you ship?  ").await;
    assert!(
        matches!(outcome, SubmitOutcome::Replied(ref m) if m.text == "echo: Do you ship?"),
        "got {outcome:?}"
    );

    let transcript = controller.transcript();
    let roles: Vec<_> = transcript.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![MessageRole::Bot, MessageRole::User, MessageRole::Bot]
    );
}
