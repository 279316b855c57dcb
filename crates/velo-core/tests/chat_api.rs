//! HTTP contract tests for the chat backend client.
//!
//! Each test spins up an Axum server on a random port standing in for the
//! chat backend and drives the real client against it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use velo_core::{ChatApiClient, ChatError, ChatMessage, CompletionBackend, CompletionRequest};

/// Start `app` on a random port and return its base URL.
async fn start_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("http://127.0.0.1:{}", port)
}

fn request(history: &[ChatMessage]) -> CompletionRequest {
    CompletionRequest {
        messages: history.to_vec(),
    }
}

#[tokio::test]
async fn test_completion_posts_history_and_parses_reply() {
    let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let recorder = Arc::clone(&seen);

    let app = Router::new().route(
        "/api/chat/completion",
        post(move |Json(body): Json<Value>| {
            let recorder = Arc::clone(&recorder);
            async move {
                *recorder.lock().unwrap() = Some(body);
                Json(json!({
                    "response": "Ein **Trekkingrad** passt gut. [doc2]",
                    "citations": [{ "title": "trekking.md", "content": "Alltag und Touren" }]
                }))
            }
        }),
    );
    let base = start_server(app).await;
    let client = ChatApiClient::new(&format!("{}/", base));

    let history = vec![
        ChatMessage::user("Ich pendle 10 km."),
        ChatMessage::assistant("Auf welchem Untergrund?"),
        ChatMessage::user("Asphalt"),
    ];
    let reply = client.complete(request(&history)).await.unwrap();

    assert_eq!(reply.response, "Ein **Trekkingrad** passt gut. [doc2]");
    assert_eq!(reply.citations.len(), 1);
    assert_eq!(reply.citations[0].title, "trekking.md");

    let body = seen.lock().unwrap().take().unwrap();
    assert_eq!(
        body,
        json!({
            "messages": [
                { "role": "user", "content": "Ich pendle 10 km." },
                { "role": "assistant", "content": "Auf welchem Untergrund?" },
                { "role": "user", "content": "Asphalt" }
            ]
        })
    );
}

#[tokio::test]
async fn test_reply_without_citations_is_accepted() {
    let app = Router::new().route(
        "/api/chat/completion",
        post(|| async { Json(json!({ "response": "Gern!" })) }),
    );
    let client = ChatApiClient::new(&start_server(app).await);

    let reply = client.complete(request(&[ChatMessage::user("Hallo")])).await.unwrap();
    assert_eq!(reply.response, "Gern!");
    assert!(reply.citations.is_empty());
}

#[tokio::test]
async fn test_missing_response_field_is_protocol_error() {
    let app = Router::new().route(
        "/api/chat/completion",
        post(|| async { Json(json!({ "answer": "falsches Feld" })) }),
    );
    let client = ChatApiClient::new(&start_server(app).await);

    let err = client.complete(request(&[ChatMessage::user("Hallo")])).await.unwrap_err();
    assert!(matches!(err, ChatError::Protocol(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_server_error_is_protocol_error() {
    let app = Router::new().route(
        "/api/chat/completion",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let client = ChatApiClient::new(&start_server(app).await);

    let err = client.complete(request(&[ChatMessage::user("Hallo")])).await.unwrap_err();
    assert!(matches!(err, ChatError::Protocol(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    // Bind and drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = ChatApiClient::new(&format!("http://127.0.0.1:{}", port));
    let err = client.complete(request(&[ChatMessage::user("Hallo")])).await.unwrap_err();
    assert!(matches!(err, ChatError::Network(_)), "got {:?}", err);
    assert!(!client.health().await);
}

#[tokio::test]
async fn test_health_reports_ok_status() {
    let app = Router::new().route("/api/health", get(|| async { Json(json!({ "status": "ok" })) }));
    let client = ChatApiClient::new(&start_server(app).await);
    assert!(client.health().await);

    let degraded =
        Router::new().route("/api/health", get(|| async { Json(json!({ "status": "degraded" })) }));
    let client = ChatApiClient::new(&start_server(degraded).await);
    assert!(!client.health().await);
}
