//! Integration tests for the HTTP session bridge.
//!
//! Each test spins up an Axum server on a random port standing in for the
//! remote eligibility service.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use hulpwijzer::config::AppConfig;
use hulpwijzer::profile::{ProfileStore, SendOutcome};
use hulpwijzer::profile::store::{CONTACT_FAILURE_MESSAGE, NO_REPLY_FALLBACK};
use hulpwijzer::session::{ChatEncoding, HttpSessionBridge, Mode, SessionBridge};
use hulpwijzer::storage::MemoryStorage;

/// (session_id, message) pairs the fake service received.
type Received = Arc<Mutex<Vec<(Option<String>, String)>>>;

async fn chat(
    State(received): State<Received>,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> Response {
    let (session_id, message) = if body.is_empty() {
        (query.get("session_id").cloned(), query.get("message").cloned().unwrap_or_default())
    } else {
        let body: Value = serde_json::from_str(&body).unwrap();
        (
            body["session_id"].as_str().map(str::to_string),
            body["message"].as_str().unwrap_or_default().to_string(),
        )
    };
    received.lock().unwrap().push((session_id.clone(), message.clone()));

    match message.as_str() {
        "boom" => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "null" => return Json(Value::Null).into_response(),
        "numeric" => return Json(json!({ "reply": "ok", "session_id": 42 })).into_response(),
        _ => {}
    }

    Json(json!({
        "reply": format!("echo: {message}"),
        "session_id": session_id.unwrap_or_else(|| "srv-1".to_string()),
        "profile": { "municipality": "Leiden", "numberOfChildren": 1 },
        "schemes": [{ "id": 3, "name": "Zorgtoeslag", "time_to_apply_min": 20 }],
        "mode": "results"
    }))
    .into_response()
}

async fn session(Path(id): Path<String>) -> Json<Value> {
    Json(json!({ "session_id": id, "mode": "intake", "schemes": [] }))
}

/// Start the fake service, return (base url, received requests).
async fn start_server() -> (String, Received) {
    let received: Received = Arc::default();
    let app = Router::new()
        .route("/chat", post(chat))
        .route("/session/{id}", get(session))
        .with_state(Arc::clone(&received));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://127.0.0.1:{port}"), received)
}

fn bridge(api_url: &str, encoding: ChatEncoding) -> HttpSessionBridge {
    let config = AppConfig {
        api_url: api_url.to_string(),
        request_timeout: Duration::from_secs(5),
        chat_encoding: encoding,
        ..AppConfig::default()
    };
    HttpSessionBridge::new(&config).unwrap()
}

#[tokio::test]
async fn query_encoding_roundtrip() {
    let (url, received) = start_server().await;
    let bridge = bridge(&url, ChatEncoding::Query);

    let reply = bridge
        .send(None, "ik heb twee kinderen & een baan")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(reply.reply.as_deref(), Some("echo: ik heb twee kinderen & een baan"));
    assert_eq!(reply.session_id.as_deref(), Some("srv-1"));
    assert_eq!(reply.mode, Mode::Results);
    assert_eq!(reply.schemes.as_ref().unwrap().len(), 1);
    assert!(reply.profile.unwrap().contains("municipality"));
    assert_eq!(
        received.lock().unwrap().clone(),
        vec![(None, "ik heb twee kinderen & een baan".to_string())]
    );
}

#[tokio::test]
async fn json_encoding_carries_session() {
    let (url, received) = start_server().await;
    let bridge = bridge(&url, ChatEncoding::Json);

    let reply = bridge.send(Some("abc"), "hallo").await.unwrap().unwrap();

    assert_eq!(reply.session_id.as_deref(), Some("abc"));
    assert_eq!(
        received.lock().unwrap().clone(),
        vec![(Some("abc".to_string()), "hallo".to_string())]
    );
}

#[tokio::test]
async fn error_status_is_a_failure() {
    let (url, _received) = start_server().await;
    assert!(bridge(&url, ChatEncoding::Query).send(None, "boom").await.is_err());
}

#[tokio::test]
async fn unreachable_service_is_a_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let result = bridge(&format!("http://127.0.0.1:{port}"), ChatEncoding::Query)
        .send(None, "hallo")
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn fetch_session_reads_server_view() {
    let (url, _received) = start_server().await;
    let reply = bridge(&url, ChatEncoding::Query)
        .fetch_session("s 1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reply.session_id.as_deref(), Some("s 1"));
    assert_eq!(reply.mode, Mode::Intake);
    assert_eq!(reply.schemes, Some(vec![]));
}

#[tokio::test]
async fn profile_store_over_http() {
    let (url, received) = start_server().await;
    let storage = Arc::new(MemoryStorage::new());
    let store = ProfileStore::load(storage, Arc::new(bridge(&url, ChatEncoding::Query)));

    assert_eq!(store.send_utterance("hallo").await, SendOutcome::Replied);
    assert_eq!(store.send_utterance("nog iets").await, SendOutcome::Replied);
    assert_eq!(store.send_utterance("boom").await, SendOutcome::Failed);

    let calls = received.lock().unwrap().clone();
    assert_eq!(calls[1].0.as_deref(), Some("srv-1"));

    let session = store.session().await;
    assert_eq!(session.messages.len(), 6);
    assert_eq!(session.messages[5].content, CONTACT_FAILURE_MESSAGE);
    assert_eq!(session.mode, Mode::Results);
    assert!(!store.is_complete().await);
    assert!(!store.is_sending());
}

#[tokio::test]
async fn null_body_is_a_reply_without_payload() {
    let (url, _received) = start_server().await;
    let reply = bridge(&url, ChatEncoding::Query).send(None, "null").await.unwrap();
    assert_eq!(reply, None);
}

#[tokio::test]
async fn numeric_session_id_is_kept_as_text() {
    let (url, _received) = start_server().await;
    let reply = bridge(&url, ChatEncoding::Json)
        .send(None, "numeric")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reply.reply.as_deref(), Some("ok"));
    assert_eq!(reply.session_id.as_deref(), Some("42"));
    assert_eq!(reply.mode, Mode::Intake);
}

#[tokio::test]
async fn unexpected_bodies_do_not_count_as_failures() {
    let (url, received) = start_server().await;
    let storage = Arc::new(MemoryStorage::new());
    let store = ProfileStore::load(storage, Arc::new(bridge(&url, ChatEncoding::Query)));

    assert_eq!(store.send_utterance("hallo").await, SendOutcome::Replied);
    assert_eq!(store.send_utterance("null").await, SendOutcome::Replied);

    let session = store.session().await;
    assert_eq!(session.messages[3].content, NO_REPLY_FALLBACK);
    assert_eq!(session.session_id.as_deref(), Some("srv-1"));
    assert_eq!(session.mode, Mode::Results);
    assert_eq!(session.candidate_programs.len(), 1);

    assert_eq!(store.send_utterance("numeric").await, SendOutcome::Replied);
    assert_eq!(store.messages().await[5].content, "ok");
    assert_eq!(store.session_id().await.as_deref(), Some("42"));
    assert_eq!(received.lock().unwrap()[2].0.as_deref(), Some("srv-1"));
}
