// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Full-stack flow: real SQLite storage, WAHA and Gemini served by wiremock.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use bolso_config::BolsoConfig;
use bolso_core::StorageAdapter;
use bolso_core::types::AccountLink;
use bolso_gateway::{GatewayState, HealthState, build_router};
use bolso_gemini::GeminiProvider;
use bolso_intake::Dispatcher;
use bolso_storage::SqliteStorage;
use bolso_waha::WahaChannel;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SENDER: &str = "226744275624053@lid";

struct Stack {
    router: Router,
    storage: Arc<SqliteStorage>,
    waha: MockServer,
    gemini: MockServer,
    _dir: tempfile::TempDir,
}

async fn stack() -> Stack {
    let dir = tempfile::tempdir().unwrap();
    let waha = MockServer::start().await;
    let gemini = MockServer::start().await;

    let mut config = BolsoConfig::default();
    config.waha.api_url = waha.uri();
    config.gemini.base_url = gemini.uri();
    config.gemini.api_key = Some("test-key".into());
    config.storage.database_path = dir.path().join("bolso.db").to_string_lossy().into_owned();

    Mock::given(method("POST"))
        .and(path("/api/sendText"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "true_1@lid_X" })))
        .mount(&waha)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/sessions/default"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "default",
            "status": "WORKING"
        })))
        .mount(&waha)
        .await;

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()).unwrap());
    storage.initialize().await.unwrap();
    let channel = Arc::new(WahaChannel::new(&config.waha).unwrap());
    let provider = Arc::new(GeminiProvider::new(&config.gemini).unwrap());

    let dispatcher = Dispatcher::new(
        channel.clone(),
        channel.clone(),
        provider,
        storage.clone(),
        &config,
    )
    .unwrap();
    let router = build_router(GatewayState {
        dispatcher: Arc::new(dispatcher),
        health: HealthState {
            storage: storage.clone(),
            channel,
            prometheus_render: None,
        },
    });

    Stack {
        router,
        storage,
        waha,
        gemini,
        _dir: dir,
    }
}

async fn call(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn webhook(body: &str) -> Request<Body> {
    let event = json!({
        "event": "message",
        "session": "default",
        "payload": {
            "id": "false_226744275624053@lid_3EB0",
            "timestamp": 1760000000,
            "from": SENDER,
            "fromMe": false,
            "body": body,
            "hasMedia": false,
            "type": "chat"
        }
    });
    Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .body(Body::from(event.to_string()))
        .unwrap()
}

async fn sent_texts(waha: &MockServer) -> Vec<Value> {
    waha.received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == "/api/sendText")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn link_then_record_expense() {
    let s = stack().await;
    s.storage
        .insert_link(&AccountLink {
            id: "link-1".into(),
            account_id: "acct-1".into(),
            phone_number: "5511999999999".into(),
            linked_id: None,
            verification_code: Some("ABC123".into()),
            verification_expires_at: Some(Utc::now() + Duration::minutes(10)),
            linked_at: None,
        })
        .await
        .unwrap();

    let (status, body) = call(&s.router, webhook("abc123")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "verified": true }));

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": "{\"transactions\": [{\"description\": \"Uber\", \"amount\": 50, \"type\": \"expense\", \"category\": \"variable_transport\"}], \"confidence\": 0.95}" }]
                },
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&s.gemini)
        .await;

    let (status, body) = call(&s.router, webhook("gastei 50 no uber")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "processed": true, "stored": 1 }));

    let sent = sent_texts(&s.waha).await;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0]["chatId"], SENDER);
    assert!(sent[0]["text"].as_str().unwrap().contains("vinculado com sucesso"));
    assert_eq!(sent[1]["text"], "✅ Transação registrada!\n\n💸 Uber: R$ 50,00");

    let stored = s.storage.list_transactions("acct-1").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].amount, 50.0);
    assert_eq!(stored[0].notes, "Criado via WhatsApp");

    let usage = s.storage.read_usage("acct-1").await.unwrap().unwrap();
    assert_eq!(usage.used, 1);
    assert_eq!(usage.limit, 30);
}

#[tokio::test]
async fn gemini_outage_degrades_to_nothing_extracted() {
    let s = stack().await;
    s.storage
        .insert_link(&AccountLink {
            id: "link-1".into(),
            account_id: "acct-1".into(),
            phone_number: "5511999999999".into(),
            linked_id: Some("226744275624053".into()),
            verification_code: None,
            verification_expires_at: None,
            linked_at: Some(Utc::now()),
        })
        .await
        .unwrap();
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&s.gemini)
        .await;

    let (status, body) = call(&s.router, webhook("gastei 50 no uber")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stored"], 0);
    let sent = sent_texts(&s.waha).await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0]["text"].as_str().unwrap().starts_with("Não consegui identificar"));
    assert!(s.storage.list_transactions("acct-1").await.unwrap().is_empty());
}

#[tokio::test]
async fn health_reports_working_session() {
    let s = stack().await;
    let (status, body) = call(
        &s.router,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["components"]["whatsapp"]["status"], "healthy");
    assert_eq!(body["components"]["storage"]["status"], "healthy");
}
