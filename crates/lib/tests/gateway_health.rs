//! Integration test: start the gateway on a free port next to a fake bot/support server,
//! probe GET /, and relay webhook events end to end over real HTTP.
//! Does not require Botpress, Chatwoot, or AWS. Server tasks are left running when each test ends.

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use lib::config::{BridgeSettings, Config};
use lib::dispatch::HttpDispatcher;
use lib::gateway;
use lib::pipeline::Bridge;
use lib::translate::{TranslateError, TranslateRequest, Translator};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

struct Upper;

#[async_trait]
impl Translator for Upper {
    async fn translate_text(&self, request: &TranslateRequest<'_>) -> Result<String, TranslateError> {
        Ok(request.text.to_uppercase())
    }
}

/// Upper-cases after a delay, so a relay outlasts a short client timeout.
struct SlowUpper;

#[async_trait]
impl Translator for SlowUpper {
    async fn translate_text(&self, request: &TranslateRequest<'_>) -> Result<String, TranslateError> {
        tokio::time::sleep(Duration::from_millis(300)).await;
        Ok(request.text.to_uppercase())
    }
}

/// Stand-in for Botpress and Chatwoot on one port.
#[derive(Clone, Default)]
struct Remote {
    converse: Arc<Mutex<Vec<(String, Value)>>>,
    posted: Arc<Mutex<Vec<(u64, Option<String>, Value)>>>,
}

async fn converse(
    State(remote): State<Remote>,
    Path((_bot, contact)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Json<Value> {
    remote.converse.lock().unwrap().push((contact, body));
    Json(json!({ "responses": [
        { "type": "text", "text": "hello" },
        { "type": "card", "title": "Plan", "subtitle": "Monthly", "image": "https://cdn/p.png" }
    ]}))
}

async fn messages(
    State(remote): State<Remote>,
    Path((_account, conversation)): Path<(u64, u64)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    let token = headers
        .get("api_access_token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    remote.posted.lock().unwrap().push((conversation, token, body));
    StatusCode::OK
}

async fn start_remote() -> (Remote, u16) {
    let remote = Remote::default();
    let app = Router::new()
        .route("/api/v1/bots/:bot/converse/:contact", post(converse))
        .route(
            "/api/v1/accounts/:account/conversations/:id/messages",
            post(messages),
        )
        .with_state(remote.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind remote");
    let port = listener.local_addr().expect("local_addr").port();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (remote, port)
}

fn settings(bot_port: u16, support_port: u16) -> BridgeSettings {
    BridgeSettings {
        bot_base_url: format!("http://127.0.0.1:{}", bot_port),
        bot_id: "helpdesk".to_string(),
        support_base_url: format!("http://127.0.0.1:{}", support_port),
        support_account_id: 1,
        support_token: "agent-bot-token".to_string(),
        source_language: "en".to_string(),
        terminology: None,
        region: None,
        translate_endpoint: None,
    }
}

/// Start the gateway and wait until GET / answers. Returns the health JSON and base URL.
async fn start_gateway(bridge: Bridge) -> (Value, String) {
    let port = free_port();
    let mut config = Config::default();
    config.gateway.port = port;
    config.gateway.bind = "127.0.0.1".to_string();
    tokio::spawn(async move {
        let _ = gateway::serve(config, bridge).await;
    });

    let base = format!("http://127.0.0.1:{}", port);
    let client = reqwest::Client::new();
    let mut last_err = None;
    for _ in 0..100 {
        match client.get(format!("{}/", base)).send().await {
            Ok(resp) if resp.status().is_success() => {
                let json: Value = resp.json().await.expect("parse JSON");
                return (json, base);
            }
            Ok(_) => {}
            Err(e) => last_err = Some(e),
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!(
        "GET {}/ did not return 200 within 5s; last error: {:?}",
        base, last_err
    );
}

fn text_event(language: &str) -> Value {
    json!({
        "event": "message_created",
        "message_type": "incoming",
        "content": "what plans do you have?",
        "content_type": "text",
        "content_attributes": {},
        "conversation": {
            "id": 77,
            "status": "pending",
            "meta": { "sender": { "name": "Jane Doe", "custom_attributes": { "language": language } } }
        }
    })
}

#[tokio::test]
async fn gateway_health_http_responds_with_running() {
    let (_remote, remote_port) = start_remote().await;
    let bridge = Bridge::new(
        settings(remote_port, remote_port),
        Arc::new(Upper),
        Arc::new(HttpDispatcher::new()),
    );
    let (json, base) = start_gateway(bridge).await;
    assert_eq!(json.get("runtime").and_then(|v| v.as_str()), Some("running"));
    assert_eq!(json.get("webhook").and_then(|v| v.as_str()), Some("/webhook"));
    let port = base.rsplit(':').next().and_then(|p| p.parse::<u64>().ok());
    assert_eq!(json.get("port").and_then(|v| v.as_u64()), port);
}

#[tokio::test]
async fn webhook_relays_translated_replies_in_order() {
    let (remote, remote_port) = start_remote().await;
    let bridge = Bridge::new(
        settings(remote_port, remote_port),
        Arc::new(Upper),
        Arc::new(HttpDispatcher::new()),
    );
    let (_, base) = start_gateway(bridge).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/webhook", base))
        .json(&text_event("de"))
        .send()
        .await
        .expect("post webhook");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let converse = remote.converse.lock().unwrap().clone();
    assert_eq!(
        converse,
        vec![(
            "Jane Doe".to_string(),
            json!({"text": "what plans do you have?", "type": "text"})
        )]
    );

    let posted = remote.posted.lock().unwrap().clone();
    assert_eq!(posted.len(), 2);
    assert!(posted
        .iter()
        .all(|(conv, token, _)| *conv == 77 && token.as_deref() == Some("agent-bot-token")));
    assert_eq!(
        posted[0].2,
        json!({"message_type": "outgoing", "content": "HELLO", "content_type": "text"})
    );
    assert_eq!(posted[1].2["content"], "PLAN");
    assert_eq!(posted[1].2["content_attributes"]["items"][0]["media_url"], "https://cdn/p.png");
    assert_eq!(
        posted[1].2["content_attributes"]["items"][0]["actions"][0]["type"],
        "postback"
    );
}

#[tokio::test]
async fn webhook_status_codes_for_ignored_malformed_and_unreachable_bot() {
    let (remote, remote_port) = start_remote().await;
    let dead_port = free_port();
    let bridge = Bridge::new(
        settings(dead_port, remote_port),
        Arc::new(Upper),
        Arc::new(HttpDispatcher::new()),
    );
    let (_, base) = start_gateway(bridge).await;
    let client = reqwest::Client::new();
    let url = format!("{}/webhook", base);

    let mut outgoing = text_event("de");
    outgoing["message_type"] = json!("outgoing");
    let resp = client.post(&url).json(&outgoing).send().await.expect("post");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let resp = client
        .post(&url)
        .header("content-type", "application/json")
        .body("{\"message_type\": ")
        .send()
        .await
        .expect("post");
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);

    let resp = client.post(&url).json(&text_event("de")).send().await.expect("post");
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_GATEWAY);

    assert!(remote.posted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn relay_finishes_after_webhook_caller_disconnects() {
    let (remote, remote_port) = start_remote().await;
    let bridge = Bridge::new(
        settings(remote_port, remote_port),
        Arc::new(SlowUpper),
        Arc::new(HttpDispatcher::new()),
    );
    let (_, base) = start_gateway(bridge).await;

    // Three translations at 300ms each; the caller gives up long before that.
    let impatient = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .expect("client");
    let sent = impatient
        .post(format!("{}/webhook", base))
        .json(&text_event("de"))
        .send()
        .await;
    assert!(sent.is_err());

    let mut posted = Vec::new();
    for _ in 0..100 {
        posted = remote.posted.lock().unwrap().clone();
        if posted.len() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(posted.len(), 2, "replies posted after disconnect");
    assert_eq!(posted[0].2["content"], "HELLO");
    assert_eq!(posted[1].2["content"], "PLAN");
}
