//! Outbound HTTP dispatch: one prepared POST, one awaited response.
//!
//! [`HttpDispatcher`] hands the round-trip to a spawned task and waits on a oneshot
//! channel for its single result, so the caller never has more than one call in flight.

use crate::error::BridgeError;
use async_trait::async_trait;
use tokio::sync::oneshot;

/// A fully built POST with a JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl OutboundRequest {
    /// JSON POST to `url` with `Content-Type: application/json`.
    pub fn json(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and body of a completed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl DispatchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and yields its response. Transport failures are errors; HTTP status is not.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, request: OutboundRequest) -> Result<DispatchResponse, BridgeError>;
}

/// reqwest-backed dispatcher.
#[derive(Clone, Default)]
pub struct HttpDispatcher {
    client: reqwest::Client,
}

impl HttpDispatcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

async fn send(client: reqwest::Client, request: OutboundRequest) -> Result<DispatchResponse, BridgeError> {
    let mut req = client.post(&request.url);
    for (name, value) in &request.headers {
        req = req.header(name.as_str(), value.as_str());
    }
    let res = req.body(request.body).send().await?;
    let status = res.status().as_u16();
    let body = res.bytes().await?.to_vec();
    Ok(DispatchResponse { status, body })
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn dispatch(&self, request: OutboundRequest) -> Result<DispatchResponse, BridgeError> {
        let (tx, rx) = oneshot::channel();
        let client = self.client.clone();
        let url = request.url.clone();
        tokio::spawn(async move {
            let result = send(client, request).await;
            if tx.send(result).is_err() {
                log::debug!("dispatch: caller went away before response from {}", url);
            }
        });
        rx.await
            .map_err(|_| BridgeError::Dispatch("dispatch task ended without a response".to_string()))?
    }
}
