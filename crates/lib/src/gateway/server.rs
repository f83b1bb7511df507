//! Gateway HTTP server: health probe and the support-platform webhook.

use crate::config::{BridgeSettings, Config};
use crate::dispatch::HttpDispatcher;
use crate::error::BridgeError;
use crate::pipeline::{Bridge, RelayOutcome};
use crate::translate::{AwsTranslateClient, Translator};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Shared state for the gateway handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub bridge: Bridge,
}

/// Build the relay from config and environment: resolved settings, one AWS Translate client
/// for the process lifetime, and the HTTP dispatcher.
pub async fn build_bridge(config: &Config) -> Result<Bridge> {
    let settings = BridgeSettings::resolve(config)?;
    let region = settings
        .region
        .clone()
        .context("AWS region not configured (translation.region or AWS_REGION)")?;
    let translator: Arc<dyn Translator> = Arc::new(
        AwsTranslateClient::load(&region, settings.translate_endpoint.clone())
            .await
            .context("creating translate client")?,
    );
    log::info!(
        "bridge: bot {} at {}, support account {} at {}, translate region {}",
        settings.bot_id,
        settings.bot_base_url,
        settings.support_account_id,
        settings.support_base_url,
        region
    );
    Ok(Bridge::new(settings, translator, Arc::new(HttpDispatcher::new())))
}

/// Webhook route from config, always rooted at `/`.
fn webhook_route(config: &Config) -> String {
    let path = config.gateway.webhook_path.trim();
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Router for `GET /` (health) and `POST {webhookPath}`.
pub fn router(config: Config, bridge: Bridge) -> Router {
    let route = webhook_route(&config);
    let state = GatewayState {
        config: Arc::new(config),
        bridge,
    };
    Router::new()
        .route("/", get(health_http))
        .route(&route, post(webhook))
        .with_state(state)
}

/// Run the gateway with a relay built from config; binds to config.gateway.bind:config.gateway.port.
/// Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_gateway(config: Config) -> Result<()> {
    let bridge = build_bridge(&config).await?;
    serve(config, bridge).await
}

/// Serve an already-built relay. Blocks until shutdown.
pub async fn serve(config: Config, bridge: Bridge) -> Result<()> {
    let bind_addr = format!("{}:{}", config.gateway.bind.trim(), config.gateway.port);
    let route = webhook_route(&config);
    let app = router(config, bridge);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {} (webhook {})", bind_addr, route);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining in-flight webhooks");
}

/// POST {webhookPath}: relays one event. 200 when processed or ignored, 400 for a malformed
/// body, 502 when the bot engine call fails.
///
/// The relay runs on its own task so a caller that disconnects does not cut delivery short.
async fn webhook(State(state): State<GatewayState>, body: Bytes) -> StatusCode {
    let bridge = state.bridge.clone();
    let relay = tokio::spawn(async move { bridge.handle(&body).await });
    let result = match relay.await {
        Ok(result) => result,
        Err(e) => {
            log::error!("webhook: relay task failed: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };
    match result {
        Ok(RelayOutcome::Ignored(reason)) => {
            log::debug!("webhook: ignored ({:?})", reason);
            StatusCode::OK
        }
        Ok(outcome) => {
            log::debug!("webhook: {:?}", outcome);
            StatusCode::OK
        }
        Err(e @ BridgeError::InvalidEvent(_)) => {
            log::warn!("webhook: {}", e);
            StatusCode::BAD_REQUEST
        }
        Err(e) => {
            log::error!("webhook: relay failed: {}", e);
            StatusCode::BAD_GATEWAY
        }
    }
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.gateway.port,
        "webhook": webhook_route(&state.config),
    }))
}
