//! Error kinds threaded through the relay pipeline.

use crate::translate::TranslateError;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("invalid inbound event: {0}")]
    InvalidEvent(#[source] serde_json::Error),
    #[error("invalid bot reply: {0}")]
    InvalidReply(#[source] serde_json::Error),
    #[error("encoding request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("invalid request url: {0}")]
    Url(String),
    #[error("translation failed: {0}")]
    Translate(#[from] TranslateError),
    #[error("dispatch failed: {0}")]
    Dispatch(String),
    #[error("bot engine returned {status}: {body}")]
    BotStatus { status: u16, body: String },
    #[error("support platform returned {status}: {body}")]
    SupportStatus { status: u16, body: String },
}

impl BridgeError {
    /// True when the whole invocation must stop; false when only the current reply item is lost.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BridgeError::InvalidEvent(_) | BridgeError::InvalidReply(_) | BridgeError::BotStatus { .. }
        )
    }
}

impl From<reqwest::Error> for BridgeError {
    fn from(e: reqwest::Error) -> Self {
        BridgeError::Dispatch(e.to_string())
    }
}
