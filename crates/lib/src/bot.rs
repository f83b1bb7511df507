//! Bot engine (Botpress converse API): request builder and reply wire types.

use crate::config::BridgeSettings;
use crate::dispatch::OutboundRequest;
use crate::error::BridgeError;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/v1/bots/{botId}/converse/{contact}`.
#[derive(Debug, Serialize)]
struct ConverseRequest<'a> {
    text: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Converse response: ordered reply items for one customer turn.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BotReply {
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub responses: Vec<BotResponse>,
}

/// One reply item. Which fields are populated depends on `kind`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BotResponse {
    #[serde(rename = "type", default, deserialize_with = "crate::wire::null_as_default")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub choices: Vec<BotChoice>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub actions: Vec<BotAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BotChoice {
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BotAction {
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub action: String,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Reply item kinds the mapper knows how to reshape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyKind {
    Text,
    SingleChoice,
    Card,
    Other(String),
}

impl ReplyKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "text" => ReplyKind::Text,
            "single-choice" => ReplyKind::SingleChoice,
            "card" => ReplyKind::Card,
            other => ReplyKind::Other(other.to_string()),
        }
    }
}

impl BotResponse {
    pub fn reply_kind(&self) -> ReplyKind {
        ReplyKind::parse(&self.kind)
    }

    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// Build the converse request for `contact`. The contact is one encoded path segment.
pub fn build_bot_request(
    settings: &BridgeSettings,
    contact: &str,
    text: &str,
) -> Result<OutboundRequest, BridgeError> {
    let mut url = reqwest::Url::parse(&settings.bot_base_url)
        .map_err(|e| BridgeError::Url(format!("{}: {}", settings.bot_base_url, e)))?;
    url.path_segments_mut()
        .map_err(|_| BridgeError::Url(format!("{}: cannot be a base", settings.bot_base_url)))?
        .pop_if_empty()
        .extend(["api", "v1", "bots", settings.bot_id.as_str(), "converse", contact]);
    let body = serde_json::to_vec(&ConverseRequest { text, kind: "text" })
        .map_err(BridgeError::Encode)?;
    Ok(OutboundRequest::json(url.to_string(), body))
}

/// Parse a converse response body. Empty or malformed bodies are errors.
pub fn parse_bot_reply(body: &[u8]) -> Result<BotReply, BridgeError> {
    serde_json::from_slice(body).map_err(BridgeError::InvalidReply)
}
