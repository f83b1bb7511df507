//! Outbound message for the support platform (Chatwoot create-message API).

use super::inbound::ContentKind;
use crate::config::BridgeSettings;
use crate::dispatch::OutboundRequest;
use crate::error::BridgeError;
use serde::Serialize;

/// Body of `POST /api/v1/accounts/{account}/conversations/{id}/messages`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundMessage {
    pub message_type: &'static str,
    pub content: String,
    pub content_type: ContentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_attributes: Option<OutboundAttributes>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundAttributes {
    pub items: OutboundItems,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutboundItems {
    Choices(Vec<ChoiceItem>),
    Cards(Vec<CardItem>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceItem {
    pub title: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardItem {
    pub title: String,
    pub description: String,
    pub media_url: String,
    pub actions: Vec<CardAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    pub uri: String,
    pub payload: String,
}

impl CardAction {
    pub fn link(text: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            kind: "link".to_string(),
            text: text.into(),
            uri: uri.into(),
            payload: String::new(),
        }
    }

    /// Empty postback button, used when the bot card has no action.
    pub fn postback_placeholder() -> Self {
        Self {
            kind: "postback".to_string(),
            text: String::new(),
            uri: String::new(),
            payload: String::new(),
        }
    }
}

const OUTGOING: &str = "outgoing";

impl OutboundMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            message_type: OUTGOING,
            content: content.into(),
            content_type: ContentKind::Text,
            content_attributes: None,
        }
    }

    pub fn choices(content: impl Into<String>, items: Vec<ChoiceItem>) -> Self {
        Self {
            message_type: OUTGOING,
            content: content.into(),
            content_type: ContentKind::InputSelect,
            content_attributes: Some(OutboundAttributes {
                items: OutboundItems::Choices(items),
            }),
        }
    }

    pub fn cards(content: impl Into<String>, cards: Vec<CardItem>) -> Self {
        Self {
            message_type: OUTGOING,
            content: content.into(),
            content_type: ContentKind::Cards,
            content_attributes: Some(OutboundAttributes {
                items: OutboundItems::Cards(cards),
            }),
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, BridgeError> {
        serde_json::to_vec(self).map_err(BridgeError::Encode)
    }
}

/// Build the create-message request for `conversation_id`, authenticated with the bot token.
pub fn build_support_request(
    settings: &BridgeSettings,
    conversation_id: u64,
    message: &OutboundMessage,
) -> Result<OutboundRequest, BridgeError> {
    let url = format!(
        "{}/api/v1/accounts/{}/conversations/{}/messages",
        settings.support_base_url, settings.support_account_id, conversation_id
    );
    Ok(OutboundRequest::json(url, message.to_json()?)
        .with_header("api_access_token", settings.support_token.as_str()))
}
