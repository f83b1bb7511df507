//! Inbound webhook event from the support platform (Chatwoot `message_created`).

use crate::error::BridgeError;
use serde::{Deserialize, Serialize};

/// Content kind tag shared by inbound events and outbound messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    InputSelect,
    Cards,
    Other(String),
}

impl ContentKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "text" => ContentKind::Text,
            "input_select" => ContentKind::InputSelect,
            "cards" => ContentKind::Cards,
            other => ContentKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ContentKind::Text => "text",
            ContentKind::InputSelect => "input_select",
            ContentKind::Cards => "cards",
            ContentKind::Other(s) => s.as_str(),
        }
    }
}

impl Serialize for ContentKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Webhook payload. Only the fields the relay reads are modelled; the rest is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundEvent {
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub message_type: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub content_type: String,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub content_attributes: ContentAttributes,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub conversation: Conversation,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentAttributes {
    /// Values the customer picked from a menu or card button.
    #[serde(default)]
    pub submitted_values: Option<Vec<SubmittedValue>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubmittedValue {
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Conversation {
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub id: u64,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub meta: Meta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub sender: Sender,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sender {
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub custom_attributes: CustomAttributes,
}

/// Contact custom attributes; `language` is the customer's preferred language code.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomAttributes {
    #[serde(default)]
    pub language: Option<String>,
}

/// Parse a webhook body.
pub fn parse_event(body: &[u8]) -> Result<InboundEvent, BridgeError> {
    serde_json::from_slice(body).map_err(BridgeError::InvalidEvent)
}

impl InboundEvent {
    pub fn is_incoming(&self) -> bool {
        self.message_type == "incoming"
    }

    pub fn submitted_values(&self) -> &[SubmittedValue] {
        self.content_attributes
            .submitted_values
            .as_deref()
            .unwrap_or(&[])
    }

    /// Incoming customer messages and menu/card selections are relayed; everything else is acknowledged only.
    pub fn should_process(&self) -> bool {
        self.is_incoming() || !self.submitted_values().is_empty()
    }

    pub fn content_kind(&self) -> ContentKind {
        ContentKind::parse(&self.content_type)
    }

    /// Text to send to the bot: the message for `text`, the first selection for `input_select`/`cards`.
    /// None for other kinds or a selection event without values.
    pub fn forward_text(&self) -> Option<&str> {
        match self.content_kind() {
            ContentKind::Text => self.content.as_deref(),
            ContentKind::InputSelect | ContentKind::Cards => {
                self.submitted_values().first().map(|v| v.value.as_str())
            }
            ContentKind::Other(_) => None,
        }
    }

    /// Contact identity used for the bot conversation.
    pub fn contact(&self) -> &str {
        &self.conversation.meta.sender.name
    }

    pub fn conversation_id(&self) -> u64 {
        self.conversation.id
    }

    /// Customer's language code, empty when unset.
    pub fn target_language(&self) -> &str {
        self.conversation
            .meta
            .sender
            .custom_attributes
            .language
            .as_deref()
            .unwrap_or("")
    }
}
