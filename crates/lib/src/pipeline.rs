//! Relay one webhook event: gate it, ask the bot, translate and post each reply in order.

use crate::bot::{build_bot_request, parse_bot_reply, BotResponse};
use crate::channels::{build_support_request, parse_event, ContentKind, InboundEvent};
use crate::config::BridgeSettings;
use crate::dispatch::Dispatcher;
use crate::error::BridgeError;
use crate::mapper::map_reply;
use crate::translate::{LanguageContext, Translator};
use std::sync::Arc;

/// Why an event was acknowledged without any outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Not an incoming customer message and no submitted selection.
    NotIncoming,
    /// Content kind with no bot mapping (e.g. `form`, `article`).
    UnsupportedContent(String),
    /// Text event without content, or a selection event without values.
    NothingToForward,
}

/// Result of a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Ignored(IgnoreReason),
    Relayed {
        /// Items posted to the support platform with a 2xx response.
        delivered: usize,
        /// Items lost to translation, transport, or non-2xx failures.
        failed: usize,
        /// Items whose reply kind has no support-platform shape.
        skipped: usize,
    },
}

/// The relay. Holds the settings, the shared translator and the dispatcher; cheap to clone.
#[derive(Clone)]
pub struct Bridge {
    settings: Arc<BridgeSettings>,
    translator: Arc<dyn Translator>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl Bridge {
    pub fn new(
        settings: BridgeSettings,
        translator: Arc<dyn Translator>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            translator,
            dispatcher,
        }
    }

    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    /// Parse a raw webhook body and relay it.
    pub async fn handle(&self, body: &[u8]) -> Result<RelayOutcome, BridgeError> {
        let event = parse_event(body)?;
        self.relay(&event).await
    }

    /// Relay a parsed event. Errors returned here abort the invocation; per-item failures are counted instead.
    pub async fn relay(&self, event: &InboundEvent) -> Result<RelayOutcome, BridgeError> {
        if !event.should_process() {
            log::debug!(
                "relay: ignoring {:?} event for conversation {}",
                event.message_type,
                event.conversation_id()
            );
            return Ok(RelayOutcome::Ignored(IgnoreReason::NotIncoming));
        }
        let text = match (event.content_kind(), event.forward_text()) {
            (ContentKind::Other(kind), _) => {
                log::info!(
                    "relay: content type {:?} has no bot mapping (conversation {})",
                    kind,
                    event.conversation_id()
                );
                return Ok(RelayOutcome::Ignored(IgnoreReason::UnsupportedContent(kind)));
            }
            (_, None) => {
                log::warn!(
                    "relay: nothing to forward for conversation {}",
                    event.conversation_id()
                );
                return Ok(RelayOutcome::Ignored(IgnoreReason::NothingToForward));
            }
            (_, Some(text)) => text,
        };

        let request = build_bot_request(&self.settings, event.contact(), text)?;
        log::info!(
            "relay: conversation {} -> bot (contact {:?})",
            event.conversation_id(),
            event.contact()
        );
        let response = self.dispatcher.dispatch(request).await?;
        if !response.is_success() {
            return Err(BridgeError::BotStatus {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }
        let reply = parse_bot_reply(&response.body)?;

        let lang = LanguageContext::new(
            self.settings.source_language.as_str(),
            event.target_language(),
            self.settings.terminology.clone(),
        );
        let (mut delivered, mut failed, mut skipped) = (0, 0, 0);
        for (index, item) in reply.responses.iter().enumerate() {
            match self.deliver(event.conversation_id(), item, &lang).await {
                Ok(true) => delivered += 1,
                Ok(false) => skipped += 1,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    log::warn!(
                        "relay: reply {} ({:?}) for conversation {} not delivered: {}",
                        index,
                        item.kind,
                        event.conversation_id(),
                        e
                    );
                    failed += 1;
                }
            }
        }
        log::info!(
            "relay: conversation {} done: {} delivered, {} failed, {} skipped",
            event.conversation_id(),
            delivered,
            failed,
            skipped
        );
        Ok(RelayOutcome::Relayed {
            delivered,
            failed,
            skipped,
        })
    }

    /// Map and post one reply item, waiting for the response. Ok(false) when the item has no mapping.
    async fn deliver(
        &self,
        conversation_id: u64,
        item: &BotResponse,
        lang: &LanguageContext,
    ) -> Result<bool, BridgeError> {
        let Some(message) = map_reply(self.translator.as_ref(), item, lang).await? else {
            return Ok(false);
        };
        let request = build_support_request(&self.settings, conversation_id, &message)?;
        let response = self.dispatcher.dispatch(request).await?;
        if !response.is_success() {
            return Err(BridgeError::SupportStatus {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }
        log::debug!(
            "relay: posted {} message to conversation {}",
            message.content_type.as_str(),
            conversation_id
        );
        Ok(true)
    }
}
