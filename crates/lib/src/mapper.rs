//! Reshape one bot reply item into a support-platform message, translating every
//! human-readable field. URLs are never translated.

use crate::bot::{BotResponse, ReplyKind};
use crate::channels::{CardAction, CardItem, ChoiceItem, OutboundMessage};
use crate::error::BridgeError;
use crate::translate::{LanguageContext, Translator};

/// Map `item` by its reply kind. Returns `Ok(None)` for kinds with no support-platform shape.
pub async fn map_reply(
    translator: &dyn Translator,
    item: &BotResponse,
    lang: &LanguageContext,
) -> Result<Option<OutboundMessage>, BridgeError> {
    let message = match item.reply_kind() {
        ReplyKind::Text => {
            OutboundMessage::text(lang.translate(translator, item.text_or_empty()).await?)
        }
        ReplyKind::SingleChoice => {
            let mut items = Vec::with_capacity(item.choices.len());
            for choice in &item.choices {
                items.push(ChoiceItem {
                    title: lang.translate(translator, &choice.title).await?,
                    value: lang.translate(translator, &choice.value).await?,
                });
            }
            let content = lang.translate(translator, item.text_or_empty()).await?;
            OutboundMessage::choices(content, items)
        }
        ReplyKind::Card => {
            let title = lang
                .translate(translator, item.title.as_deref().unwrap_or(""))
                .await?;
            let description = lang
                .translate(translator, item.subtitle.as_deref().unwrap_or(""))
                .await?;
            let action = match item.actions.first() {
                Some(a) => CardAction::link(
                    lang.translate(translator, &a.title).await?,
                    a.url.clone().unwrap_or_default(),
                ),
                None => CardAction::postback_placeholder(),
            };
            // Title is repeated at message level so previews have something to render.
            let card = CardItem {
                title: title.clone(),
                description,
                media_url: item.image.clone().unwrap_or_default(),
                actions: vec![action],
            };
            OutboundMessage::cards(title, vec![card])
        }
        ReplyKind::Other(kind) => {
            log::warn!("mapper: no mapping for bot reply type {:?}, skipping", kind);
            return Ok(None);
        }
    };
    Ok(Some(message))
}
