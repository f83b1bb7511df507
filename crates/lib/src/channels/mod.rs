//! Support platform channel (Chatwoot).
//!
//! Inbound webhook events are parsed and gated here; outbound messages are shaped into
//! the create-message schema and turned into requests for the dispatcher.

mod inbound;
mod outbound;

pub use inbound::{
    parse_event, ContentAttributes, ContentKind, Conversation, CustomAttributes, InboundEvent,
    Meta, Sender, SubmittedValue,
};
pub use outbound::{
    build_support_request, CardAction, CardItem, ChoiceItem, OutboundAttributes, OutboundItems,
    OutboundMessage,
};
