//! Relay core library — support-platform webhook in, bot engine conversation, translated
//! replies back out. Used by the `relay` CLI.

pub mod bot;
pub mod channels;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod mapper;
pub mod pipeline;
pub mod translate;
mod wire;
