//! Gateway: the HTTP trigger that hosts the relay.
//!
//! Chatwoot posts each webhook event here; the handler runs one relay invocation and
//! answers with a status code once every reply item has been dispatched.

mod server;

pub use server::{build_bridge, router, run_gateway, serve, GatewayState};
