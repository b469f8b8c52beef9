//! WhatsApp connectivity through an external session gateway.
//!
//! The bot does not speak the WhatsApp protocol itself. A session gateway
//! (a sidecar process holding the logged-in session) exposes a small REST
//! API; [`WhatsappGateway`] wraps it and implements [`SessionClient`], the
//! trait the dispatcher is written against. Tests substitute a mock
//! `SessionClient` and never touch HTTP.

pub mod client;
pub mod gateway;
pub mod message;

pub use client::{ChannelError, SessionClient};
pub use gateway::WhatsappGateway;
pub use message::{GroupMessage, MediaPayload, Participant};
