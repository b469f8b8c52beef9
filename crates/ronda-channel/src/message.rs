//! Inbound message model as delivered by the session gateway.

use serde::{Deserialize, Serialize};

/// A group participant, with the flags the gateway reads from the group
/// metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Contact ID, e.g. `6281234567890@c.us`.
    pub id: String,
    #[serde(default)]
    pub is_admin: bool,
    /// Whether this entry is the bot's own account.
    #[serde(default)]
    pub is_me: bool,
}

/// Attached media, carried base64-encoded the way the gateway ships it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaPayload {
    pub mimetype: String,
    pub data_base64: String,
}

/// One inbound message. The gateway resolves chat metadata up front so the
/// dispatcher never has to make follow-up lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMessage {
    /// Chat ID the message arrived in (group or direct).
    pub chat_id: String,

    #[serde(default)]
    pub is_group: bool,

    /// Sender contact ID.
    pub sender: String,

    /// Message text, empty for pure-media messages.
    #[serde(default)]
    pub body: String,

    /// Contact IDs mentioned in the message.
    #[serde(default)]
    pub mentioned: Vec<String>,

    /// Group roster at delivery time; empty for direct chats.
    #[serde(default)]
    pub participants: Vec<Participant>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaPayload>,
}

impl GroupMessage {
    /// Whether the bot's own roster entry carries the admin flag.
    pub fn bot_is_admin(&self) -> bool {
        self.participants.iter().any(|p| p.is_me && p.is_admin)
    }
}
