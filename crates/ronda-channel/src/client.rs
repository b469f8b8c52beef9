//! The trait boundary between the dispatcher and WhatsApp.

use async_trait::async_trait;

/// Errors from the session gateway.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway API error: {0}")]
    Api(String),

    #[error("channel error: {0}")]
    Other(String),
}

/// Everything the bot asks the WhatsApp session to do.
///
/// Group-mutation calls return an error when the session lacks admin
/// rights or the gateway rejects the request; the dispatcher converts
/// those into user-visible replies rather than crashing the loop.
#[async_trait]
pub trait SessionClient: Send + Sync {
    /// Send a text reply into a chat.
    async fn reply(&self, chat_id: &str, text: &str) -> Result<(), ChannelError>;

    /// Grant group-admin rights to the given participants in one call.
    async fn promote(&self, chat_id: &str, participants: &[String])
        -> Result<(), ChannelError>;

    /// Remove group-admin rights from the given participants in one call.
    async fn demote(&self, chat_id: &str, participants: &[String])
        -> Result<(), ChannelError>;

    /// Remove the given participants from the group in one call.
    async fn remove_participants(
        &self,
        chat_id: &str,
        participants: &[String],
    ) -> Result<(), ChannelError>;

    /// Replace the group description.
    async fn set_description(&self, chat_id: &str, description: &str)
        -> Result<(), ChannelError>;

    /// Replace the group picture with base64-encoded image data.
    async fn set_picture(
        &self,
        chat_id: &str,
        mimetype: &str,
        data_base64: &str,
    ) -> Result<(), ChannelError>;

    /// Restrict sending to admins only (or lift the restriction).
    async fn set_admins_only(&self, chat_id: &str, admins_only: bool)
        -> Result<(), ChannelError>;
}

// The runner shares one gateway between message polling and the dispatcher.
#[async_trait]
impl<T: SessionClient> SessionClient for std::sync::Arc<T> {
    async fn reply(&self, chat_id: &str, text: &str) -> Result<(), ChannelError> {
        (**self).reply(chat_id, text).await
    }

    async fn promote(
        &self,
        chat_id: &str,
        participants: &[String],
    ) -> Result<(), ChannelError> {
        (**self).promote(chat_id, participants).await
    }

    async fn demote(
        &self,
        chat_id: &str,
        participants: &[String],
    ) -> Result<(), ChannelError> {
        (**self).demote(chat_id, participants).await
    }

    async fn remove_participants(
        &self,
        chat_id: &str,
        participants: &[String],
    ) -> Result<(), ChannelError> {
        (**self).remove_participants(chat_id, participants).await
    }

    async fn set_description(
        &self,
        chat_id: &str,
        description: &str,
    ) -> Result<(), ChannelError> {
        (**self).set_description(chat_id, description).await
    }

    async fn set_picture(
        &self,
        chat_id: &str,
        mimetype: &str,
        data_base64: &str,
    ) -> Result<(), ChannelError> {
        (**self).set_picture(chat_id, mimetype, data_base64).await
    }

    async fn set_admins_only(
        &self,
        chat_id: &str,
        admins_only: bool,
    ) -> Result<(), ChannelError> {
        (**self).set_admins_only(chat_id, admins_only).await
    }
}
