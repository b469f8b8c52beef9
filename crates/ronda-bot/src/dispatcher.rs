//! Command dispatch against the session, access list, and responder.
//!
//! One message in, at most one handled command out. Denials and failures
//! all turn into chat replies; the only errors that leave this module are
//! reply-send failures, which the runner logs and drops so the loop keeps
//! running.

use tracing::warn;

use ronda_access::{AccessError, AccessManager, AccessStore};
use ronda_ai::{AiError, Responder, FALLBACK_REPLY};
use ronda_channel::{ChannelError, GroupMessage, SessionClient};

use crate::commands::{classify, help_text, Command, Moderation};

/// Denial for senders outside the access list.
pub const REPLY_NOT_AUTHORIZED: &str =
    "You don't have access. Send !access to request a code.";

/// Denial when the bot account is not a group admin.
pub const REPLY_BOT_NOT_ADMIN: &str = "I need to be a group admin to do that.";

/// Ack for a successful activation.
pub const REPLY_ACCESS_GRANTED: &str = "Access granted. You can use the bot now.";

/// Ack for a successful self-revocation.
pub const REPLY_ACCESS_REVOKED: &str = "Access revoked.";

/// Shown when `!accesslist` finds nothing.
pub const REPLY_LIST_EMPTY: &str = "The access list is empty.";

/// Routes classified commands to the access manager, the responder, or the
/// session gateway. Owned by the runner; all mutation happens on its
/// single-consumer path.
pub struct Dispatcher<S, R, St>
where
    S: SessionClient,
    R: Responder,
    St: AccessStore,
{
    session: S,
    responder: R,
    access: AccessManager<St>,
    trigger: String,
}

impl<S, R, St> Dispatcher<S, R, St>
where
    S: SessionClient,
    R: Responder,
    St: AccessStore,
{
    pub fn new(session: S, responder: R, access: AccessManager<St>, trigger: String) -> Self {
        Self {
            session,
            responder,
            access,
            trigger,
        }
    }

    /// Handle one inbound message to completion.
    ///
    /// Direct (non-group) messages and unrecognized text are ignored
    /// without a reply.
    pub async fn handle(&mut self, msg: &GroupMessage) -> Result<(), ChannelError> {
        if !msg.is_group {
            return Ok(());
        }
        let Some(command) = classify(&msg.body, &self.trigger) else {
            return Ok(());
        };

        match command {
            Command::Help => self.session.reply(&msg.chat_id, &help_text(&self.trigger)).await,
            Command::Query { prompt } => self.handle_query(msg, &prompt).await,
            Command::RequestAccess => self.handle_request_access(msg).await,
            Command::Activate { code } => self.handle_activate(msg, code.as_deref()).await,
            Command::Revoke => self.handle_revoke(msg).await,
            Command::AccessList => self.handle_access_list(msg).await,
            Command::Moderate(action) => self.handle_moderation(msg, action).await,
        }
    }

    async fn handle_query(&self, msg: &GroupMessage, prompt: &str) -> Result<(), ChannelError> {
        if !self.access.has_access(&msg.sender) {
            warn!(sender = %msg.sender, "query denied: not authorized");
            return self.session.reply(&msg.chat_id, REPLY_NOT_AUTHORIZED).await;
        }

        let reply = match self.responder.answer(prompt).await {
            Ok(text) => text,
            Err(AiError::AllModelsFailed(n)) => {
                warn!(models = n, "all models failed, sending fallback reply");
                FALLBACK_REPLY.to_string()
            }
            Err(e) => {
                warn!(error = %e, "query failed, sending fallback reply");
                FALLBACK_REPLY.to_string()
            }
        };
        self.session.reply(&msg.chat_id, &reply).await
    }

    async fn handle_request_access(&mut self, msg: &GroupMessage) -> Result<(), ChannelError> {
        let reply = match self.access.request_code(&msg.sender) {
            Ok(code) => format!("Your access code: {code}\nActivate it with !activate {code}"),
            Err(e) => access_error_reply(e),
        };
        self.session.reply(&msg.chat_id, &reply).await
    }

    async fn handle_activate(
        &mut self,
        msg: &GroupMessage,
        code: Option<&str>,
    ) -> Result<(), ChannelError> {
        let reply = match self.access.activate(&msg.sender, code) {
            Ok(()) => REPLY_ACCESS_GRANTED.to_string(),
            Err(e) => access_error_reply(e),
        };
        self.session.reply(&msg.chat_id, &reply).await
    }

    async fn handle_revoke(&mut self, msg: &GroupMessage) -> Result<(), ChannelError> {
        let reply = match self.access.revoke(&msg.sender) {
            Ok(()) => REPLY_ACCESS_REVOKED.to_string(),
            Err(e) => access_error_reply(e),
        };
        self.session.reply(&msg.chat_id, &reply).await
    }

    // The list is readable by anyone in the group; only using the bot
    // requires being on it.
    async fn handle_access_list(&self, msg: &GroupMessage) -> Result<(), ChannelError> {
        let entries = self.access.list();
        let reply = if entries.is_empty() {
            REPLY_LIST_EMPTY.to_string()
        } else {
            let mut out = String::from("Access list:");
            for (i, number) in entries.iter().enumerate() {
                out.push_str(&format!("\n{}. {number}", i + 1));
            }
            out
        };
        self.session.reply(&msg.chat_id, &reply).await
    }

    /// Shared path for everything that mutates the group. Bot-admin status
    /// is checked before the sender's access, then the command's own
    /// precondition, then the gateway call.
    async fn handle_moderation(
        &self,
        msg: &GroupMessage,
        command: Moderation,
    ) -> Result<(), ChannelError> {
        if !msg.bot_is_admin() {
            warn!(chat = %msg.chat_id, "moderation denied: bot is not a group admin");
            return self.session.reply(&msg.chat_id, REPLY_BOT_NOT_ADMIN).await;
        }
        if !self.access.has_access(&msg.sender) {
            warn!(sender = %msg.sender, "moderation denied: not authorized");
            return self.session.reply(&msg.chat_id, REPLY_NOT_AUTHORIZED).await;
        }

        if let Some(usage) = precondition_failure(&command, msg) {
            return self.session.reply(&msg.chat_id, usage).await;
        }

        let reply = match self.apply_moderation(msg, &command).await {
            Ok(ack) => ack.to_string(),
            Err(e) => {
                warn!(chat = %msg.chat_id, error = %e, "group mutation failed");
                format!("That didn't work: {e}")
            }
        };
        self.session.reply(&msg.chat_id, &reply).await
    }

    async fn apply_moderation(
        &self,
        msg: &GroupMessage,
        command: &Moderation,
    ) -> Result<&'static str, ChannelError> {
        match command {
            Moderation::Promote => {
                self.session.promote(&msg.chat_id, &msg.mentioned).await?;
                Ok("Promoted.")
            }
            Moderation::Demote => {
                self.session.demote(&msg.chat_id, &msg.mentioned).await?;
                Ok("Demoted.")
            }
            Moderation::Kick => {
                self.session
                    .remove_participants(&msg.chat_id, &msg.mentioned)
                    .await?;
                Ok("Removed.")
            }
            Moderation::SetDescription { text } => {
                self.session.set_description(&msg.chat_id, text).await?;
                Ok("Description updated.")
            }
            Moderation::SetPhoto => {
                // Presence checked in precondition_failure.
                if let Some(media) = &msg.media {
                    self.session
                        .set_picture(&msg.chat_id, &media.mimetype, &media.data_base64)
                        .await?;
                }
                Ok("Photo updated.")
            }
            Moderation::AdminOnly => {
                self.session.set_admins_only(&msg.chat_id, true).await?;
                Ok("Only admins can send messages now.")
            }
            Moderation::OpenChat => {
                self.session.set_admins_only(&msg.chat_id, false).await?;
                Ok("Everyone can send messages now.")
            }
        }
    }
}

/// Usage hint when a moderation command is missing its input.
fn precondition_failure(command: &Moderation, msg: &GroupMessage) -> Option<&'static str> {
    match command {
        Moderation::Promote if msg.mentioned.is_empty() => {
            Some("Mention the members to promote, e.g. !promote @member.")
        }
        Moderation::Demote if msg.mentioned.is_empty() => {
            Some("Mention the members to demote, e.g. !demote @member.")
        }
        Moderation::Kick if msg.mentioned.is_empty() => {
            Some("Mention the members to remove, e.g. !kick @member.")
        }
        Moderation::SetDescription { text } if text.trim().is_empty() => {
            Some("Add the new description, e.g. !desc Weekly planning group.")
        }
        Moderation::SetPhoto if msg.media.is_none() => {
            Some("Attach an image to the !photo command.")
        }
        _ => None,
    }
}

/// Map an access error to its chat reply.
fn access_error_reply(error: AccessError) -> String {
    match error {
        AccessError::MissingCode => "Usage: !activate ACCESS-XXXXXX".to_string(),
        AccessError::AlreadyAuthorized => "You're already authorized.".to_string(),
        AccessError::QuotaExceeded(max) => {
            format!("The access list is full ({max} numbers max).")
        }
        AccessError::InvalidCodeFormat => {
            "That code doesn't look right. Codes start with ACCESS-.".to_string()
        }
        AccessError::CodeMismatch => {
            "That code doesn't match the one issued to you.".to_string()
        }
        AccessError::NotAuthorized => "You're not on the access list.".to_string(),
        AccessError::Store(e) => {
            warn!(error = %e, "access list persistence failed");
            "Couldn't save the access list. Try again later.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ronda_access::StoreError;

    #[test]
    fn access_error_replies_are_user_readable() {
        assert_eq!(
            access_error_reply(AccessError::MissingCode),
            "Usage: !activate ACCESS-XXXXXX"
        );
        assert_eq!(
            access_error_reply(AccessError::QuotaExceeded(5)),
            "The access list is full (5 numbers max)."
        );
        assert!(access_error_reply(AccessError::Store(StoreError::Duplicate(
            "0812".into()
        )))
        .contains("Try again later"));
    }

    #[test]
    fn preconditions_only_fire_when_input_is_missing() {
        let mut msg = GroupMessage {
            chat_id: "g@g.us".into(),
            is_group: true,
            sender: "s@c.us".into(),
            body: String::new(),
            mentioned: vec![],
            participants: vec![],
            media: None,
        };

        assert!(precondition_failure(&Moderation::Kick, &msg).is_some());
        assert!(precondition_failure(&Moderation::SetPhoto, &msg).is_some());
        assert!(precondition_failure(
            &Moderation::SetDescription { text: "  ".into() },
            &msg
        )
        .is_some());

        msg.mentioned.push("x@c.us".into());
        assert!(precondition_failure(&Moderation::Kick, &msg).is_none());
        assert!(precondition_failure(&Moderation::AdminOnly, &msg).is_none());
    }
}
