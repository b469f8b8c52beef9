//! Message-to-command classification.
//!
//! Exactly one classification per message: the first whitespace token is
//! matched case-insensitively against the fixed vocabulary plus the
//! configured AI trigger. Anything else is not a command and the message
//! is ignored.

/// A classified inbound command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `!help` - command overview.
    Help,
    /// `!access` - request an access code.
    RequestAccess,
    /// `!activate <code>` - claim an access-list slot.
    Activate { code: Option<String> },
    /// `!revoke` - remove the sender's own number from the list.
    Revoke,
    /// `!accesslist` - display the access list.
    AccessList,
    /// Configured trigger - forward the remainder as an AI query.
    Query { prompt: String },
    /// A group-mutating command; these all share the admin gate.
    Moderate(Moderation),
}

/// The group-mutating subset of the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Moderation {
    /// `!promote` - grant admin to mentioned participants.
    Promote,
    /// `!demote` - drop admin from mentioned participants.
    Demote,
    /// `!kick` - remove mentioned participants.
    Kick,
    /// `!desc <text>` - replace the group description.
    SetDescription { text: String },
    /// `!photo` - set the group photo from attached media.
    SetPhoto,
    /// `!adminonly` - restrict messaging to admins.
    AdminOnly,
    /// `!all` - lift the admins-only restriction.
    OpenChat,
}

/// Classify a message body against the command vocabulary.
///
/// Returns `None` for anything that is not a recognized command.
pub fn classify(body: &str, trigger: &str) -> Option<Command> {
    let body = body.trim();
    let (token, rest) = match body.split_once(char::is_whitespace) {
        Some((t, r)) => (t, r.trim()),
        None => (body, ""),
    };
    if token.is_empty() {
        return None;
    }

    let token = token.to_lowercase();
    if token == trigger.to_lowercase() {
        return Some(Command::Query {
            prompt: rest.to_string(),
        });
    }

    match token.as_str() {
        "!help" => Some(Command::Help),
        "!access" => Some(Command::RequestAccess),
        "!activate" => Some(Command::Activate {
            code: rest
                .split_whitespace()
                .next()
                .map(str::to_string),
        }),
        "!revoke" => Some(Command::Revoke),
        "!accesslist" => Some(Command::AccessList),
        "!promote" => Some(Command::Moderate(Moderation::Promote)),
        "!demote" => Some(Command::Moderate(Moderation::Demote)),
        "!kick" => Some(Command::Moderate(Moderation::Kick)),
        "!desc" => Some(Command::Moderate(Moderation::SetDescription {
            text: rest.to_string(),
        })),
        "!photo" => Some(Command::Moderate(Moderation::SetPhoto)),
        "!adminonly" => Some(Command::Moderate(Moderation::AdminOnly)),
        "!all" => Some(Command::Moderate(Moderation::OpenChat)),
        _ => None,
    }
}

/// The `!help` reply.
pub fn help_text(trigger: &str) -> String {
    format!(
        "Commands:\n\
         {trigger} <question> - ask the AI\n\
         !access - request an access code\n\
         !activate <code> - activate your access\n\
         !revoke - give up your access\n\
         !accesslist - show who has access\n\
         !promote / !demote / !kick - moderate mentioned members\n\
         !desc <text> - set the group description\n\
         !photo - set the group photo from attached media\n\
         !adminonly - restrict messages to admins\n\
         !all - let everyone send messages"
    )
}
