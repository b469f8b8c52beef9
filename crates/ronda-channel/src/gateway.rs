//! Raw HTTP calls to the WhatsApp session gateway.
//!
//! The gateway is a sidecar holding the logged-in WhatsApp session and
//! exposing it over REST. Every call posts JSON to
//! `{base_url}/api/{session}/{method}` and gets back the standard
//! `{ok, result, description}` envelope. An optional bearer token is read
//! from the environment variable named in the configuration, never stored
//! in the config file itself.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use ronda_types::GatewayConfig;

use crate::client::{ChannelError, SessionClient};
use crate::message::GroupMessage;

/// Connect timeout for gateway requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Total per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Response envelope used by every gateway endpoint. Absent `result` and
/// `description` keys deserialize as `None`.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

/// HTTP client for the session gateway.
pub struct WhatsappGateway {
    client: Client,
    base_url: String,
    token: Option<String>,
}

// The bearer token never appears in Debug output.
impl fmt::Debug for WhatsappGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhatsappGateway")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl WhatsappGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, ChannelError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let token = match &config.api_token_env {
            Some(var) => match std::env::var(var) {
                Ok(t) if !t.is_empty() => Some(t),
                _ => {
                    return Err(ChannelError::Other(format!(
                        "environment variable '{var}' not set (required for gateway auth)"
                    )))
                }
            },
            None => None,
        };

        Ok(Self {
            client,
            base_url: method_base(&config.base_url, &config.session),
            token,
        })
    }

    /// POST one gateway method, check the envelope, return the result.
    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<Option<T>, ChannelError> {
        debug!(method, "gateway call");

        let mut request = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;
        let envelope: ApiResponse<T> = resp.json().await?;
        if !envelope.ok {
            let desc = envelope.description.unwrap_or_default();
            warn!(method, "gateway call failed: {desc}");
            return Err(ChannelError::Api(desc));
        }

        Ok(envelope.result)
    }

    /// Fetch messages queued since the last poll.
    pub async fn fetch_messages(&self) -> Result<Vec<GroupMessage>, ChannelError> {
        let messages: Option<Vec<GroupMessage>> =
            self.call("messages", json!({})).await?;
        Ok(messages.unwrap_or_default())
    }
}

#[async_trait]
impl SessionClient for WhatsappGateway {
    async fn reply(&self, chat_id: &str, text: &str) -> Result<(), ChannelError> {
        self.call::<serde_json::Value>(
            "send-message",
            json!({"chatId": chat_id, "text": text}),
        )
        .await?;
        Ok(())
    }

    async fn promote(
        &self,
        chat_id: &str,
        participants: &[String],
    ) -> Result<(), ChannelError> {
        self.call::<serde_json::Value>(
            "group/promote",
            json!({"chatId": chat_id, "participantIds": participants}),
        )
        .await?;
        Ok(())
    }

    async fn demote(
        &self,
        chat_id: &str,
        participants: &[String],
    ) -> Result<(), ChannelError> {
        self.call::<serde_json::Value>(
            "group/demote",
            json!({"chatId": chat_id, "participantIds": participants}),
        )
        .await?;
        Ok(())
    }

    async fn remove_participants(
        &self,
        chat_id: &str,
        participants: &[String],
    ) -> Result<(), ChannelError> {
        self.call::<serde_json::Value>(
            "group/remove-participants",
            json!({"chatId": chat_id, "participantIds": participants}),
        )
        .await?;
        Ok(())
    }

    async fn set_description(
        &self,
        chat_id: &str,
        description: &str,
    ) -> Result<(), ChannelError> {
        self.call::<serde_json::Value>(
            "group/set-description",
            json!({"chatId": chat_id, "description": description}),
        )
        .await?;
        Ok(())
    }

    async fn set_picture(
        &self,
        chat_id: &str,
        mimetype: &str,
        data_base64: &str,
    ) -> Result<(), ChannelError> {
        self.call::<serde_json::Value>(
            "group/set-picture",
            json!({"chatId": chat_id, "mimetype": mimetype, "data": data_base64}),
        )
        .await?;
        Ok(())
    }

    async fn set_admins_only(
        &self,
        chat_id: &str,
        admins_only: bool,
    ) -> Result<(), ChannelError> {
        self.call::<serde_json::Value>(
            "group/set-admins-only",
            json!({"chatId": chat_id, "adminsOnly": admins_only}),
        )
        .await?;
        Ok(())
    }
}

/// Join base URL and session into the per-method prefix.
fn method_base(base_url: &str, session: &str) -> String {
    format!("{}/api/{session}", base_url.trim_end_matches('/'))
}
