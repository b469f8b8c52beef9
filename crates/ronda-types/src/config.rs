//! Configuration types for a Ronda bot instance.
//!
//! [`BotConfig`] is the top-level configuration loaded from `ronda.toml`,
//! controlling the command trigger, persona, model fallback list, access
//! quota, super-admin numbers, access-file path, and gateway endpoint.
//! Every field carries a serde default so a partial (or empty) file works;
//! the API key is never part of the config; it is read from the
//! environment at call time.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::RondaError;
use crate::msisdn;

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "ronda.toml";

/// Default trigger token for AI queries.
pub const DEFAULT_TRIGGER: &str = "!query";

/// Default ordered model-fallback list.
pub const DEFAULT_MODELS: &[&str] = &[
    "gemini-2.0-flash-exp",
    "gemini-2.0-flash",
    "gemini-1.5-pro",
];

/// Default maximum number of access-list entries.
pub const DEFAULT_MAX_ACCESS: usize = 5;

/// Default path of the persisted access list.
pub const DEFAULT_ACCESS_FILE: &str = "authorized.json";

/// Persona settings prepended to every AI query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonaConfig {
    /// Display name the bot introduces itself with.
    #[serde(default = "default_persona_name")]
    pub name: String,

    /// System instruction prepended to every prompt.
    #[serde(default = "default_persona_instruction")]
    pub instruction: String,

    /// Prompt substituted when the user sends the trigger with no text.
    #[serde(default = "default_empty_prompt")]
    pub empty_prompt: String,
}

fn default_persona_name() -> String {
    "Ronda".to_string()
}

fn default_persona_instruction() -> String {
    "You are Ronda, a polite and helpful group assistant. \
     Answer clearly and keep replies short."
        .to_string()
}

fn default_empty_prompt() -> String {
    "Hi!".to_string()
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: default_persona_name(),
            instruction: default_persona_instruction(),
            empty_prompt: default_empty_prompt(),
        }
    }
}

/// Connection settings for the WhatsApp session gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Base URL of the gateway REST bridge.
    #[serde(default = "default_gateway_url")]
    pub base_url: String,

    /// Session name registered with the gateway.
    #[serde(default = "default_session")]
    pub session: String,

    /// Name of the environment variable holding the gateway API token,
    /// if the bridge requires one.
    #[serde(default)]
    pub api_token_env: Option<String>,

    /// Inbound poll interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_gateway_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_session() -> String {
    "default".to_string()
}

fn default_poll_interval_ms() -> u64 {
    500
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_gateway_url(),
            session: default_session(),
            api_token_env: None,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Settings for the generative-AI boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiConfig {
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base endpoint URL of the generative-language API.
    #[serde(default = "default_ai_endpoint")]
    pub endpoint_url: String,
}

fn default_api_key_env() -> String {
    "GOOGLE_AI_API_KEY".to_string()
}

fn default_ai_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            endpoint_url: default_ai_endpoint(),
        }
    }
}

/// Top-level configuration for a Ronda bot instance.
///
/// Loaded from `ronda.toml`; fixed at startup, not reloadable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BotConfig {
    /// Literal prefix a message must start with to be treated as an AI query.
    #[serde(default = "default_trigger")]
    pub trigger: String,

    /// Ordered model identifiers tried in sequence until one responds.
    #[serde(default = "default_models")]
    pub models: Vec<String>,

    /// Maximum number of access-list entries.
    #[serde(default = "default_max_access")]
    pub max_access: usize,

    /// Numbers with unconditional access, bypassing the access list.
    #[serde(default)]
    pub super_admins: Vec<String>,

    /// Path of the persisted access-list file.
    #[serde(default = "default_access_file")]
    pub access_file: PathBuf,

    /// Persona settings.
    #[serde(default)]
    pub persona: PersonaConfig,

    /// WhatsApp gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Generative-AI settings.
    #[serde(default)]
    pub ai: AiConfig,
}

fn default_trigger() -> String {
    DEFAULT_TRIGGER.to_string()
}

fn default_models() -> Vec<String> {
    DEFAULT_MODELS.iter().map(|m| m.to_string()).collect()
}

fn default_max_access() -> usize {
    DEFAULT_MAX_ACCESS
}

fn default_access_file() -> PathBuf {
    PathBuf::from(DEFAULT_ACCESS_FILE)
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            trigger: default_trigger(),
            models: default_models(),
            max_access: default_max_access(),
            super_admins: Vec::new(),
            access_file: default_access_file(),
            persona: PersonaConfig::default(),
            gateway: GatewayConfig::default(),
            ai: AiConfig::default(),
        }
    }
}

impl BotConfig {
    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, RondaError> {
        toml::from_str(content).map_err(|e| RondaError::ConfigError(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, RondaError> {
        toml::to_string_pretty(self).map_err(|e| RondaError::ConfigError(e.to_string()))
    }

    /// Validate invariants the serde layer cannot express.
    ///
    /// Checks that the trigger is a single non-empty token, that at least
    /// one model is configured, and that the access quota is non-zero.
    pub fn validate(&self) -> Result<(), RondaError> {
        if self.trigger.trim().is_empty() || self.trigger.contains(char::is_whitespace) {
            return Err(RondaError::ConfigError(format!(
                "trigger must be a single non-empty token, got {:?}",
                self.trigger
            )));
        }
        if self.models.is_empty() {
            return Err(RondaError::ConfigError(
                "at least one model must be configured".into(),
            ));
        }
        if self.max_access == 0 {
            return Err(RondaError::ConfigError(
                "max_access must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Super-admin numbers reduced to their canonical digit-only form.
    pub fn normalized_super_admins(&self) -> Vec<String> {
        self.super_admins
            .iter()
            .map(|n| msisdn::normalize(n))
            .filter(|n| !n.is_empty())
            .collect()
    }
}
