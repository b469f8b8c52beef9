//! Gemini API wire types and key resolution.
//!
//! Request/response types for the generateContent endpoint. The API key is
//! never stored in configuration; [`AiConfig::api_key_env`] names the
//! environment variable holding it, with `GEMINI_API_KEY` as a fallback
//! when the primary is left at its default. Response text is sanitized to
//! strip control characters before it reaches a chat reply.

use serde::{Deserialize, Serialize};

use ronda_types::{AiConfig, RondaError};

/// Fallback environment variable for the Gemini API key.
pub const FALLBACK_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Primary environment variable, matching the `AiConfig` default.
pub const DEFAULT_API_KEY_ENV: &str = "GOOGLE_AI_API_KEY";

// ---------------------------------------------------------------------------
// API key resolution
// ---------------------------------------------------------------------------

/// Read the API key from the configured environment variable.
///
/// Tries the primary `api_key_env` first, then falls back to
/// `GEMINI_API_KEY` if the primary is the default and not set.
pub fn read_api_key(config: &AiConfig) -> Result<String, RondaError> {
    match std::env::var(&config.api_key_env) {
        Ok(key) if !key.is_empty() => return Ok(key),
        _ => {}
    }

    if config.api_key_env == DEFAULT_API_KEY_ENV {
        match std::env::var(FALLBACK_API_KEY_ENV) {
            Ok(key) if !key.is_empty() => return Ok(key),
            _ => {}
        }
    }

    Err(RondaError::ConfigError(format!(
        "environment variable '{}' not set (required for Gemini API key)",
        config.api_key_env
    )))
}

/// Build the generateContent URL for a model.
pub fn generate_content_url(config: &AiConfig, model: &str) -> String {
    format!(
        "{}/v1beta/models/{model}:generateContent",
        config.endpoint_url.trim_end_matches('/')
    )
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// A request to the Gemini generateContent endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
}

impl GeminiRequest {
    /// A single-turn user request carrying one text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: "user".into(),
                parts: vec![GeminiPart::Text(text.into())],
            }],
        }
    }
}

/// A content block in a Gemini conversation (role + parts).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent {
    /// The role: "user" or "model".
    pub role: String,
    pub parts: Vec<GeminiPart>,
}

/// A single part within a content block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GeminiPart {
    #[serde(rename = "text")]
    Text(String),
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Response from the generateContent endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

/// A single candidate response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    pub content: GeminiContent,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl GeminiResponse {
    /// Extract all text content from the first candidate, sanitized.
    /// Returns `None` when the candidate carries no text parts.
    pub fn text_content(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let texts: Vec<&str> = candidate
            .content
            .parts
            .iter()
            .map(|GeminiPart::Text(t)| t.as_str())
            .collect();

        if texts.is_empty() {
            None
        } else {
            Some(sanitize_text(&texts.join("")))
        }
    }
}

/// Strip ASCII control characters, preserving common whitespace.
fn sanitize_text(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
        .collect()
}
