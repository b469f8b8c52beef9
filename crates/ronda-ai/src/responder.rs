//! Query answering with sequential model fallback.
//!
//! [`QueryResponder`] tries each configured model in order and returns the
//! first non-empty answer. A failed attempt (transport error, non-success
//! status, unparseable or empty body) is logged and the next model is
//! tried; only when every model fails does the caller see an error.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use ronda_types::{AiConfig, PersonaConfig, RondaError};

use crate::gemini::{generate_content_url, read_api_key, GeminiRequest, GeminiResponse};

/// Connect timeout for Gemini requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Total per-request timeout, covering the full response body.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Reply shown to users when every model attempt fails.
pub const FALLBACK_REPLY: &str =
    "Sorry, I can't answer that right now. Please try again in a moment.";

/// Errors from the answering pipeline.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error(transparent)]
    Config(#[from] RondaError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("all {0} configured models failed")]
    AllModelsFailed(usize),
}

/// Anything that can turn a user prompt into a reply.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn answer(&self, prompt: &str) -> Result<String, AiError>;
}

/// Gemini-backed [`Responder`] over an ordered model preference list.
pub struct QueryResponder {
    client: reqwest::Client,
    config: AiConfig,
    models: Vec<String>,
    persona: PersonaConfig,
}

impl QueryResponder {
    pub fn new(
        config: AiConfig,
        models: Vec<String>,
        persona: PersonaConfig,
    ) -> Result<Self, AiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            config,
            models,
            persona,
        })
    }

    /// Prepend the persona instruction to the user's question.
    fn compose_prompt(&self, prompt: &str) -> String {
        if self.persona.instruction.is_empty() {
            prompt.to_string()
        } else {
            format!("{}\n\n{prompt}", self.persona.instruction)
        }
    }

    async fn ask_model(&self, model: &str, api_key: &str, prompt: &str) -> Option<String> {
        let url = generate_content_url(&self.config, model);
        let body = GeminiRequest::user_text(prompt);

        let result = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await;

        let response = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(model, error = %e, "model request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(model, status = %response.status(), "model returned error status");
            return None;
        }

        let parsed: GeminiResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                warn!(model, error = %e, "model response was not parseable");
                return None;
            }
        };

        match parsed.text_content() {
            Some(text) if !text.trim().is_empty() => Some(text),
            _ => {
                warn!(model, "model returned an empty answer");
                None
            }
        }
    }
}

#[async_trait]
impl Responder for QueryResponder {
    async fn answer(&self, prompt: &str) -> Result<String, AiError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Ok(self.persona.empty_prompt.clone());
        }

        let api_key = read_api_key(&self.config)?;
        let full_prompt = self.compose_prompt(prompt);

        for model in &self.models {
            debug!(model, "asking model");
            if let Some(text) = self.ask_model(model, &api_key, &full_prompt).await {
                return Ok(text);
            }
        }

        Err(AiError::AllModelsFailed(self.models.len()))
    }
}
