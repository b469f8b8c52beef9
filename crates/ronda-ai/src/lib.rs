//! Gemini-backed answering for chat queries.
//!
//! [`gemini`] holds the wire types for the generateContent endpoint and
//! API-key resolution from the environment. [`responder`] wraps them in a
//! [`Responder`] implementation that walks a model preference list,
//! falling to the next model when one fails.

pub mod gemini;
pub mod responder;

pub use gemini::{read_api_key, GeminiContent, GeminiPart, GeminiRequest, GeminiResponse};
pub use responder::{AiError, QueryResponder, Responder, FALLBACK_REPLY};
