//! Error types shared across all Ronda crates.

/// Errors from shared concerns: configuration loading, validation, and
/// environment lookups. Subsystems carry their own error enums; this one
/// covers what they all depend on.
#[derive(Debug, thiserror::Error)]
pub enum RondaError {
    #[error("configuration error: {0}")]
    ConfigError(String),
}
