//! Core types shared across all Ronda crates.
//!
//! Defines the configuration loaded from `ronda.toml`, phone-number
//! normalization, and the error type used by the store, channel, and
//! AI layers.

pub mod config;
pub mod error;
pub mod msisdn;

pub use config::{AiConfig, BotConfig, GatewayConfig, PersonaConfig, CONFIG_FILENAME};
pub use error::RondaError;
pub use msisdn::{alternate, lookup_forms, normalize};
