//! Command classification, dispatch, and the polling runner.

pub mod commands;
pub mod dispatcher;
pub mod runner;

pub use commands::{Command, Moderation};
pub use dispatcher::Dispatcher;
