use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ronda_access::{AccessManager, AccessStore, JsonAccessStore};
use ronda_ai::QueryResponder;
use ronda_bot::{runner, Dispatcher};
use ronda_channel::WhatsappGateway;
use ronda_types::{BotConfig, CONFIG_FILENAME};

/// Ronda -- WhatsApp group assistant with AI queries and access-gated
/// moderation.
#[derive(Parser, Debug)]
#[command(name = "ronda", version, about)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = CONFIG_FILENAME)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Connect to the gateway and run the bot (default)
    Start,

    /// Validate the configuration and print a summary
    Check,
}

fn load_config(path: &PathBuf) -> anyhow::Result<BotConfig> {
    let config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        BotConfig::from_toml(&content)?
    } else {
        info!(path = %path.display(), "config file not found, using defaults");
        BotConfig::default()
    };
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log level controlled via RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command.unwrap_or(Commands::Start) {
        Commands::Check => check(&config),
        Commands::Start => start(config).await,
    }
}

fn check(config: &BotConfig) -> anyhow::Result<()> {
    let store = JsonAccessStore::open(&config.access_file)
        .with_context(|| format!("opening access list {}", config.access_file.display()))?;

    println!("configuration OK");
    println!("  trigger:      {}", config.trigger);
    println!("  models:       {}", config.models.join(", "));
    println!(
        "  access file:  {} ({} entries)",
        config.access_file.display(),
        store.len()
    );
    println!("  max access:   {}", config.max_access);
    println!("  super admins: {}", config.super_admins.len());
    println!("  gateway:      {}", config.gateway.base_url);
    Ok(())
}

async fn start(config: BotConfig) -> anyhow::Result<()> {
    let store = JsonAccessStore::open(&config.access_file)
        .with_context(|| format!("opening access list {}", config.access_file.display()))?;
    let access = AccessManager::new(
        store,
        config.normalized_super_admins(),
        config.max_access,
    );

    let responder = QueryResponder::new(
        config.ai.clone(),
        config.models.clone(),
        config.persona.clone(),
    )?;

    let gateway = Arc::new(
        WhatsappGateway::new(&config.gateway).context("connecting to the session gateway")?,
    );

    let dispatcher = Dispatcher::new(
        Arc::clone(&gateway),
        responder,
        access,
        config.trigger.clone(),
    );

    runner::run(
        gateway,
        dispatcher,
        Duration::from_millis(config.gateway.poll_interval_ms),
    )
    .await;

    Ok(())
}
