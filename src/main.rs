mod clock;
mod config;
mod language;
mod payload;
mod platform;
mod relay;
mod slack;
mod translate;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::relay::Relay;
use crate::slack::webhook::WebhookClient;
use crate::translate::GoogleTranslator;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,relaybot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Credentials may come from a local .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("relay.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Target channel: {}", config.discord.target_channel_id);
    info!("  Translation target: {}", config.translation.target_language);
    info!(
        "  Display zone: UTC{:+} ({})",
        config.display.utc_offset_hours, config.display.zone_label
    );
    info!("  Missing guild policy: {}", config.relay.missing_guild);

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http.timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    let translator = Arc::new(GoogleTranslator::new(http.clone(), &config.translation));
    let delivery = Arc::new(WebhookClient::new(http, config.slack.webhook_url.clone()));
    let relay = Arc::new(Relay::new(&config, translator, delivery)?);

    // Run the Discord listener
    info!("Relay is starting...");
    platform::discord::run(&config.discord.token, relay).await?;

    Ok(())
}
