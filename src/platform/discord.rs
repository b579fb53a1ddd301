use std::sync::Arc;

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use serenity::all::{
    Channel as SerenityChannel, Client, Context, EventHandler, GatewayIntents, Message, Ready,
};
use serenity::async_trait;
use tracing::{debug, info};

use crate::platform::{Attachment, Author, Channel, InboundMessage};
use crate::relay::Relay;

/// Gateway event handler that feeds Discord messages into the relay.
pub struct DiscordHandler {
    relay: Arc<Relay>,
}

impl DiscordHandler {
    pub fn new(relay: Arc<Relay>) -> Self {
        Self { relay }
    }

    /// Required gateway intents for the bot.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
    }
}

/// Snapshot a serenity message. The channel name is filled in later,
/// only for messages that qualify.
fn convert_message(msg: &Message) -> InboundMessage {
    let created_at = DateTime::<Utc>::from_timestamp(
        msg.timestamp.unix_timestamp(),
        msg.timestamp.nanosecond(),
    )
    .unwrap_or_else(Utc::now);

    let display_name = msg
        .member
        .as_ref()
        .and_then(|member| member.nick.clone())
        .unwrap_or_else(|| msg.author.display_name().to_string());

    InboundMessage {
        id: msg.id.get(),
        author: Author {
            is_bot: msg.author.bot,
            display_name,
        },
        channel: Channel {
            id: msg.channel_id.get(),
            name: msg.channel_id.to_string(),
        },
        guild_id: msg.guild_id.map(|g| g.get()),
        created_at,
        text: msg.content.clone(),
        attachments: msg
            .attachments
            .iter()
            .map(|att| Attachment {
                url: att.url.clone(),
                filename: att.filename.clone(),
                size: u64::from(att.size),
                content_type: att.content_type.clone(),
            })
            .collect(),
    }
}

/// Channel name from the cache or the API; `None` if neither knows it.
async fn channel_name(ctx: &Context, msg: &Message) -> Option<String> {
    match msg.channel(ctx).await {
        Ok(SerenityChannel::Guild(channel)) => Some(channel.name),
        Ok(_) => None,
        Err(e) => {
            debug!(channel_id = %msg.channel_id, error = %e, "Could not resolve channel name");
            None
        }
    }
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            bot_name = %ready.user.name,
            target_channel_id = self.relay.target_channel_id(),
            "Discord bot logged in, monitoring channel"
        );
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let mut inbound = convert_message(&msg);
        if !self.relay.qualifies(&inbound) {
            return;
        }

        if let Some(name) = channel_name(&ctx, &msg).await {
            inbound.channel.name = name;
        }

        self.relay.handle(inbound).await;
    }
}

/// Connect to the Discord gateway and relay messages until the client stops.
pub async fn run(token: &str, relay: Arc<Relay>) -> Result<()> {
    info!("Starting Discord platform...");

    let mut client = Client::builder(token, DiscordHandler::intents())
        .event_handler(DiscordHandler::new(relay))
        .await
        .context("Failed to create Discord client")?;

    client
        .start()
        .await
        .context("Discord client stopped with an error")?;

    Ok(())
}
