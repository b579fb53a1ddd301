pub mod discord;

use chrono::{DateTime, Utc};

/// A message received from the source chat platform
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: u64,
    pub author: Author,
    pub channel: Channel,
    /// `None` for direct messages
    pub guild_id: Option<u64>,
    pub created_at: DateTime<Utc>,
    /// The message text; empty when the message only carries attachments
    pub text: String,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone)]
pub struct Author {
    pub is_bot: bool,
    pub display_name: String,
}

#[derive(Debug, Clone)]
pub struct Channel {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Attachment {
    pub url: String,
    pub filename: String,
    /// Size in bytes
    pub size: u64,
    /// MIME type as reported by the platform, if any
    pub content_type: Option<String>,
}

impl Attachment {
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image"))
    }
}

impl InboundMessage {
    /// Canonical link to the message, available only inside a guild.
    pub fn url(&self) -> Option<String> {
        self.guild_id.map(|guild_id| {
            format!(
                "https://discord.com/channels/{}/{}/{}",
                guild_id, self.channel.id, self.id
            )
        })
    }
}
