use std::sync::Arc;

use anyhow::Result;

use crate::clock::DisplayClock;
use crate::config::MissingGuildPolicy;
use crate::language::LanguageDetector;
use crate::platform::InboundMessage;
use crate::slack::{escape, Block, SlackMessage};
use crate::translate::{translate_if_needed, Translator};

const HEADER_TITLE: &str = "🔔 Discord Report Notification 🔔";
const EMPTY_CONTENT: &str = "(no content)";
const NONE: &str = "(none)";
const IMAGE_ALT_TEXT: &str = "attached image";
const LINK_LABEL: &str = "View original Discord message";

/// Turns one inbound message into one Slack notification.
pub struct PayloadBuilder {
    detector: LanguageDetector,
    translator: Arc<dyn Translator>,
    clock: DisplayClock,
    missing_guild: MissingGuildPolicy,
}

impl PayloadBuilder {
    pub fn new(
        detector: LanguageDetector,
        translator: Arc<dyn Translator>,
        clock: DisplayClock,
        missing_guild: MissingGuildPolicy,
    ) -> Self {
        Self {
            detector,
            translator,
            clock,
            missing_guild,
        }
    }

    /// Translate the body if needed, then lay out the notification.
    pub async fn build(&self, msg: &InboundMessage) -> Result<SlackMessage> {
        if msg.guild_id.is_none() && self.missing_guild != MissingGuildPolicy::OmitLink {
            anyhow::bail!("Message {} has no guild, cannot link to it", msg.id);
        }

        let translation =
            translate_if_needed(&self.detector, self.translator.as_ref(), &msg.text).await;
        Ok(self.compose(msg, translation.as_deref()))
    }

    fn compose(&self, msg: &InboundMessage, translation: Option<&str>) -> SlackMessage {
        let content = content_block(&msg.text, translation);

        let (images, files): (Vec<_>, Vec<_>) =
            msg.attachments.iter().partition(|att| att.is_image());

        let file_summaries: Vec<String> = files
            .iter()
            .map(|att| format!("<{}|{}> ({} bytes)", att.url, escape(&att.filename), att.size))
            .collect();

        let mut blocks = vec![
            Block::header(HEADER_TITLE),
            Block::fields([
                format!("*1. Channel:*\n🩴 {}", escape(&msg.channel.name)),
                format!("*2. Author:*\n{}", escape(&msg.author.display_name)),
            ]),
            Block::fields([format!("*3. Time:*\n{}", self.clock.format(msg.created_at))]),
            Block::Divider,
            Block::markdown(format!("*4. Content:*\n{}", content)),
        ];

        if file_summaries.is_empty() {
            blocks.push(Block::markdown(format!("*5. Attached files:*\n{}", NONE)));
        } else {
            blocks.push(Block::markdown(format!(
                "*5. Attached files:*\n📎 {}",
                file_summaries.join("\n📎 ")
            )));
        }

        if images.is_empty() {
            blocks.push(Block::markdown(format!("*6. Images/media:*\n{}", NONE)));
        } else {
            blocks.push(Block::markdown("*6. Images/media:*"));
            blocks.extend(
                images
                    .iter()
                    .map(|att| Block::image(att.url.clone(), IMAGE_ALT_TEXT)),
            );
        }

        if let Some(url) = msg.url() {
            blocks.push(Block::Divider);
            blocks.push(Block::markdown(format!("🔗 <{}|{}>", url, LINK_LABEL)));
        }

        SlackMessage { blocks }
    }
}

/// The body, paired with its translation when one is available.
fn content_block(body: &str, translation: Option<&str>) -> String {
    match translation {
        Some(translated) => format!(
            "original:\n{}\n\ntranslation:\n{}",
            escape(body),
            escape(translated)
        ),
        None if body.is_empty() => EMPTY_CONTENT.to_string(),
        None => escape(body),
    }
}
