pub mod webhook;

use serde::{Deserialize, Serialize};

/// Slack caps `section` text at this many characters.
pub const MAX_SECTION_TEXT: usize = 3000;

/// A Block Kit message as accepted by an incoming webhook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlackMessage {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header {
        text: TextObject,
    },
    Section {
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<TextObject>,
        #[serde(skip_serializing_if = "Option::is_none")]
        fields: Option<Vec<TextObject>>,
    },
    Divider,
    Image {
        image_url: String,
        alt_text: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum TextObject {
    #[serde(rename = "plain_text")]
    PlainText {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        emoji: Option<bool>,
    },
    #[serde(rename = "mrkdwn")]
    Markdown { text: String },
}

impl TextObject {
    pub fn text(&self) -> &str {
        match self {
            TextObject::PlainText { text, .. } | TextObject::Markdown { text } => text,
        }
    }
}

impl Block {
    pub fn header(text: impl Into<String>) -> Self {
        Block::Header {
            text: TextObject::PlainText {
                text: text.into(),
                emoji: Some(true),
            },
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Block::Section {
            text: Some(TextObject::Markdown {
                text: truncate(&text.into(), MAX_SECTION_TEXT),
            }),
            fields: None,
        }
    }

    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Block::Section {
            text: None,
            fields: Some(
                fields
                    .into_iter()
                    .map(|f| TextObject::Markdown { text: f.into() })
                    .collect(),
            ),
        }
    }

    pub fn image(url: impl Into<String>, alt_text: impl Into<String>) -> Self {
        Block::Image {
            image_url: url.into(),
            alt_text: alt_text.into(),
        }
    }

    /// Section body text, if this is a section with a text object.
    #[cfg(test)]
    pub fn section_text(&self) -> Option<&str> {
        match self {
            Block::Section {
                text: Some(text), ..
            } => Some(text.text()),
            _ => None,
        }
    }
}

/// Escape the characters Slack treats as control sequences in mrkdwn.
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Cut escaped mrkdwn to at most `max_chars` characters, marking the cut
/// with `…`. The cut never splits an `&amp;`-style entity or a `<url|label>`
/// link; in escaped text every raw `&` and `<` opens one of those.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();

    if let Some(open) = cut.rfind('<') {
        if cut.rfind('>').map_or(true, |close| close < open) {
            cut.truncate(open);
        }
    }
    if let Some(amp) = cut.rfind('&') {
        if cut.rfind(';').map_or(true, |semi| semi < amp) {
            cut.truncate(amp);
        }
    }

    cut.push('…');
    cut
}
