use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::TranslationConfig;
use crate::language::LanguageDetector;

/// Longest input the public endpoint accepts in one request.
const MAX_TEXT_CHARS: usize = 5000;

/// Anything that can translate text from an auto-detected source language
/// into a fixed target language.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String>;
}

/// Translator backed by the public Google Translate endpoint.
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
    target_language: String,
}

impl GoogleTranslator {
    pub fn new(client: reqwest::Client, config: &TranslationConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            target_language: config.target_language.clone(),
        }
    }
}

/// The endpoint answers with `[[["segment", "source", ...], ...], ...]`.
fn parse_segments(body: &Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .context("Unexpected translation response shape")?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.is_empty() {
        anyhow::bail!("Translation response contained no text");
    }
    Ok(translated)
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        let length = text.chars().count();
        if length > MAX_TEXT_CHARS {
            anyhow::bail!(
                "Text is too long to translate ({} chars, limit {})",
                length,
                MAX_TEXT_CHARS
            );
        }

        let url = format!("{}/translate_a/single", self.endpoint);
        debug!(target_language = %self.target_language, chars = length, "Requesting translation");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", self.target_language.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .context("Failed to send translation request")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Translation API error ({}): {}", status, error_body);
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to parse translation response")?;

        parse_segments(&body)
    }
}

/// Best-effort translation: `None` when the text is empty, already in the
/// target language, or the translator fails.
pub async fn translate_if_needed(
    detector: &LanguageDetector,
    translator: &dyn Translator,
    text: &str,
) -> Option<String> {
    if text.is_empty() || detector.is_target_language(text) {
        return None;
    }

    match translator.translate(text).await {
        Ok(translated) => Some(translated),
        Err(e) => {
            warn!(error = %format!("{:#}", e), "Translation failed, relaying original text");
            None
        }
    }
}
