use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::clock::DisplayClock;
use crate::config::{Config, MissingGuildPolicy};
use crate::language::LanguageDetector;
use crate::payload::PayloadBuilder;
use crate::platform::InboundMessage;
use crate::slack::webhook::{Deliver, DeliveryOutcome};
use crate::translate::Translator;

/// What happened to one inbound message.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Not a qualifying message (bot author or another channel).
    Ignored,
    /// Qualifying, but dropped because it has no guild context.
    Skipped,
    /// The notification could not be built.
    Failed(String),
    Delivered(DeliveryOutcome),
}

/// The message pipeline: filter, build, deliver.
/// Platform-agnostic; the platform adapter feeds it `InboundMessage`s.
pub struct Relay {
    target_channel_id: u64,
    missing_guild: MissingGuildPolicy,
    builder: PayloadBuilder,
    delivery: Arc<dyn Deliver>,
}

impl Relay {
    pub fn new(
        config: &Config,
        translator: Arc<dyn Translator>,
        delivery: Arc<dyn Deliver>,
    ) -> Result<Self> {
        let builder = PayloadBuilder::new(
            LanguageDetector::new(config.translation.script_ratio_threshold),
            translator,
            DisplayClock::from_config(&config.display)?,
            config.relay.missing_guild,
        );

        Ok(Self {
            target_channel_id: config.discord.target_channel_id,
            missing_guild: config.relay.missing_guild,
            builder,
            delivery,
        })
    }

    pub fn target_channel_id(&self) -> u64 {
        self.target_channel_id
    }

    /// A message qualifies when a human posted it in the target channel.
    pub fn qualifies(&self, msg: &InboundMessage) -> bool {
        !msg.author.is_bot && msg.channel.id == self.target_channel_id
    }

    /// Run the whole pipeline for one message. Never fails; every problem
    /// is logged and reported through the outcome.
    pub async fn handle(&self, msg: InboundMessage) -> RelayOutcome {
        if !self.qualifies(&msg) {
            return RelayOutcome::Ignored;
        }

        info!(
            message_id = msg.id,
            channel = %msg.channel.name,
            author = %msg.author.display_name,
            "New message detected"
        );

        if msg.guild_id.is_none() && self.missing_guild == MissingGuildPolicy::Skip {
            warn!(message_id = msg.id, "Message has no guild context, skipping");
            return RelayOutcome::Skipped;
        }

        let document = match self.builder.build(&msg).await {
            Ok(document) => document,
            Err(e) => {
                error!(message_id = msg.id, error = %format!("{:#}", e), "Failed to build notification");
                return RelayOutcome::Failed(e.to_string());
            }
        };

        debug!(message_id = msg.id, blocks = document.blocks.len(), "Notification built");
        RelayOutcome::Delivered(self.delivery.deliver(msg.id, &document).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        DiscordConfig, DisplayConfig, HttpConfig, RelayConfig, SlackConfig, TranslationConfig,
    };
    use crate::platform::{Author, Channel};
    use crate::slack::SlackMessage;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    const TARGET: u64 = 555;

    #[derive(Default)]
    struct SpyTranslator {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Translator for SpyTranslator {
        async fn translate(&self, text: &str) -> Result<String> {
            self.calls.lock().unwrap().push(text.to_string());
            Ok("안녕 세상".to_string())
        }
    }

    struct SpyDelivery {
        outcome: DeliveryOutcome,
        sent: Mutex<Vec<(u64, SlackMessage)>>,
    }

    impl SpyDelivery {
        fn returning(outcome: DeliveryOutcome) -> Self {
            Self {
                outcome,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Deliver for SpyDelivery {
        async fn deliver(&self, message_id: u64, message: &SlackMessage) -> DeliveryOutcome {
            self.sent.lock().unwrap().push((message_id, message.clone()));
            self.outcome.clone()
        }
    }

    fn config(policy: MissingGuildPolicy) -> Config {
        Config {
            discord: DiscordConfig {
                token: "token".to_string(),
                target_channel_id: TARGET,
            },
            slack: SlackConfig {
                webhook_url: "https://hooks.slack.com/services/T/B/X".to_string(),
            },
            translation: TranslationConfig::default(),
            display: DisplayConfig::default(),
            relay: RelayConfig {
                missing_guild: policy,
            },
            http: HttpConfig::default(),
        }
    }

    fn message(channel_id: u64, is_bot: bool) -> InboundMessage {
        InboundMessage {
            id: 9001,
            author: Author {
                is_bot,
                display_name: "alice".to_string(),
            },
            channel: Channel {
                id: channel_id,
                name: "reports".to_string(),
            },
            guild_id: Some(1),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            text: "Hello world".to_string(),
            attachments: vec![],
        }
    }

    fn relay(
        policy: MissingGuildPolicy,
        outcome: DeliveryOutcome,
    ) -> (Relay, Arc<SpyTranslator>, Arc<SpyDelivery>) {
        let translator = Arc::new(SpyTranslator::default());
        let delivery = Arc::new(SpyDelivery::returning(outcome));
        let relay = Relay::new(&config(policy), translator.clone(), delivery.clone()).unwrap();
        (relay, translator, delivery)
    }

    #[tokio::test]
    async fn test_bot_messages_are_ignored() {
        let (relay, translator, delivery) =
            relay(MissingGuildPolicy::Skip, DeliveryOutcome::Delivered);

        let outcome = relay.handle(message(TARGET, true)).await;

        assert_eq!(outcome, RelayOutcome::Ignored);
        assert!(translator.calls.lock().unwrap().is_empty());
        assert!(delivery.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_channels_are_ignored() {
        let (relay, translator, delivery) =
            relay(MissingGuildPolicy::Skip, DeliveryOutcome::Delivered);

        let outcome = relay.handle(message(TARGET + 1, false)).await;

        assert_eq!(outcome, RelayOutcome::Ignored);
        assert!(translator.calls.lock().unwrap().is_empty());
        assert!(delivery.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_qualifying_message_is_delivered_once() {
        let (relay, translator, delivery) =
            relay(MissingGuildPolicy::Skip, DeliveryOutcome::Delivered);

        let outcome = relay.handle(message(TARGET, false)).await;

        assert_eq!(outcome, RelayOutcome::Delivered(DeliveryOutcome::Delivered));
        assert_eq!(*translator.calls.lock().unwrap(), vec!["Hello world".to_string()]);

        let sent = delivery.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (message_id, document) = &sent[0];
        assert_eq!(*message_id, 9001);
        assert!(document.blocks.iter().any(|block| block.section_text()
            == Some("*4. Content:*\noriginal:\nHello world\n\ntranslation:\n안녕 세상")));
    }

    #[tokio::test]
    async fn test_delivery_failure_is_contained() {
        let (relay, _translator, delivery) = relay(
            MissingGuildPolicy::Skip,
            DeliveryOutcome::Rejected { status: 500 },
        );

        let first = relay.handle(message(TARGET, false)).await;
        let second = relay.handle(message(TARGET, false)).await;

        assert_eq!(
            first,
            RelayOutcome::Delivered(DeliveryOutcome::Rejected { status: 500 })
        );
        assert_eq!(first, second);
        assert_eq!(delivery.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_guildless_message_skipped_by_default() {
        let (relay, translator, delivery) =
            relay(MissingGuildPolicy::Skip, DeliveryOutcome::Delivered);
        let mut msg = message(TARGET, false);
        msg.guild_id = None;

        assert_eq!(relay.handle(msg).await, RelayOutcome::Skipped);
        assert!(translator.calls.lock().unwrap().is_empty());
        assert!(delivery.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_guildless_message_fails_under_error_policy() {
        let (relay, _translator, delivery) =
            relay(MissingGuildPolicy::Error, DeliveryOutcome::Delivered);
        let mut msg = message(TARGET, false);
        msg.guild_id = None;

        assert!(matches!(relay.handle(msg).await, RelayOutcome::Failed(_)));
        assert!(delivery.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_guildless_message_relayed_without_link() {
        let (relay, _translator, delivery) =
            relay(MissingGuildPolicy::OmitLink, DeliveryOutcome::Delivered);
        let mut msg = message(TARGET, false);
        msg.guild_id = None;

        assert_eq!(
            relay.handle(msg).await,
            RelayOutcome::Delivered(DeliveryOutcome::Delivered)
        );
        assert_eq!(delivery.sent.lock().unwrap().len(), 1);
    }
}
