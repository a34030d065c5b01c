//! Reply dispatch — keyword table first, then the text-generation model.

use tracing::{error, info, warn};

use crate::generator::TextGenerator;
use crate::keywords::match_keyword;
use crate::types::{Reply, ReplySource};

/// Shown when no model could be loaded at startup.
pub const UNAVAILABLE_REPLY: &str = "I'm sorry, I couldn't process your request at the moment.";

pub struct HealthcareAssistant<G> {
    generator: Option<G>,
}

impl<G: TextGenerator> HealthcareAssistant<G> {
    /// `generator` is `None` when the model failed to load.
    pub fn new(generator: Option<G>) -> Self {
        Self { generator }
    }

    pub fn model_loaded(&self) -> bool {
        self.generator.is_some()
    }

    /// Produce a reply for one user message. Never fails: generation errors
    /// become the reply text.
    pub async fn reply(&self, user_input: &str) -> Reply {
        if let Some(canned) = match_keyword(user_input) {
            info!("[keyword] {}", preview(user_input));
            return Reply {
                text: canned.to_string(),
                source: ReplySource::Keyword,
            };
        }

        let Some(generator) = self.generator.as_ref() else {
            warn!("[unavailable] no model loaded");
            return Reply {
                text: UNAVAILABLE_REPLY.to_string(),
                source: ReplySource::Unavailable,
            };
        };

        match generator.generate(user_input).await {
            Ok(text) => {
                info!("[model] {}", preview(&text));
                Reply {
                    text,
                    source: ReplySource::Model,
                }
            }
            Err(e) => {
                error!("generation failed: {}", e);
                Reply {
                    text: format!("An error occurred while generating a response: {}", e),
                    source: ReplySource::Error,
                }
            }
        }
    }
}

fn preview(text: &str) -> String {
    text.chars().take(120).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::generator::GenerateError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Echoes the prompt with a fixed suffix and counts calls.
    pub(crate) struct EchoGenerator {
        pub calls: AtomicUsize,
    }

    impl EchoGenerator {
        pub(crate) fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl TextGenerator for EchoGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{} ...and then some", prompt))
        }
    }

    struct FailingGenerator;

    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
            Err(GenerateError::Api {
                status: 429,
                body: "rate limited".into(),
            })
        }
    }

    #[tokio::test]
    async fn test_keyword_skips_model() {
        let assistant = HealthcareAssistant::new(Some(EchoGenerator::new()));
        let reply = assistant.reply("Can I book an Appointment?").await;

        assert_eq!(reply.source, ReplySource::Keyword);
        assert_eq!(
            reply.text,
            "Would you like me to schedule an appointment with a doctor?"
        );
        assert_eq!(
            assistant.generator.as_ref().unwrap().calls.load(Ordering::SeqCst),
            0
        );
    }

    #[tokio::test]
    async fn test_model_reply() {
        let assistant = HealthcareAssistant::new(Some(EchoGenerator::new()));
        let reply = assistant.reply("Is walking good exercise?").await;

        assert_eq!(reply.source, ReplySource::Model);
        assert_eq!(reply.text, "Is walking good exercise? ...and then some");
    }

    #[tokio::test]
    async fn test_generation_error_becomes_text() {
        let assistant = HealthcareAssistant::new(Some(FailingGenerator));
        let reply = assistant.reply("hello").await;

        assert_eq!(reply.source, ReplySource::Error);
        assert_eq!(
            reply.text,
            "An error occurred while generating a response: API HTTP 429: rate limited"
        );
    }

    #[tokio::test]
    async fn test_no_model_loaded() {
        let assistant: HealthcareAssistant<EchoGenerator> = HealthcareAssistant::new(None);
        assert!(!assistant.model_loaded());

        let reply = assistant.reply("hello").await;
        assert_eq!(reply.source, ReplySource::Unavailable);
        assert_eq!(reply.text, UNAVAILABLE_REPLY);

        // Keywords still work without a model
        let reply = assistant.reply("what about my medication").await;
        assert_eq!(reply.source, ReplySource::Keyword);
    }
}
