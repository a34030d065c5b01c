//! Text generation backends — Hugging Face Inference API or an
//! OpenAI-compatible completions endpoint, both over reqwest.

use std::future::Future;
use std::time::Duration;

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::Config;

/// Max chars of an error body carried into `GenerateError::Api`.
const MAX_ERROR_BODY: usize = 200;

/// Delay before the single retry on 500/503.
const RETRY_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Anything that can continue a prompt.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, GenerateError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    HuggingFace,
    Completions,
}

/// Remote text-generation model. Built once at startup and shared.
#[derive(Debug, Clone)]
pub struct HttpGenerator {
    client: reqwest::Client,
    backend: Backend,
    url: String,
    api_key: Option<String>,
    model: String,
    max_length: u32,
    num_return_sequences: u32,
    retry_delay: Duration,
}

impl HttpGenerator {
    pub fn new(config: &Config) -> Result<Self, GenerateError> {
        let backend = match config.provider.as_str() {
            "huggingface" => Backend::HuggingFace,
            "openai" | "custom" => Backend::Completions,
            other => {
                return Err(GenerateError::Config(format!("unknown provider '{}'", other)));
            }
        };

        let base_url = config
            .base_url
            .as_deref()
            .ok_or_else(|| GenerateError::Config("no base_url configured".into()))?
            .trim_end_matches('/');

        if config.provider == "openai" && config.api_key.is_none() {
            return Err(GenerateError::Config(
                "API key required for OpenAI (set OPENAI_API_KEY)".into(),
            ));
        }

        let url = match backend {
            Backend::HuggingFace => format!("{}/{}", base_url, config.model),
            Backend::Completions => format!("{}/completions", base_url),
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!(
            "text generator ready: provider={} model={} url={}",
            config.provider, config.model, url
        );

        Ok(Self {
            client,
            backend,
            url,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_length: config.max_length,
            num_return_sequences: config.num_return_sequences,
            retry_delay: RETRY_DELAY,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(&self, prompt: &str) -> Value {
        match self.backend {
            Backend::HuggingFace => json!({
                "inputs": prompt,
                "parameters": {
                    "max_length": self.max_length,
                    "num_return_sequences": self.num_return_sequences,
                },
            }),
            Backend::Completions => json!({
                "model": self.model,
                "prompt": prompt,
                "max_tokens": self.max_length,
                "n": self.num_return_sequences,
            }),
        }
    }

    async fn post(&self, body: &Value) -> Result<reqwest::Response, GenerateError> {
        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(body);
        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }
        Ok(request.send().await?)
    }
}

impl TextGenerator for HttpGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let body = self.request_body(prompt);

        let mut response = self.post(&body).await?;
        let mut status = response.status();

        // Retry once on 500 / 503 (HF answers 503 while the model is loading)
        if matches!(status.as_u16(), 500 | 503) {
            let text = response.text().await.unwrap_or_default();
            warn!(
                "generation HTTP {}: {} | retrying in {:?}",
                status,
                truncate(&text, MAX_ERROR_BODY),
                self.retry_delay
            );
            tokio::time::sleep(self.retry_delay).await;
            response = self.post(&body).await?;
            status = response.status();
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("generation HTTP {}: {} | url={}", status, truncate(&text, 500), self.url);
            return Err(GenerateError::Api {
                status: status.as_u16(),
                body: truncate(&text, MAX_ERROR_BODY),
            });
        }

        let text = response.text().await?;
        let data: Value = serde_json::from_str(&text).map_err(|e| {
            GenerateError::Malformed(format!("{}: {}", e, truncate(&text, MAX_ERROR_BODY)))
        })?;
        match self.backend {
            Backend::HuggingFace => parse_hf_response(&data),
            Backend::Completions => parse_completions_response(prompt, &data),
        }
    }
}

/// `[{"generated_text": "..."}]` -> first generated text (prompt included).
fn parse_hf_response(data: &Value) -> Result<String, GenerateError> {
    if let Some(err) = data.get("error").and_then(|v| v.as_str()) {
        return Err(GenerateError::Api {
            status: 200,
            body: truncate(err, MAX_ERROR_BODY),
        });
    }

    data.as_array()
        .and_then(|seqs| seqs.first())
        .and_then(|seq| seq.get("generated_text"))
        .and_then(|v| v.as_str())
        .map(String::from)
        .ok_or_else(|| GenerateError::Malformed("missing generated_text".into()))
}

/// Completions return only the continuation; prefix the prompt so both
/// backends produce the same shape of text.
fn parse_completions_response(prompt: &str, data: &Value) -> Result<String, GenerateError> {
    let continuation = data["choices"][0]["text"]
        .as_str()
        .ok_or_else(|| GenerateError::Malformed("missing choices[0].text".into()))?;
    Ok(format!("{}{}", prompt, continuation))
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
