//! Configuration — YAML config + env var overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Known provider presets
const PROVIDER_PRESETS: &[(&str, Option<&str>)] = &[
    ("huggingface", Some("https://api-inference.huggingface.co/models")),
    ("openai", Some("https://api.openai.com/v1")),
];

/// Provider-specific API key env vars
const PROVIDER_KEY_ENV_VARS: &[(&str, &str)] = &[
    ("huggingface", "HF_API_TOKEN"),
    ("openai", "OPENAI_API_KEY"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// "huggingface" | "openai" | "custom"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Text-generation model name
    #[serde(default = "default_model")]
    pub model: String,

    /// API key (set here or via env var)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the inference backend (auto-set for known providers)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Generation length limit
    #[serde(default = "default_max_length")]
    pub max_length: u32,

    /// Sequences requested per call; only the first is shown
    #[serde(default = "default_num_return_sequences")]
    pub num_return_sequences: u32,

    /// HTTP timeout for generation calls
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_provider() -> String {
    "huggingface".into()
}
fn default_model() -> String {
    "distilgpt2".into()
}
fn default_max_length() -> u32 {
    50
}
fn default_num_return_sequences() -> u32 {
    1
}
fn default_request_timeout() -> u64 {
    60
}

impl Config {
    /// Load config from a YAML file with env var overrides.
    pub fn load(config_path: &Path) -> Result<Self> {
        Self::load_with(config_path, |var| std::env::var(var).ok())
    }

    fn load_with<F>(config_path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

        let mut config: Config =
            serde_yaml::from_str(&content).context("Failed to parse config.yaml")?;

        config.apply_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Like `load`, but a missing file means defaults (env overrides still apply).
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.is_file() {
            return Self::load(config_path);
        }
        let mut config = Config::default();
        config.apply_overrides(|var| std::env::var(var).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply env overrides. `lookup` returns the value of a variable, if set.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(p) = lookup("CAREBOT_PROVIDER") {
            self.provider = p;
        }

        if let Some(m) = lookup("CAREBOT_MODEL") {
            self.model = m;
        }

        // Base URL: env var > config > provider preset
        if let Some(url) = lookup("CAREBOT_BASE_URL") {
            self.base_url = Some(url);
        } else if self.base_url.is_none() {
            self.base_url = PROVIDER_PRESETS
                .iter()
                .find(|(p, _)| *p == self.provider)
                .and_then(|(_, url)| url.map(String::from));
        }

        // API key: provider-specific env var > config
        let provider_key_var = PROVIDER_KEY_ENV_VARS
            .iter()
            .find(|(p, _)| *p == self.provider)
            .map(|(_, var)| *var);

        if let Some(key) = provider_key_var.and_then(|var| lookup(var)) {
            self.api_key = Some(key);
        }
    }

    /// Provider names are checked by `HttpGenerator::new`, not here.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.provider == "custom" && self.base_url.is_none() {
            anyhow::bail!(
                "Provider 'custom' requires base_url in config.yaml or CAREBOT_BASE_URL env var"
            );
        }
        if self.num_return_sequences == 0 {
            anyhow::bail!("num_return_sequences must be at least 1");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: None,
            base_url: None,
            max_length: default_max_length(),
            num_return_sequences: default_num_return_sequences(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_parse_defaults() {
        let mut config: Config = serde_yaml::from_str("provider: huggingface").unwrap();
        config.apply_overrides(env(&[]));

        assert_eq!(config.model, "distilgpt2");
        assert_eq!(config.max_length, 50);
        assert_eq!(config.num_return_sequences, 1);
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(
            config.base_url.as_deref(),
            Some("https://api-inference.huggingface.co/models")
        );
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_load_config_custom_values() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            "provider: custom\nmodel: gpt2-medium\nbase_url: http://localhost:8080/v1\nmax_length: 80"
        )
        .unwrap();

        let config = Config::load_with(tmp.path(), env(&[])).unwrap();
        assert_eq!(config.provider, "custom");
        assert_eq!(config.model, "gpt2-medium");
        assert_eq!(config.max_length, 80);
    }

    #[test]
    fn test_custom_without_base_url_fails() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "provider: custom\nmodel: gpt2").unwrap();

        let result = Config::load_with(tmp.path(), env(&[]));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_provider_loads() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "provider: carrier-pigeon").unwrap();

        let config = Config::load_with(tmp.path(), env(&[])).unwrap();
        assert_eq!(config.provider, "carrier-pigeon");
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_file_load_ignores_unrelated_env() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "provider: custom\nbase_url: http://localhost:8080/v1").unwrap();

        let config = Config::load_with(
            tmp.path(),
            env(&[("CAREBOT_MODEL", "gpt2-large"), ("HF_API_TOKEN", "hf-token")]),
        )
        .unwrap();
        assert_eq!(config.model, "gpt2-large");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_env_overrides_beat_file() {
        let mut config: Config =
            serde_yaml::from_str("provider: openai\nmodel: davinci-002\napi_key: from-file").unwrap();
        config.apply_overrides(env(&[
            ("CAREBOT_MODEL", "gpt-3.5-turbo-instruct"),
            ("OPENAI_API_KEY", "from-env"),
            ("HF_API_TOKEN", "ignored"),
        ]));

        assert_eq!(config.model, "gpt-3.5-turbo-instruct");
        assert_eq!(config.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.base_url.as_deref(), Some("https://api.openai.com/v1"));
    }

    #[test]
    fn test_base_url_env_beats_preset() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("CAREBOT_BASE_URL", "http://tgi.local:3000")]));
        assert_eq!(config.base_url.as_deref(), Some("http://tgi.local:3000"));
    }

    #[test]
    fn test_provider_switch_picks_matching_key_var() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("CAREBOT_PROVIDER", "openai"),
            ("HF_API_TOKEN", "hf-token"),
            ("OPENAI_API_KEY", "sk-test"),
        ]));
        assert_eq!(config.provider, "openai");
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
    }
}
