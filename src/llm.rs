//! Language-model completion backends.
//!
//! - **[`AnthropicBackend`]**: the text-completion HTTP API, with retry and
//!   exponential backoff.
//! - **[`OllamaBackend`]**: a local model run as a subprocess
//!   (`ollama run <model> <prompt>`).
//! - **[`DisabledBackend`]**: always fails; used when a route has no model.
//!
//! # Retry Strategy
//!
//! - HTTP 429 and 5xx → retry
//! - other 4xx → fail immediately
//! - network errors → retry
//! - backoff doubles from `backoff_ms` (capped at 2^5 × `backoff_ms`)

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{AnthropicConfig, LlmConfig, OllamaConfig};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// A text-in, text-out language model.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Complete `prompt`; the returned text is trimmed.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

// ============ Disabled ============

pub struct DisabledBackend;

#[async_trait]
impl CompletionBackend for DisabledBackend {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, _prompt: &str) -> Result<String> {
        bail!("Language model backend is disabled")
    }
}

// ============ Ollama ============

pub struct OllamaBackend {
    binary: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(config: &OllamaConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl CompletionBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        tracing::info!(
            backend = "ollama",
            model = %self.model,
            prompt_chars = prompt.chars().count(),
            "completion requested"
        );
        let output = tokio::process::Command::new(&self.binary)
            .arg("run")
            .arg(&self.model)
            .arg(prompt)
            .output()
            .await
            .with_context(|| format!("Failed to run '{}'", self.binary))?;

        if !output.status.success() {
            bail!(
                "'{} run {}' exited with {}: {}",
                self.binary,
                self.model,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

// ============ Anthropic ============

pub struct AnthropicBackend {
    config: AnthropicConfig,
    api_key: String,
    client: reqwest::Client,
}

impl AnthropicBackend {
    /// Backend using the `ANTHROPIC_API_KEY` environment variable.
    pub fn from_env(config: &AnthropicConfig) -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| anyhow!("ANTHROPIC_API_KEY environment variable not set"))?;
        Self::new(config, api_key)
    }

    pub fn new(config: &AnthropicConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            config: config.clone(),
            api_key: api_key.into(),
            client,
        })
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "prompt": format!("\n\nHuman: {}\n\nAssistant:", prompt),
            "max_tokens_to_sample": self.config.max_tokens,
            "temperature": self.config.temperature,
        })
    }
}

#[async_trait]
impl CompletionBackend for AnthropicBackend {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        tracing::info!(
            backend = "anthropic",
            model = %self.config.model,
            prompt_chars = prompt.chars().count(),
            "completion requested"
        );
        let body = self.request_body(prompt);
        let mut last_err = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(self.config.backoff_ms << (attempt - 1).min(5));
                tracing::warn!(attempt, delay_ms = delay.as_millis() as u64, "retrying completion");
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(&self.config.api_url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await?;
                        return parse_completion(&json);
                    }

                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err = Some(anyhow!("Anthropic API error {}: {}", status, body_text));
                        continue;
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    bail!("Anthropic API error {}: {}", status, body_text);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow!("Completion failed after retries")))
    }
}

fn parse_completion(json: &serde_json::Value) -> Result<String> {
    json.get("completion")
        .and_then(|c| c.as_str())
        .map(|c| c.trim().to_string())
        .ok_or_else(|| anyhow!("Invalid Anthropic response: missing completion"))
}

/// Instantiate the backend named in config.
///
/// | Name | Backend |
/// |------|---------|
/// | `"anthropic"` | [`AnthropicBackend`] (needs `ANTHROPIC_API_KEY`) |
/// | `"ollama"` | [`OllamaBackend`] |
/// | `"disabled"` | [`DisabledBackend`] |
pub fn create_backend(name: &str, config: &LlmConfig) -> Result<Arc<dyn CompletionBackend>> {
    match name {
        "anthropic" => Ok(Arc::new(AnthropicBackend::from_env(&config.anthropic)?)),
        "ollama" => Ok(Arc::new(OllamaBackend::new(&config.ollama))),
        "disabled" => Ok(Arc::new(DisabledBackend)),
        other => bail!("Unknown language model backend: {}", other),
    }
}
