//! TOML configuration.
//!
//! Every section except `[document]` may be omitted; missing keys take the
//! defaults below. [`load_config`] parses and validates in one step.
//!
//! ```toml
//! [document]
//! path = "./report.md"
//!
//! [retrieval]
//! top_k = 3
//! min_df = 0.05     # float = share of lines, integer = line count
//! max_df = 0.95
//!
//! [llm]
//! chat_backend = "anthropic"
//! report_backend = "ollama"
//! ```

use anyhow::{bail, Context, Result};
use report_harness_core::{DocFreq, PosTag, TfidfParams};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub document: DocumentConfig,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub profiles: ProfilesConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DocumentConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalyzerConfig {
    /// Optional TOML file with extra nouns, adjectives, adverbs and particles.
    #[serde(default)]
    pub user_dictionary: Option<PathBuf>,
    #[serde(default = "default_retain")]
    pub retain: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            user_dictionary: None,
            retain: default_retain(),
        }
    }
}

fn default_retain() -> Vec<String> {
    vec!["noun".to_string(), "adjective".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_ngram_min")]
    pub ngram_min: usize,
    #[serde(default = "default_ngram_max")]
    pub ngram_max: usize,
    #[serde(default = "default_min_df")]
    pub min_df: DocFreq,
    #[serde(default = "default_max_df")]
    pub max_df: DocFreq,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            ngram_min: default_ngram_min(),
            ngram_max: default_ngram_max(),
            min_df: default_min_df(),
            max_df: default_max_df(),
        }
    }
}

fn default_top_k() -> usize {
    3
}
fn default_ngram_min() -> usize {
    1
}
fn default_ngram_max() -> usize {
    2
}
fn default_min_df() -> DocFreq {
    DocFreq::Fraction(0.05)
}
fn default_max_df() -> DocFreq {
    DocFreq::Fraction(0.95)
}

impl RetrievalConfig {
    pub fn tfidf_params(&self) -> TfidfParams {
        TfidfParams {
            ngram_range: (self.ngram_min, self.ngram_max),
            min_df: self.min_df,
            max_df: self.max_df,
            ..TfidfParams::default()
        }
    }
}

/// Customer-profile tables spliced into the report prompt.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProfilesConfig {
    #[serde(default)]
    pub tables: Vec<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_chat_backend")]
    pub chat_backend: String,
    #[serde(default = "default_report_backend")]
    pub report_backend: String,
    #[serde(default)]
    pub anthropic: AnthropicConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            chat_backend: default_chat_backend(),
            report_backend: default_report_backend(),
            anthropic: AnthropicConfig::default(),
            ollama: OllamaConfig::default(),
        }
    }
}

fn default_chat_backend() -> String {
    "anthropic".to_string()
}
fn default_report_backend() -> String {
    "ollama".to_string()
}

pub const BACKENDS: &[&str] = &["anthropic", "ollama", "disabled"];

#[derive(Debug, Deserialize, Clone)]
pub struct AnthropicConfig {
    #[serde(default = "default_anthropic_model")]
    pub model: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// First retry delay; doubles per attempt.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            model: default_anthropic_model(),
            api_url: default_api_url(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

fn default_anthropic_model() -> String {
    "claude-2".to_string()
}
fn default_api_url() -> String {
    "https://api.anthropic.com/v1/complete".to_string()
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_temperature() -> f64 {
    0.2
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_max_retries() -> u32 {
    3
}
fn default_backoff_ms() -> u64 {
    1000
}

#[derive(Debug, Deserialize, Clone)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_binary")]
    pub binary: String,
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            binary: default_ollama_binary(),
            model: default_ollama_model(),
        }
    }
}

fn default_ollama_binary() -> String {
    "ollama".to_string()
}
fn default_ollama_model() -> String {
    "llama3.1".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

impl Config {
    /// Defaults with both language-model backends disabled.
    pub fn minimal() -> Self {
        Self {
            document: DocumentConfig {
                path: PathBuf::from("./report.md"),
            },
            analyzer: AnalyzerConfig::default(),
            retrieval: RetrievalConfig::default(),
            profiles: ProfilesConfig::default(),
            llm: LlmConfig {
                chat_backend: "disabled".to_string(),
                report_backend: "disabled".to_string(),
                ..LlmConfig::default()
            },
            server: ServerConfig::default(),
        }
    }

    /// Parsed `[analyzer].retain` tags.
    pub fn retain_tags(&self) -> Result<Vec<PosTag>> {
        self.analyzer
            .retain
            .iter()
            .map(|t| {
                t.parse::<PosTag>()
                    .map_err(|e| anyhow::anyhow!("analyzer.retain: {}", e))
            })
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k < 1 {
            bail!("retrieval.top_k must be >= 1");
        }
        self.retrieval
            .tfidf_params()
            .validate()
            .context("invalid [retrieval] settings")?;

        if self.analyzer.retain.is_empty() {
            bail!("analyzer.retain must name at least one tag");
        }
        self.retain_tags()?;

        for (key, name) in [
            ("llm.chat_backend", &self.llm.chat_backend),
            ("llm.report_backend", &self.llm.report_backend),
        ] {
            if !BACKENDS.contains(&name.as_str()) {
                bail!(
                    "Unknown {}: '{}'. Must be anthropic, ollama, or disabled.",
                    key,
                    name
                );
            }
        }
        if !(0.0..=1.0).contains(&self.llm.anthropic.temperature) {
            bail!("llm.anthropic.temperature must be in [0.0, 1.0]");
        }
        if self.llm.anthropic.max_tokens == 0 {
            bail!("llm.anthropic.max_tokens must be > 0");
        }

        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_text: &str) -> Result<Config> {
        let config: Config = toml::from_str(toml_text)?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn test_defaults_from_minimal_file() {
        let config = parse("[document]\npath = \"report.md\"\n").unwrap();
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.retrieval.tfidf_params(), TfidfParams::default());
        assert_eq!(config.llm.chat_backend, "anthropic");
        assert_eq!(config.llm.report_backend, "ollama");
        assert_eq!(config.llm.anthropic.model, "claude-2");
        assert_eq!(config.llm.ollama.model, "llama3.1");
        assert_eq!(config.server.bind, "127.0.0.1:8000");
        assert_eq!(
            config.retain_tags().unwrap(),
            vec![PosTag::Noun, PosTag::Adjective]
        );
    }

    #[test]
    fn test_integer_df_is_a_count() {
        let config = parse(
            r#"
[document]
path = "report.md"

[retrieval]
min_df = 2
max_df = 1.0
"#,
        )
        .unwrap();
        assert_eq!(config.retrieval.min_df, DocFreq::Count(2));
        assert_eq!(config.retrieval.max_df, DocFreq::Fraction(1.0));
    }

    #[test]
    fn test_rejects_bad_values() {
        let cases = [
            "[retrieval]\ntop_k = 0",
            "[retrieval]\nngram_min = 3\nngram_max = 2",
            "[retrieval]\nmax_df = 1.5",
            "[analyzer]\nretain = [\"particle\"]",
            "[analyzer]\nretain = []",
            "[llm]\nchat_backend = \"gpt\"",
            "[llm.anthropic]\ntemperature = 2.0",
        ];
        for case in cases {
            let text = format!("[document]\npath = \"r.md\"\n{}\n", case);
            assert!(parse(&text).is_err(), "accepted: {}", case);
        }
    }

    #[test]
    fn test_minimal_is_valid() {
        let config = Config::minimal();
        config.validate().unwrap();
        assert_eq!(config.llm.chat_backend, "disabled");
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/rh.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
