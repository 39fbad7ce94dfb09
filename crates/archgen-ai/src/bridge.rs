//! Provider seam between archgen and chat-completion model APIs

use anyhow::Result;
use archgen_core::ArchgenError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default bound on a single enhancement call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Token accounting reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// A complete model reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AIResponse {
    pub content: String,
    /// Reasoning trace, for models that stream one separately
    pub reasoning: Option<String>,
    pub usage: Option<TokenUsage>,
}

/// AI provider trait for different LLM backends
#[async_trait::async_trait]
pub trait AIProvider: Send + Sync {
    /// Send one system instruction and one user prompt, wait for the whole reply.
    async fn analyze(&self, system: &str, prompt: &str) -> Result<AIResponse>;

    /// Get provider name
    fn name(&self) -> &str;

    /// Model identifier sent with each request
    fn model(&self) -> &str;
}

/// Which provider adapter to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAI,
    Claude,
    Aliyun,
}

impl ProviderKind {
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "gpt-4",
            ProviderKind::Claude => "claude-3-opus-20240229",
            ProviderKind::Aliyun => "deepseek-r1",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::OpenAI => f.write_str("openai"),
            ProviderKind::Claude => f.write_str("claude"),
            ProviderKind::Aliyun => f.write_str("aliyun"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ArchgenError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "gpt" => Ok(ProviderKind::OpenAI),
            "claude" | "anthropic" => Ok(ProviderKind::Claude),
            "aliyun" | "dashscope" => Ok(ProviderKind::Aliyun),
            other => Err(ArchgenError::config(format!(
                "Unsupported AI model type: {} (expected openai, claude or aliyun)",
                other
            ))),
        }
    }
}

/// Enhancement provider configuration
#[derive(Clone)]
pub struct AiConfig {
    pub kind: ProviderKind,
    pub api_key: String,
    /// Overrides the provider's default model
    pub model: Option<String>,
    /// Overrides the provider's default endpoint root
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl AiConfig {
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            kind,
            api_key: api_key.into(),
            model: None,
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.kind.default_model())
    }
}

// Keep the key out of logs.
impl fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiConfig")
            .field("kind", &self.kind)
            .field("model", &self.model())
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
