//! AI provider implementations

pub mod aliyun;
pub mod anthropic;
pub mod openai;

use super::bridge::{AIProvider, AiConfig, ProviderKind};
use anyhow::{Context, Result};

/// Factory function to create AI providers
pub fn create_provider(config: &AiConfig) -> Result<Box<dyn AIProvider>> {
    let http = reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let provider: Box<dyn AIProvider> = match config.kind {
        ProviderKind::OpenAI => Box::new(openai::OpenAIProvider::new(http, config)),
        ProviderKind::Claude => Box::new(anthropic::AnthropicProvider::new(http, config)),
        ProviderKind::Aliyun => Box::new(aliyun::AliyunProvider::new(http, config)),
    };
    Ok(provider)
}
