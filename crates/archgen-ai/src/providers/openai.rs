//! OpenAI provider implementation

use crate::bridge::{AIProvider, AIResponse, AiConfig, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, TokenUsage};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAIProvider {
    pub fn new(client: reqwest::Client, config: &AiConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model().to_string(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
        }
    }
}

// Chat-completions wire types, shared with the OpenAI-compatible Aliyun endpoint.

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<StreamOptions>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StreamOptions {
    pub include_usage: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl<'a> ChatRequest<'a> {
    pub fn new(model: &'a str, system: &str, prompt: &str) -> Self {
        Self {
            model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            stream: false,
            stream_options: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[async_trait::async_trait]
impl AIProvider for OpenAIProvider {
    async fn analyze(&self, system: &str, prompt: &str) -> Result<AIResponse> {
        let request = ChatRequest::new(&self.model, system, prompt);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to OpenAI")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error ({}): {}", status, error_text);
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI response")?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(AIResponse {
            content,
            reasoning: None,
            usage: chat.usage,
        })
    }

    fn name(&self) -> &str {
        "OpenAI"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::ProviderKind;

    #[test]
    fn test_request_shape() {
        let request = ChatRequest::new("gpt-4", "be brief", "hello");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hello");
        assert_eq!(value["max_tokens"], 2000);
        assert!(value.get("stream").is_none());
        assert!(value.get("stream_options").is_none());
    }

    #[test]
    fn test_response_parsing() {
        let chat: ChatResponse = serde_json::from_str(
            r#"{
                "choices": [{"message": {"role": "assistant", "content": "{}"}}],
                "usage": {"prompt_tokens": 3, "completion_tokens": 4, "total_tokens": 7}
            }"#,
        )
        .unwrap();
        assert_eq!(chat.choices[0].message.content, "{}");
        assert_eq!(chat.usage.unwrap().total_tokens, 7);
    }

    #[test]
    fn test_base_url_override() {
        let mut config = AiConfig::new(ProviderKind::OpenAI, "key");
        config.base_url = Some("http://localhost:8080/v1".into());
        let provider = OpenAIProvider::new(reqwest::Client::new(), &config);
        assert_eq!(provider.base_url, "http://localhost:8080/v1");
        assert_eq!(provider.model(), "gpt-4");
    }
}
