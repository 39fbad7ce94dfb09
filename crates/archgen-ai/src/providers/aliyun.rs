//! Aliyun DashScope provider (OpenAI-compatible endpoint, streamed)

use super::openai::{ChatRequest, StreamOptions};
use crate::bridge::{AIProvider, AIResponse, AiConfig, TokenUsage};
use anyhow::{Context, Result};
use futures_util::StreamExt;
use serde::Deserialize;
use tracing::{debug, warn};

pub const ALIYUN_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";

pub struct AliyunProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl AliyunProvider {
    pub fn new(client: reqwest::Client, config: &AiConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model().to_string(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| ALIYUN_BASE_URL.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    reasoning_content: Option<String>,
    content: Option<String>,
}

/// Reassembles a server-sent-event token stream into one reply.
///
/// Bytes are buffered until a full line is available, so events split
/// across network chunks (or inside a multi-byte character) decode intact.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    buffer: Vec<u8>,
    reasoning: String,
    content: String,
    usage: Option<TokenUsage>,
    done: bool,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the `[DONE]` sentinel has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed one network chunk.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.handle_line(&String::from_utf8_lossy(&line));
        }
    }

    fn handle_line(&mut self, line: &str) {
        let line = line.trim();
        let Some(data) = line.strip_prefix("data:") else {
            return;
        };
        let data = data.trim();
        if data == "[DONE]" {
            self.done = true;
            return;
        }
        if data.is_empty() || self.done {
            return;
        }

        match serde_json::from_str::<StreamChunk>(data) {
            Ok(chunk) => {
                if chunk.usage.is_some() {
                    self.usage = chunk.usage;
                }
                for choice in chunk.choices {
                    if let Some(reasoning) = choice.delta.reasoning_content {
                        self.reasoning.push_str(&reasoning);
                    }
                    if let Some(content) = choice.delta.content {
                        self.content.push_str(&content);
                    }
                }
            }
            Err(e) => warn!("Skipping malformed stream event: {}", e),
        }
    }

    /// Flush any trailing line and produce the reply. An empty answer is an error.
    pub fn finish(mut self) -> Result<AIResponse> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            self.handle_line(&String::from_utf8_lossy(&rest));
        }
        if self.content.trim().is_empty() {
            anyhow::bail!("No response from Aliyun model");
        }
        Ok(AIResponse {
            content: self.content,
            reasoning: (!self.reasoning.is_empty()).then_some(self.reasoning),
            usage: self.usage,
        })
    }
}

#[async_trait::async_trait]
impl AIProvider for AliyunProvider {
    async fn analyze(&self, system: &str, prompt: &str) -> Result<AIResponse> {
        let mut request = ChatRequest::new(&self.model, system, prompt);
        request.stream = true;
        request.stream_options = Some(StreamOptions {
            include_usage: true,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Aliyun")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Aliyun API error ({}): {}", status, error_text);
        }

        let mut accumulator = StreamAccumulator::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Aliyun stream error")?;
            accumulator.push(&chunk);
            if accumulator.is_done() {
                break;
            }
        }

        debug!(
            "Aliyun stream finished: {} answer chars, {} reasoning chars",
            accumulator.content.len(),
            accumulator.reasoning.len()
        );
        accumulator.finish()
    }

    fn name(&self) -> &str {
        "Aliyun"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_reasoning_and_content() {
        let mut acc = StreamAccumulator::new();
        acc.push(b"data: {\"choices\":[{\"delta\":{\"reasoning_content\":\"think \"}}]}\n\n");
        acc.push(b"data: {\"choices\":[{\"delta\":{\"reasoning_content\":\"more\"}}]}\n\n");
        acc.push(b"data: {\"choices\":[{\"delta\":{\"content\":\"{\\\"nodes\\\"\"}}]}\n\n");
        acc.push(b"data: {\"choices\":[{\"delta\":{\"content\":\": []}\"}}]}\n\n");
        acc.push(b"data: {\"choices\":[],\"usage\":{\"prompt_tokens\":1,\"completion_tokens\":2,\"total_tokens\":3}}\n\n");
        acc.push(b"data: [DONE]\n\n");
        assert!(acc.is_done());

        let reply = acc.finish().unwrap();
        assert_eq!(reply.content, r#"{"nodes": []}"#);
        assert_eq!(reply.reasoning.as_deref(), Some("think more"));
        assert_eq!(reply.usage.unwrap().total_tokens, 3);
    }

    #[test]
    fn test_events_split_across_chunks() {
        let event = "data: {\"choices\":[{\"delta\":{\"content\":\"héllo\"}}]}\n";
        let bytes = event.as_bytes();
        // Split inside the multi-byte character
        let split = event.find('é').unwrap() + 1;

        let mut acc = StreamAccumulator::new();
        acc.push(&bytes[..split]);
        acc.push(&bytes[split..]);
        assert_eq!(acc.finish().unwrap().content, "héllo");
    }

    #[test]
    fn test_trailing_line_without_newline() {
        let mut acc = StreamAccumulator::new();
        acc.push(b"data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}");
        assert_eq!(acc.finish().unwrap().content, "ok");
    }

    #[test]
    fn test_empty_answer_is_error() {
        let mut acc = StreamAccumulator::new();
        acc.push(b"data: {\"choices\":[{\"delta\":{\"reasoning_content\":\"only thinking\"}}]}\n");
        acc.push(b": keep-alive\n");
        acc.push(b"data: not json\n");
        acc.push(b"data: [DONE]\n");
        assert!(acc.finish().is_err());
    }
}
