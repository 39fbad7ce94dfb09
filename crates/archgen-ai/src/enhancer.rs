//! Diagram enhancement: prompt, one provider call, parse, additive merge

use crate::bridge::{AIProvider, AiConfig};
use crate::merge::merge_diagrams;
use crate::prompt::{SYSTEM_PROMPT, build_prompt};
use crate::providers::create_provider;
use crate::response::parse_reply;
use archgen_core::{ArchgenError, Diagram, RepoInfo, Result};
use tracing::{debug, info, warn};

pub struct Enhancer {
    provider: Box<dyn AIProvider>,
}

impl Enhancer {
    pub fn new(provider: Box<dyn AIProvider>) -> Self {
        Self { provider }
    }

    pub fn from_config(config: &AiConfig) -> anyhow::Result<Self> {
        Ok(Self::new(create_provider(config)?))
    }

    pub fn provider(&self) -> &dyn AIProvider {
        self.provider.as_ref()
    }

    /// Enhance a diagram. Never fails: on any error the input diagram comes back unchanged.
    pub async fn enhance_diagram(&self, diagram: Diagram, repo: &RepoInfo, context: Option<&str>) -> Diagram {
        match self.try_enhance(&diagram, repo, context).await {
            Ok(enhanced) => enhanced,
            Err(e) => {
                warn!("{}; keeping the unenhanced diagram", e);
                diagram
            }
        }
    }

    /// Enhance a diagram, surfacing failures as [`ArchgenError::Enhancement`].
    pub async fn try_enhance(&self, diagram: &Diagram, repo: &RepoInfo, context: Option<&str>) -> Result<Diagram> {
        let prompt = build_prompt(diagram, repo, context)
            .map_err(|e| ArchgenError::enhancement(format!("Failed to build prompt: {}", e)))?;

        info!(
            "Enhancing diagram with {} ({})",
            self.provider.name(),
            self.provider.model()
        );
        let reply = self
            .provider
            .analyze(SYSTEM_PROMPT, &prompt)
            .await
            .map_err(|e| ArchgenError::enhancement(format!("{:#}", e)))?;

        if let Some(usage) = reply.usage {
            debug!(
                "Token usage: {} prompt, {} completion, {} total",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        let suggested = parse_reply(&reply.content, &diagram.metadata)?;
        Ok(merge_diagrams(diagram.clone(), suggested, self.provider.model()))
    }
}
