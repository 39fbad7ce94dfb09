//! CLI command implementations

use anyhow::Context;
use archgen_ai::{AiConfig, Enhancer, ProviderKind};
use archgen_core::{DiagramKind, RepoInfo};
use archgen_indexer::{ArchitectureGenerator, GeneratorOptions};
use archgen_render::{OutputFormat, Rendered, render};
use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::GenerateArgs;

const DEFAULT_ENV: &str = "\
# GitHub personal access token, required for owner/repo inputs
GITHUB_TOKEN=your_github_token_here

# Diagram enhancement provider: openai, claude or aliyun
AI_TYPE=openai
AI_API_KEY=your_api_key_here
AI_MODEL=gpt-4
";

pub async fn generate(args: GenerateArgs) -> anyhow::Result<()> {
    let kind: DiagramKind = args.diagram_type.parse()?;
    let format: OutputFormat = args.format.parse()?;

    let generator = ArchitectureGenerator::new(GeneratorOptions {
        token: args.github_token.clone(),
        exclude: args.exclude.clone(),
        branch: args.branch.clone(),
        max_depth: args.max_depth,
    })?;

    let mut diagram = generator
        .generate(&args.repo, kind)
        .await
        .with_context(|| format!("Failed to generate a diagram for {}", args.repo))?;

    if let Some(config) = ai_config(&args)? {
        let enhancer = Enhancer::from_config(&config)?;
        let repo_info = match generator.repository_info(&args.repo).await {
            Ok(repo_info) => repo_info,
            Err(e) => {
                warn!("Could not collect repository facts: {}", e);
                RepoInfo::named(args.repo.as_str())
            }
        };
        diagram = enhancer
            .enhance_diagram(diagram, &repo_info, args.context.as_deref())
            .await;
    }

    let rendered = render(&diagram, format)?;
    match &args.output {
        Some(path) => write_file(path, &rendered)?,
        None => write_stdout(&rendered, format)?,
    }
    Ok(())
}

/// Enhancement settings, or `None` when enhancement is off or incompletely configured.
fn ai_config(args: &GenerateArgs) -> anyhow::Result<Option<AiConfig>> {
    if !args.enable_ai {
        return Ok(None);
    }
    let (Some(kind), Some(api_key)) = (args.ai_type.as_deref(), args.ai_api_key.as_deref()) else {
        warn!("AI enhancement needs both an API key and a provider type; continuing without it");
        return Ok(None);
    };

    let kind: ProviderKind = kind.parse()?;
    let mut config = AiConfig::new(kind, api_key);
    config.model = args.ai_model.clone();
    config.base_url = args.ai_base_url.clone();
    config.timeout = Duration::from_secs(args.ai_timeout);
    Ok(Some(config))
}

fn write_file(path: &Path, rendered: &Rendered) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, rendered.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Diagram written to {}", path.display());
    Ok(())
}

fn write_stdout(rendered: &Rendered, format: OutputFormat) -> anyhow::Result<()> {
    if format.is_binary() {
        warn!("Writing binary {} data to stdout", format);
    }
    let mut stdout = io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    if let Rendered::Text(_) = rendered {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}

/// Write the default environment file. An existing file is left untouched.
pub fn init(path: &Path) -> anyhow::Result<()> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            info!("{} already exists; leaving it unchanged", path.display());
            return Ok(());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to create {}", path.display()));
        }
    };
    file.write_all(DEFAULT_ENV.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Created {}", path.display());
    Ok(())
}
