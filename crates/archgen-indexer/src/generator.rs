//! Architecture generator: routes a repository reference, walks it and builds the diagram

use crate::analyzer::analyze;
use crate::builder::{GraphBuilder, language_for};
use crate::github::{GitHubClient, GitHubSource};
use crate::source::{ExclusionSet, RepoRef, RepositorySource};
use crate::walker::LocalSource;
use archgen_core::{ArchgenError, Diagram, DiagramKind, RepoInfo, Result};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Options for one generator instance.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// GitHub token, required for remote repositories
    pub token: Option<String>,
    /// Exclusion patterns; empty means the defaults
    pub exclude: Vec<String>,
    /// Branch read in remote mode
    pub branch: String,
    /// Maximum walk depth in local mode
    pub max_depth: Option<usize>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            token: None,
            exclude: Vec::new(),
            branch: "main".to_string(),
            max_depth: None,
        }
    }
}

pub struct ArchitectureGenerator {
    options: GeneratorOptions,
    exclusions: ExclusionSet,
}

impl ArchitectureGenerator {
    pub fn new(options: GeneratorOptions) -> Result<Self> {
        let exclusions = ExclusionSet::new(&options.exclude)?;
        Ok(Self {
            options,
            exclusions,
        })
    }

    /// Open the source a reference points at. Remote references need a token.
    pub fn open(&self, repo: &RepoRef) -> Result<Box<dyn RepositorySource>> {
        match repo {
            RepoRef::Local { root } => Ok(Box::new(
                LocalSource::new(root.clone(), self.exclusions.clone())
                    .with_max_depth(self.options.max_depth),
            )),
            RepoRef::GitHub { owner, repo } => {
                let token = self.options.token.as_deref().ok_or_else(|| {
                    ArchgenError::config("GitHub token is required for remote repositories")
                })?;
                let client = GitHubClient::new(token)?;
                Ok(Box::new(GitHubSource::new(
                    client,
                    owner.clone(),
                    repo.clone(),
                    self.options.branch.clone(),
                    self.exclusions.clone(),
                )))
            }
        }
    }

    /// Generate a diagram for a local path or `owner/repo`.
    pub async fn generate(&self, repo: &str, kind: DiagramKind) -> Result<Diagram> {
        let reference = RepoRef::resolve(repo)?;
        let source = self.open(&reference)?;
        self.generate_from(source.as_ref(), kind).await
    }

    /// Generate a diagram from an already opened source.
    pub async fn generate_from(&self, source: &dyn RepositorySource, kind: DiagramKind) -> Result<Diagram> {
        info!("Generating {} diagram for {}", kind, source.identifier());

        let files = source.list_files().await?;
        info!("Found {} files to analyze", files.len());

        let mut builder = GraphBuilder::new(kind, source.identifier());
        for file in &files {
            let content = match source.read_file(file).await {
                Ok(content) => content,
                Err(e) if source.is_remote() => {
                    warn!("Error reading {}: {}; treating it as having no dependencies", file.path, e);
                    String::new()
                }
                Err(e) => return Err(e),
            };

            debug!("Analyzing {}", file.path);
            let analysis = analyze(&content);
            builder.add_file(file, &analysis, source).await;
        }

        let diagram = builder.finish();
        info!(
            "Generated diagram with {} nodes and {} edges",
            diagram.nodes.len(),
            diagram.edges.len()
        );
        Ok(diagram)
    }

    /// Repository facts for the enhancement prompt.
    ///
    /// Remote repositories ask the GitHub API; a failure there is only a warning.
    /// Local repositories use the directory name and the most common language.
    pub async fn repository_info(&self, repo: &str) -> Result<RepoInfo> {
        let reference = RepoRef::resolve(repo)?;
        match &reference {
            RepoRef::GitHub { owner, repo: name } => {
                let token = self.options.token.as_deref().ok_or_else(|| {
                    ArchgenError::config("GitHub token is required for remote repositories")
                })?;
                let client = GitHubClient::new(token)?;
                match client.repository(owner, name).await {
                    Ok(info) => Ok(info),
                    Err(e) => {
                        warn!("Could not fetch repository metadata for {}: {}", reference, e);
                        Ok(RepoInfo::named(reference.to_string()))
                    }
                }
            }
            RepoRef::Local { root } => {
                let name = root
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| reference.to_string());
                let source = self.open(&reference)?;
                let files = source.list_files().await?;
                Ok(RepoInfo {
                    language: primary_language(files.iter().map(|f| f.path.as_str())),
                    ..RepoInfo::named(name)
                })
            }
        }
    }
}

/// Most frequent source language among paths; ties go to the first seen.
pub fn primary_language<'a>(paths: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut counts: HashMap<&'static str, (usize, usize)> = HashMap::new();
    for (index, path) in paths.enumerate() {
        if let Some(language) = language_for(path)
            .filter(|l| !matches!(*l, "json" | "yaml" | "markdown"))
        {
            counts.entry(language).or_insert((0, index)).0 += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|(_, (a, ai)), (_, (b, bi))| a.cmp(b).then(bi.cmp(ai)))
        .map(|(language, _)| language.to_string())
}
