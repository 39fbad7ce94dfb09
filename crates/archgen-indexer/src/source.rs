//! Repository references, the source seam shared by local and remote modes, and exclusion patterns

use archgen_core::{ArchgenError, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};

/// Exclusions applied when none are configured.
pub const DEFAULT_EXCLUDES: &[&str] = &["node_modules", "dist", ".git"];

/// Where a repository lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoRef {
    Local { root: PathBuf },
    GitHub { owner: String, repo: String },
}

impl RepoRef {
    /// Route an input string: an existing directory wins, otherwise it must parse as a GitHub reference.
    pub fn resolve(input: &str) -> Result<Self> {
        let path = Path::new(input);
        if path.is_dir() {
            let root = path
                .canonicalize()
                .map_err(|e| ArchgenError::io(path, e))?;
            return Ok(RepoRef::Local { root });
        }
        Self::parse_github(input)
    }

    /// Parse `owner/repo` or a `github.com` URL.
    pub fn parse_github(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let without_host = ["https://github.com/", "http://github.com/", "github.com/"]
            .iter()
            .find_map(|prefix| trimmed.strip_prefix(prefix))
            .unwrap_or(trimmed);
        let without_slash = without_host.trim_end_matches('/');
        let spec = without_slash.strip_suffix(".git").unwrap_or(without_slash);

        let valid_segment = |s: &str| {
            !s.is_empty()
                && s
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        };

        match spec.split('/').collect::<Vec<_>>().as_slice() {
            [owner, repo] if valid_segment(owner) && valid_segment(repo) => Ok(RepoRef::GitHub {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(ArchgenError::config(format!(
                "Invalid repository format: {}. Use owner/repo",
                input
            ))),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, RepoRef::GitHub { .. })
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoRef::Local { root } => write!(f, "{}", root.display()),
            RepoRef::GitHub { owner, repo } => write!(f, "{}/{}", owner, repo),
        }
    }
}

/// One file offered by a repository source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    /// Repository-relative path with `/` separators
    pub path: String,
    pub name: String,
    pub size: u64,
    /// Blob SHA (remote mode only)
    pub sha: Option<String>,
    /// Last modification time (local mode only)
    pub modified: Option<DateTime<Utc>>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        Self {
            path,
            name,
            size,
            sha: None,
            modified: None,
        }
    }
}

/// Common seam over local directories and remote repositories.
#[async_trait::async_trait]
pub trait RepositorySource: Send + Sync {
    /// Absolute path for local sources, `owner/repo` for remote ones.
    fn identifier(&self) -> String;

    fn is_remote(&self) -> bool;

    /// List the files to analyze, exclusions already applied.
    async fn list_files(&self) -> Result<Vec<SourceFile>>;

    /// Read a file as text.
    async fn read_file(&self, file: &SourceFile) -> Result<String>;

    /// Whether a repository-relative path names a file. Used by import resolution.
    async fn exists(&self, path: &str) -> bool;
}

#[derive(Debug, Clone)]
enum Exclusion {
    Substring(String),
    Pattern(Regex),
}

/// Path exclusion list: plain entries match as substrings, `re:`-prefixed entries as regexes.
#[derive(Debug, Clone)]
pub struct ExclusionSet {
    rules: Vec<Exclusion>,
}

impl ExclusionSet {
    /// Compile the configured patterns, falling back to [`DEFAULT_EXCLUDES`] when empty.
    pub fn new(patterns: &[String]) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(Self::defaults());
        }

        let rules = patterns
            .iter()
            .map(|p| match p.strip_prefix("re:") {
                Some(expr) => Regex::new(expr).map(Exclusion::Pattern).map_err(|e| {
                    ArchgenError::config(format!("Invalid exclusion pattern {}: {}", p, e))
                }),
                None => Ok(Exclusion::Substring(p.clone())),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    pub fn defaults() -> Self {
        Self {
            rules: DEFAULT_EXCLUDES
                .iter()
                .map(|p| Exclusion::Substring(p.to_string()))
                .collect(),
        }
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.rules.iter().any(|rule| match rule {
            Exclusion::Substring(s) => path.contains(s.as_str()),
            Exclusion::Pattern(re) => re.is_match(path),
        })
    }
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::defaults()
    }
}
