//! GitHub REST client and the remote repository source built on it

use crate::source::{ExclusionSet, RepositorySource, SourceFile};
use archgen_core::{ArchgenError, RepoInfo, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::debug;

const GITHUB_API: &str = "https://api.github.com";

/// Thin wrapper over the contents and repository endpoints.
pub struct GitHubClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
}

/// One entry of a contents listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    #[serde(rename = "type")]
    pub entry_type: String,
    pub path: String,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    pub sha: String,
}

#[derive(Debug, Deserialize)]
struct FileContent {
    content: Option<String>,
    encoding: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiRepository {
    name: String,
    description: Option<String>,
    language: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    updated_at: Option<DateTime<Utc>>,
    license: Option<ApiLicense>,
}

#[derive(Debug, Deserialize)]
struct ApiLicense {
    name: Option<String>,
    spdx_id: Option<String>,
}

impl From<ApiRepository> for RepoInfo {
    fn from(repo: ApiRepository) -> Self {
        RepoInfo {
            name: repo.name,
            description: repo.description,
            language: repo.language,
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            last_updated: repo.updated_at,
            license: repo.license.and_then(|l| l.spdx_id.or(l.name)),
        }
    }
}

impl GitHubClient {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("archgen/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ArchgenError::remote(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            token: token.into(),
            base_url: GITHUB_API.to_string(),
        })
    }

    /// Point the client at another API root (GitHub Enterprise).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| ArchgenError::remote(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ArchgenError::remote(format!(
                "GitHub API returned {} for {}: {}",
                status, url, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ArchgenError::remote(format!("Unexpected response from {}: {}", url, e)))
    }

    /// List the root of a repository at `branch`.
    pub async fn list_contents(&self, owner: &str, repo: &str, branch: &str) -> Result<Vec<ContentEntry>> {
        let url = format!("{}/repos/{}/{}/contents", self.base_url, owner, repo);
        self.get_json(&url, &[("ref", branch)]).await
    }

    /// Fetch and decode one file.
    pub async fn file_content(&self, owner: &str, repo: &str, path: &str, branch: &str) -> Result<String> {
        let url = format!("{}/repos/{}/{}/contents/{}", self.base_url, owner, repo, path);
        let file: FileContent = self.get_json(&url, &[("ref", branch)]).await?;

        match (file.content, file.encoding.as_deref()) {
            (Some(content), Some("base64") | None) => decode_content(&content),
            (Some(_), Some(other)) => Err(ArchgenError::remote(format!(
                "Unsupported content encoding {} for {}",
                other, path
            ))),
            (None, _) => Err(ArchgenError::remote(format!("{} has no inline content", path))),
        }
    }

    /// Repository description, stars, license and so on.
    pub async fn repository(&self, owner: &str, repo: &str) -> Result<RepoInfo> {
        let url = format!("{}/repos/{}/{}", self.base_url, owner, repo);
        let repo: ApiRepository = self.get_json(&url, &[]).await?;
        Ok(repo.into())
    }
}

/// Decode base64 file content as delivered by the contents API (wrapped at 60 columns).
pub fn decode_content(content: &str) -> Result<String> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| ArchgenError::remote(format!("Invalid base64 content: {}", e)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Remote source: the first level of a repository tree at one branch.
pub struct GitHubSource {
    client: GitHubClient,
    owner: String,
    repo: String,
    branch: String,
    exclusions: ExclusionSet,
    listing: OnceCell<Vec<SourceFile>>,
}

impl GitHubSource {
    pub fn new(
        client: GitHubClient,
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
        exclusions: ExclusionSet,
    ) -> Self {
        Self {
            client,
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
            exclusions,
            listing: OnceCell::new(),
        }
    }

    async fn fetch_listing(&self) -> Result<Vec<SourceFile>> {
        let entries = self
            .client
            .list_contents(&self.owner, &self.repo, &self.branch)
            .await?;

        Ok(entries
            .into_iter()
            .filter(|entry| entry.entry_type == "file")
            .filter(|entry| !self.exclusions.is_excluded(&entry.path))
            .map(|entry| SourceFile {
                path: entry.path,
                name: entry.name,
                size: entry.size,
                sha: Some(entry.sha),
                modified: None,
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl RepositorySource for GitHubSource {
    fn identifier(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    fn is_remote(&self) -> bool {
        true
    }

    async fn list_files(&self) -> Result<Vec<SourceFile>> {
        self.listing
            .get_or_try_init(|| self.fetch_listing())
            .await
            .cloned()
    }

    async fn read_file(&self, file: &SourceFile) -> Result<String> {
        self.client
            .file_content(&self.owner, &self.repo, &file.path, &self.branch)
            .await
    }

    async fn exists(&self, path: &str) -> bool {
        self.listing
            .get()
            .is_some_and(|files| files.iter().any(|f| f.path == path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_wrapped_base64() {
        // "import x from './y';\n" wrapped the way the contents API does
        let encoded = "aW1wb3J0IHggZnJvbSAn\nLi95JzsK\n";
        assert_eq!(decode_content(encoded).unwrap(), "import x from './y';\n");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_content("***").is_err());
    }

    #[test]
    fn test_listing_entries_deserialize() {
        let entries: Vec<ContentEntry> = serde_json::from_str(
            r#"[
                {"type": "file", "path": "index.ts", "name": "index.ts", "size": 120, "sha": "abc"},
                {"type": "dir", "path": "src", "name": "src", "size": 0, "sha": "def"}
            ]"#,
        )
        .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].entry_type, "file");
        assert_eq!(entries[1].entry_type, "dir");
    }

    #[test]
    fn test_repository_maps_to_repo_info() {
        let api: ApiRepository = serde_json::from_str(
            r#"{
                "name": "tokio",
                "description": "A runtime",
                "language": "Rust",
                "stargazers_count": 10,
                "forks_count": 2,
                "updated_at": "2024-01-02T03:04:05Z",
                "license": {"name": "MIT License", "spdx_id": "MIT"}
            }"#,
        )
        .unwrap();
        let info = RepoInfo::from(api);
        assert_eq!(info.name, "tokio");
        assert_eq!(info.stars, 10);
        assert_eq!(info.license.as_deref(), Some("MIT"));
        assert!(info.last_updated.is_some());
    }

    /// Serve canned JSON bodies keyed by request target; anything else is a 404.
    async fn serve(routes: Vec<(&'static str, serde_json::Value)>) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes = std::sync::Arc::new(routes);
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let routes = routes.clone();
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }
                    let request = String::from_utf8_lossy(&request);
                    let target = request.split_whitespace().nth(1).unwrap_or_default();
                    let (status, body) = routes
                        .iter()
                        .find(|(path, _)| *path == target)
                        .map(|(_, body)| ("200 OK", body.to_string()))
                        .unwrap_or(("404 Not Found", r#"{"message":"Not Found"}"#.to_string()));
                    let response = format!(
                        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });
        format!("http://{}", addr)
    }

    fn file_body(text: &str) -> serde_json::Value {
        serde_json::json!({"content": STANDARD.encode(text), "encoding": "base64"})
    }

    #[tokio::test]
    async fn test_remote_generation_against_api() {
        use crate::generator::{ArchitectureGenerator, GeneratorOptions};
        use archgen_core::DiagramKind;
        use serde_json::json;

        let base = serve(vec![
            (
                "/repos/o/r/contents?ref=dev",
                json!([
                    {"type": "file", "path": "index.ts", "name": "index.ts", "size": 40, "sha": "a1"},
                    {"type": "file", "path": "util.ts", "name": "util.ts", "size": 30, "sha": "b2"},
                    {"type": "dir", "path": "src", "name": "src", "size": 0, "sha": "c3"},
                    {"type": "file", "path": "generated.ts", "name": "generated.ts", "size": 10, "sha": "d4"}
                ]),
            ),
            (
                "/repos/o/r/contents/index.ts?ref=dev",
                file_body("import { helper } from './util';\n"),
            ),
            (
                "/repos/o/r/contents/util.ts?ref=dev",
                file_body("export const helper = 1;\n"),
            ),
        ])
        .await;

        let client = GitHubClient::new("token").unwrap().with_base_url(format!("{}/", base));
        let exclusions = ExclusionSet::new(&["generated".to_string()]).unwrap();
        let source = GitHubSource::new(client, "o", "r", "dev", exclusions);

        let files = source.list_files().await.unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["index.ts", "util.ts"]);
        assert_eq!(files[0].sha.as_deref(), Some("a1"));
        assert!(source.exists("util.ts").await);
        assert!(!source.exists("src").await);

        let generator = ArchitectureGenerator::new(GeneratorOptions::default()).unwrap();
        let diagram = generator
            .generate_from(&source, DiagramKind::Functional)
            .await
            .unwrap();

        assert_eq!(diagram.metadata.repository, "o/r");
        let modules: Vec<&str> = diagram
            .nodes
            .iter()
            .map(|n| n.id.as_str())
            .filter(|id| !id.contains('#'))
            .collect();
        assert_eq!(modules, ["index.ts", "util.ts"]);
        let edge = diagram
            .edges
            .iter()
            .find(|e| e.id == "index.ts->util.ts")
            .expect("import edge");
        assert_eq!(edge.metadata["specifier"], json!("./util"));
    }

    #[tokio::test]
    async fn test_api_errors_are_remote() {
        let base = serve(Vec::new()).await;
        let client = GitHubClient::new("token").unwrap().with_base_url(base);

        let err = client.list_contents("o", "missing", "main").await.unwrap_err();
        assert!(matches!(err, ArchgenError::Remote(_)));
        assert!(err.to_string().contains("404"));

        let err = client.repository("o", "missing").await.unwrap_err();
        assert!(matches!(err, ArchgenError::Remote(_)));
    }

    #[tokio::test]
    async fn test_source_identity() {
        let client = GitHubClient::new("token").unwrap();
        let source = GitHubSource::new(client, "owner", "repo", "main", ExclusionSet::defaults());
        assert_eq!(source.identifier(), "owner/repo");
        assert!(source.is_remote());
        // Nothing listed yet
        assert!(!source.exists("index.ts").await);
    }
}
