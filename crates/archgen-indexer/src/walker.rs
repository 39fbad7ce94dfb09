//! Local directory source

use crate::source::{ExclusionSet, RepositorySource, SourceFile};
use archgen_core::{ArchgenError, Result};
use chrono::{DateTime, Utc};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Recursively lists a directory on disk.
///
/// Standard ignore filters are off: every file is visited and only the
/// exclusion set prunes the walk.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
    exclusions: ExclusionSet,
    max_depth: Option<usize>,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>, exclusions: ExclusionSet) -> Self {
        Self {
            root: root.into(),
            exclusions,
            max_depth: None,
        }
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Repository-relative path with `/` separators.
fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn walk_error(root: &Path, err: ignore::Error) -> ArchgenError {
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other(message));
    ArchgenError::io(root, source)
}

#[async_trait::async_trait]
impl RepositorySource for LocalSource {
    fn identifier(&self) -> String {
        self.root.display().to_string()
    }

    fn is_remote(&self) -> bool {
        false
    }

    async fn list_files(&self) -> Result<Vec<SourceFile>> {
        let filter_root = self.root.clone();
        let filter_exclusions = self.exclusions.clone();

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .follow_links(true)
            .max_depth(self.max_depth)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                entry.depth() == 0
                    || !filter_exclusions.is_excluded(&relative_path(&filter_root, entry.path()))
            })
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| walk_error(&self.root, e))?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let metadata = entry
                .metadata()
                .map_err(|e| walk_error(entry.path(), e))?;
            let mut file = SourceFile::new(relative_path(&self.root, entry.path()), metadata.len());
            file.modified = metadata.modified().ok().map(DateTime::<Utc>::from);
            files.push(file);
        }

        debug!("Listed {} files under {}", files.len(), self.root.display());
        Ok(files)
    }

    async fn read_file(&self, file: &SourceFile) -> Result<String> {
        let full_path = self.root.join(&file.path);
        let bytes = tokio::fs::read(&full_path)
            .await
            .map_err(|e| ArchgenError::io(&full_path, e))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn exists(&self, path: &str) -> bool {
        tokio::fs::metadata(self.root.join(path))
            .await
            .is_ok_and(|m| m.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_repo_with_structure;

    #[tokio::test]
    async fn test_lists_files_sorted_and_excluded() {
        let repo = create_repo_with_structure(&[
            ("src/b.ts", ""),
            ("src/a.ts", ""),
            ("node_modules/lib/index.js", ""),
            ("dist/out.js", ""),
            ("README.md", "# readme"),
        ]);

        let source = LocalSource::new(repo.path(), ExclusionSet::defaults());
        let paths: Vec<_> = source
            .list_files()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.path)
            .collect();

        assert_eq!(paths, vec!["README.md", "src/a.ts", "src/b.ts"]);
    }

    #[tokio::test]
    async fn test_max_depth_limits_walk() {
        let repo = create_repo_with_structure(&[("top.ts", ""), ("src/deep/inner.ts", "")]);
        let source = LocalSource::new(repo.path(), ExclusionSet::defaults()).with_max_depth(Some(1));
        let files = source.list_files().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "top.ts");
    }

    #[tokio::test]
    async fn test_read_is_lossy_and_exists_checks_files() {
        let repo = create_repo_with_structure(&[("src/a.ts", "export const a = 1;")]);
        std::fs::write(repo.path().join("blob.bin"), [0xff, 0xfe, b'x']).unwrap();

        let source = LocalSource::new(repo.path(), ExclusionSet::defaults());
        let text = source
            .read_file(&SourceFile::new("blob.bin", 3))
            .await
            .unwrap();
        assert!(text.ends_with('x'));

        assert!(source.exists("src/a.ts").await);
        assert!(!source.exists("src").await);
        assert!(!source.exists("src/missing.ts").await);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let repo = create_repo_with_structure(&[]);
        let source = LocalSource::new(repo.path(), ExclusionSet::defaults());
        let err = source
            .read_file(&SourceFile::new("gone.ts", 0))
            .await
            .unwrap_err();
        assert_eq!(err.category(), archgen_core::ErrorCategory::Io);
    }
}
