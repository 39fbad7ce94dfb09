//! Repository walking, regex content analysis and graph building

pub mod analyzer;
pub mod builder;
pub mod generator;
pub mod github;
pub mod source;
pub mod walker;

#[cfg(test)]
pub mod tests;

#[cfg(test)]
pub mod test_utils;

pub use analyzer::{ClassDecl, ContentAnalysis, DesignPattern, FunctionDecl, InterfaceDecl, analyze};
pub use builder::{GraphBuilder, ImportTarget, resolve_import};
pub use generator::{ArchitectureGenerator, GeneratorOptions};
pub use github::{GitHubClient, GitHubSource};
pub use source::{DEFAULT_EXCLUDES, ExclusionSet, RepoRef, RepositorySource, SourceFile};
pub use walker::LocalSource;
