//! Prompt templates for diagram enhancement

use archgen_core::{Diagram, RepoInfo, Result};

/// System instruction sent with every enhancement request.
pub const SYSTEM_PROMPT: &str = "You are an experienced software architect who extracts high-quality \
architecture diagrams from code structure and type definitions. Reply with a single JSON object only.";

/// Build the enhancement prompt for a diagram.
///
/// Missing repository facts are filled with neutral defaults so the template is always complete.
pub fn build_prompt(diagram: &Diagram, repo: &RepoInfo, context: Option<&str>) -> Result<String> {
    let existing = serde_json::to_string_pretty(diagram)?;
    let name = if repo.name.is_empty() {
        diagram.metadata.repository.as_str()
    } else {
        repo.name.as_str()
    };

    Ok(format!(
        r#"Analyze the repository described below and produce a complete, well-layered software architecture diagram.

When building the diagram:

1. Layering
   - Split the system into clear layers: core, services, interfaces, implementations.
   - Components within a layer should share responsibilities.
   - Dependencies between layers must be explicit.

2. Relationships
   - Use distinct edge types for distinct relationships (depends, extends, implements, calls, uses).
   - Keep edge directions meaningful and label the important ones.

3. Metadata
   - Give every component a short statement of its responsibility.
   - Call out notable design patterns and architectural decisions.

### Output format
Return strict JSON with exactly these top-level fields:
- "nodes": array of objects with "id", "label", "type" and "metadata"
- "edges": array of objects with "id", "source", "target", "type" and "label"
- "metadata": object with the generation time (ISO 8601), "version": "1.0.0", the analysis method and a short summary

Keep every existing node and edge ID unchanged. New IDs must be unique.
Node types: module, service, component, database, external, interface, class, function, controller, repository, model, util, config, domain.
Edge types: depends, uses, implements, extends, contains, calls, inheritance, dependency, implementation, data, event.

### Repository
{{
    "name": "{name}",
    "description": "{description}",
    "language": "{language}",
    "stars": {stars},
    "forks": {forks},
    "lastUpdated": "{last_updated}",
    "license": "{license}"
}}

### Existing structure
{existing}

### Additional context
{context}

Return only the JSON object, with no surrounding prose."#,
        name = name,
        description = repo
            .description
            .as_deref()
            .unwrap_or("No description provided"),
        language = repo.language.as_deref().unwrap_or("unknown"),
        stars = repo.stars,
        forks = repo.forks,
        last_updated = repo
            .last_updated
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string()),
        license = repo.license.as_deref().unwrap_or("unknown"),
        existing = existing,
        context = context.unwrap_or(""),
    ))
}
