//! Unit tests for archgen-indexer: whole-repository generation

use crate::test_utils::{create_repo_with_structure, create_test_repo};
use crate::*;
use archgen_core::{DiagramKind, EdgeType, NodeType, split_symbol_id};
use std::collections::BTreeSet;

async fn generate(path: &std::path::Path, kind: DiagramKind) -> archgen_core::Diagram {
    let generator = ArchitectureGenerator::new(GeneratorOptions::default()).unwrap();
    generator
        .generate(path.to_str().unwrap(), kind)
        .await
        .unwrap()
}

fn module_ids(diagram: &archgen_core::Diagram) -> BTreeSet<String> {
    diagram
        .nodes
        .iter()
        .filter(|n| !n.id.contains('#'))
        .map(|n| n.id.clone())
        .collect()
}

#[tokio::test]
async fn test_one_module_node_per_file() {
    let repo = create_test_repo();
    let diagram = generate(repo.path(), DiagramKind::Functional).await;

    let expected: BTreeSet<String> = [
        "src/index.ts",
        "src/models/user.ts",
        "src/services/base.ts",
        "src/services/user.service.ts",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    assert_eq!(module_ids(&diagram), expected);
}

#[tokio::test]
async fn test_generation_is_deterministic() {
    let repo = create_test_repo();
    let first = generate(repo.path(), DiagramKind::Functional).await;
    let second = generate(repo.path(), DiagramKind::Functional).await;

    let ids = |d: &archgen_core::Diagram| d.nodes.iter().map(|n| n.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(first.edges, second.edges);
}

#[tokio::test]
async fn test_contains_edges_stay_within_file() {
    let repo = create_test_repo();
    let diagram = generate(repo.path(), DiagramKind::Functional).await;

    let contains: Vec<_> = diagram.edges_of_type(EdgeType::Contains).collect();
    assert!(!contains.is_empty());
    for edge in contains {
        let (file, _) = split_symbol_id(&edge.target).unwrap();
        assert_eq!(edge.source, file);
        assert!(diagram.node(&edge.source).is_some());
    }
}

#[tokio::test]
async fn test_sub_element_ids_embed_path() {
    let repo = create_test_repo();
    let diagram = generate(repo.path(), DiagramKind::Functional).await;

    let service = diagram
        .node("src/services/user.service.ts#UserService")
        .unwrap();
    // getInstance + instance in the body
    assert_eq!(service.node_type, NodeType::Service);
    assert_eq!(
        diagram.node("src/services/base.ts#Startable").unwrap().node_type,
        NodeType::Interface
    );
    assert_eq!(
        diagram.node("src/index.ts#main").unwrap().node_type,
        NodeType::Function
    );
}

#[tokio::test]
async fn test_inheritance_edges_resolve_across_files() {
    let repo = create_test_repo();
    let diagram = generate(repo.path(), DiagramKind::Functional).await;

    let class_id = "src/services/user.service.ts#UserService";
    assert!(
        diagram
            .edge(&format!("{}-extends->src/services/base.ts#BaseService", class_id))
            .is_some()
    );
    assert!(
        diagram
            .edge(&format!("{}-implements->src/services/base.ts#Startable", class_id))
            .is_some()
    );
    // Entity is declared nowhere
    assert!(
        diagram
            .edge("src/models/user.ts#User-extends->Entity")
            .is_some()
    );
    // BaseService declares no parent
    assert_eq!(
        diagram
            .edges
            .iter()
            .filter(|e| e.source == "src/services/base.ts#BaseService")
            .count(),
        0
    );
}

#[tokio::test]
async fn test_relative_imports_resolve_and_packages_do_not() {
    let repo = create_test_repo();
    let diagram = generate(repo.path(), DiagramKind::Functional).await;

    assert!(
        diagram
            .edge("src/index.ts->src/services/user.service.ts")
            .is_some()
    );
    assert!(
        diagram
            .edge("src/services/user.service.ts->src/models/user.ts")
            .is_some()
    );
    assert!(diagram.edges.iter().all(|e| e.target != "express"));

    let index = diagram.node("src/index.ts").unwrap();
    assert_eq!(index.metadata["unresolvedImports"][0], "express");
}

#[tokio::test]
async fn test_functional_and_deployment_typing() {
    let repo = create_repo_with_structure(&[
        ("api/handler.ts", ""),
        ("db/migrate.sql", ""),
        ("web/client.ts", ""),
    ]);

    let functional = generate(repo.path(), DiagramKind::Functional).await;
    assert!(functional.nodes.iter().all(|n| n.node_type == NodeType::Service));

    let deployment = generate(repo.path(), DiagramKind::Deployment).await;
    assert_eq!(deployment.node("api/handler.ts").unwrap().node_type, NodeType::Service);
    assert_eq!(deployment.node("db/migrate.sql").unwrap().node_type, NodeType::Database);
    assert_eq!(deployment.node("web/client.ts").unwrap().node_type, NodeType::Component);
    assert_eq!(deployment.metadata.kind, DiagramKind::Deployment);
}

#[tokio::test]
async fn test_custom_exclusions() {
    let repo = create_repo_with_structure(&[
        ("src/app.ts", ""),
        ("src/app.test.ts", ""),
        ("node_modules/pkg/index.js", ""),
    ]);
    let generator = ArchitectureGenerator::new(GeneratorOptions {
        exclude: vec![r"re:\.test\.ts$".into(), "node_modules".into()],
        ..Default::default()
    })
    .unwrap();
    let diagram = generator
        .generate(repo.path().to_str().unwrap(), DiagramKind::Functional)
        .await
        .unwrap();

    let ids: Vec<_> = diagram.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["src/app.ts"]);
}

#[tokio::test]
async fn test_local_repository_info() {
    let repo = create_test_repo();
    let generator = ArchitectureGenerator::new(GeneratorOptions::default()).unwrap();
    let info = generator
        .repository_info(repo.path().to_str().unwrap())
        .await
        .unwrap();

    assert!(!info.name.is_empty());
    assert_eq!(info.language.as_deref(), Some("typescript"));
    assert_eq!(info.stars, 0);
}
