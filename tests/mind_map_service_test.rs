//! Tests for MindMapService

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rstest::rstest;
use tempfile::TempDir;

use studymap::application::quote::FixedQuote;
use studymap::application::services::{MindMapService, RenderOptions};
use studymap::application::ApplicationError;
use studymap::config::Settings;
use studymap::domain::DomainError;
use studymap::infrastructure::traits::{FileSystem, RealFileSystem};

fn resource(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/resources")
        .join(name)
}

fn service_with(settings: Settings) -> MindMapService {
    MindMapService::new(Arc::new(RealFileSystem), Arc::new(settings))
}

fn service() -> MindMapService {
    service_with(Settings::default())
}

#[rstest]
#[case::bundle("bundle.json", 5)]
#[case::nested_tree("tree.json", 6)]
#[case::node_table("table.json", 4)]
#[case::unbalanced("unbalanced.json", 7)]
fn given_supported_document_when_laying_out_then_every_node_positioned(
    #[case] file: &str,
    #[case] expected_nodes: usize,
) {
    let result = service().layout_file(&resource(file), true).unwrap();

    assert_eq!(result.nodes.len(), expected_nodes);
    assert_eq!(result.connections.len(), expected_nodes - 1);
    assert!(result.nodes[0].is_root);
}

#[test]
fn given_bundle_when_loading_without_cleaning_then_raw_labels_kept() {
    let tree = service().load_tree(&resource("bundle.json"), false).unwrap();

    assert_eq!(tree.text, "  The Cell ");
    assert_eq!(tree.node_count(), 7);
}

#[test]
fn given_bundle_when_loading_with_cleaning_then_blank_and_duplicate_siblings_dropped() {
    let tree = service().load_tree(&resource("bundle.json"), true).unwrap();

    assert_eq!(tree.text, "The Cell");
    assert_eq!(tree.leaf_texts(), vec!["Nucleus", "Mitochondria", "Membrane"]);
}

#[test]
fn given_cyclic_table_when_laying_out_then_domain_error() {
    let err = service()
        .layout_file(&resource("cyclic_table.json"), true)
        .unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::CycleDetected(1))
    ));
}

#[test]
fn given_bundle_without_mind_map_when_laying_out_then_missing_root() {
    let err = service()
        .layout_file(&resource("bundle_without_mindmap.json"), true)
        .unwrap_err();

    assert!(matches!(err, ApplicationError::Domain(DomainError::MissingRoot)));
}

#[test]
fn given_invalid_json_when_laying_out_then_parse_error_names_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.json");
    std::fs::write(&path, "{ \"id\": 1, ").unwrap();

    let err = service().layout_file(&path, true).unwrap_err();

    assert!(matches!(err, ApplicationError::Parse { .. }));
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn given_missing_file_when_laying_out_then_operation_failed() {
    let err = service()
        .layout_file(Path::new("/nonexistent/map.json"), true)
        .unwrap_err();

    assert!(matches!(err, ApplicationError::OperationFailed { .. }));
}

#[test]
fn given_custom_spacing_when_laying_out_then_settings_are_used() {
    let mut settings = Settings::default();
    settings.layout.horizontal_spacing = 100.0;
    settings.layout.vertical_spacing = 50.0;

    let result = service_with(settings)
        .layout_file(&resource("tree.json"), true)
        .unwrap();

    assert_eq!(result.bounds.width, 300.0);
    assert_eq!(result.bounds.height, 150.0);
}

#[test]
fn given_no_output_path_when_rendering_then_svg_lands_in_output_dir() {
    let temp = TempDir::new().unwrap();
    let mut settings = Settings::default();
    settings.render.output_dir = temp.path().join("maps");

    let written = service_with(settings)
        .render_file(&resource("tree.json"), &RenderOptions::default())
        .unwrap();

    assert_eq!(written, temp.path().join("maps/tree.svg"));
    let svg = RealFileSystem.read_to_string(&written).unwrap();
    assert!(svg.starts_with("<svg "));
    assert_eq!(svg.matches("<g class=\"node\"").count(), 6);
    assert_eq!(svg.matches("<path ").count(), 5);
}

#[test]
fn given_explicit_output_and_size_when_rendering_then_used() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("nested/dir/cell.svg");
    let options = RenderOptions {
        output: Some(output.clone()),
        width: Some(640.0),
        height: Some(480.0),
        with_quote: false,
    };

    let written = service()
        .render_file(&resource("bundle.json"), &options)
        .unwrap();

    assert_eq!(written, output);
    let svg = std::fs::read_to_string(&output).unwrap();
    assert!(svg.contains("width=\"640\" height=\"480\""));
    assert!(!svg.contains("class=\"caption\""));
}

#[test]
fn given_quote_requested_when_rendering_then_caption_from_provider() {
    let temp = TempDir::new().unwrap();
    let options = RenderOptions {
        output: Some(temp.path().join("quoted.svg")),
        with_quote: true,
        ..RenderOptions::default()
    };
    let service = service().with_quotes(Arc::new(FixedQuote("Stay curious".into())));

    let written = service.render_file(&resource("tree.json"), &options).unwrap();

    let svg = std::fs::read_to_string(written).unwrap();
    assert!(svg.contains("Stay curious"));
}

#[test]
fn given_non_positive_viewport_when_rendering_then_config_error() {
    let tree = service().load_tree(&resource("tree.json"), true).unwrap();
    let options = RenderOptions {
        width: Some(0.0),
        ..RenderOptions::default()
    };

    let err = service().render_tree(&tree, &options).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
}

#[test]
fn given_very_deep_node_table_when_laying_out_then_completes() {
    const DEPTH: u32 = 200_000;
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("chain.json");
    let nodes: Vec<_> = (0..=DEPTH)
        .map(|id| {
            let children: Vec<u32> = if id < DEPTH { vec![id + 1] } else { vec![] };
            serde_json::json!({ "id": id, "text": format!("step {id}"), "children": children })
        })
        .collect();
    std::fs::write(&path, serde_json::json!({ "nodes": nodes }).to_string()).unwrap();

    let service = service();
    let tree = service.load_tree(&path, true).unwrap();
    let result = service.layout_tree(&tree).unwrap();

    assert_eq!(tree.node_count(), DEPTH as usize + 1);
    assert_eq!(result.nodes.len(), DEPTH as usize + 1);
    assert_eq!(result.max_depth(), DEPTH as usize);
    assert!(result.nodes.iter().all(|n| n.x == 0.0));
}
