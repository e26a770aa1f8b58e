use std::path::PathBuf;

use pretty_assertions::assert_eq;
use tscn::{check_scene, load_scene, ParseOptions, Value};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_level_tree() {
    let scene = load_scene(&fixture("level.tscn"), &ParseOptions::default(), None).unwrap();

    let walked: Vec<(usize, &str)> = scene
        .walk()
        .into_iter()
        .map(|(depth, node)| (depth, node.path.as_str()))
        .collect();

    assert_eq!(
        walked,
        vec![
            (0, "Level"),
            (1, "Level/Tiles"),
            (1, "Level/Player"),
            (1, "Level/Enemies"),
            (2, "Level/Enemies/Slime"),
            (2, "Level/Enemies/Slime2"),
            (1, "Level/Goal"),
            (2, "Level/Goal/Shape"),
            (2, "Level/Goal/Label"),
        ]
    );
    assert!(scene.orphans.is_empty());
}

#[test]
fn test_level_resources() {
    let scene = load_scene(&fixture("level.tscn"), &ParseOptions::default(), None).unwrap();

    assert_eq!(scene.external_resources.len(), 4);
    assert_eq!(scene.sub_resources.len(), 3);
    assert_eq!(scene.header.as_ref().and_then(|h| h.load_steps), Some(7));

    let slime = scene.node("Level/Enemies/Slime2").unwrap();
    assert_eq!(slime.resource_path.as_deref(), Some("res://enemies/slime.tscn"));
    assert!(slime.instanced_scene);
    assert!(matches!(
        slime.property("patrol").unwrap().value.value,
        Value::Dictionary(ref entries) if entries.len() == 2
    ));

    let label = scene.node("Level/Goal/Label").unwrap();
    assert_eq!(label.property("text").unwrap().value.value.as_str(), Some("Goal, finally"));
    assert!(scene.node("Level/Goal").unwrap().unique);
}

#[test]
fn test_level_is_clean() {
    let scene = load_scene(&fixture("level.tscn"), &ParseOptions::default(), None).unwrap();
    let result = check_scene(&scene);

    assert!(result.is_ok(), "{:?}", result.iter().collect::<Vec<_>>());
}

#[test]
fn test_level_strict_options_accept_fixture() {
    let options = ParseOptions {
        strict_references: true,
        strict_order: true,
        ..Default::default()
    };
    assert!(load_scene(&fixture("level.tscn"), &options, None).is_ok());
}
