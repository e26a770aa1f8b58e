//! Top-level scene assembly.
//!
//! Walks the token stream once. A `[` in the first column of a line starts
//! a section header; every other top-level token is skipped. Sections are
//! dispatched on their tag name and the property lines following
//! `sub_resource` and `node` headers are gathered into their bodies.

use tracing::{debug, trace, warn};

use crate::error::{Result, SceneError};
use crate::parser::{NodeProperty, Parser, Tag, TokenKind, DEFAULT_MAX_DEPTH};

use super::{NodeId, Resource, Scene, SceneHeader, SceneNode, INSTANCE_CLASS};

/// Knobs for a single parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum array/dictionary nesting.
    pub max_depth: usize,
    /// Fail on `instance` ids missing from the external resources.
    pub strict_references: bool,
    /// Fail on nodes whose parent has not been declared yet.
    pub strict_order: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            strict_references: false,
            strict_order: false,
        }
    }
}

/// Parse a whole scene text with default options.
///
/// `path` only names the scene; nothing is read from disk.
pub fn parse_scene(path: &str, source: &str) -> Result<Scene> {
    parse_scene_with(path, source, &ParseOptions::default())
}

/// Parse a whole scene text.
pub fn parse_scene_with(path: &str, source: &str, options: &ParseOptions) -> Result<Scene> {
    SceneBuilder::new(path, source, *options).build()
}

struct SceneBuilder<'a> {
    parser: Parser<'a>,
    scene: Scene,
    options: ParseOptions,
}

impl<'a> SceneBuilder<'a> {
    fn new(path: &str, source: &'a str, options: ParseOptions) -> Self {
        Self {
            parser: Parser::with_max_depth(source, options.max_depth),
            scene: Scene::new(path),
            options,
        }
    }

    fn build(mut self) -> Result<Scene> {
        loop {
            let (kind, line_start) = {
                let token = self.parser.lexer().peek()?;
                (token.kind, token.at_line_start())
            };
            match kind {
                TokenKind::EndOfInput => break,
                TokenKind::BracketOpen if line_start => {
                    let tag = self.parser.parse_tag()?;
                    self.dispatch(tag)?;
                }
                _ => {
                    let skipped = self.parser.lexer().next_token()?;
                    trace!(kind = ?skipped.kind, line = skipped.line(), "skipping token");
                }
            }
        }

        debug!(
            path = %self.scene.path,
            nodes = self.scene.node_count(),
            external = self.scene.external_resources.len(),
            sub = self.scene.sub_resources.len(),
            "parsed scene"
        );
        Ok(self.scene)
    }

    fn dispatch(&mut self, tag: Tag) -> Result<()> {
        debug!(tag = %tag.name, line = tag.line, "section");

        match tag.name.as_str() {
            "ext_resource" => {
                self.add_external_resource(tag);
                Ok(())
            }
            "sub_resource" => {
                let properties = self.read_properties()?;
                self.add_sub_resource(tag, properties);
                Ok(())
            }
            "node" => {
                let properties = self.read_properties()?;
                self.add_node(tag, properties)
            }
            name if name == "gd_scene" || name.starts_with("gd_resource") => {
                self.scene.header = Some(header_from(&tag));
                Ok(())
            }
            _ => {
                self.read_properties()?;
                Ok(())
            }
        }
    }

    /// Gather `name = value` lines until the next non-identifier token.
    ///
    /// Anything other than a section header or the end of input stops the run
    /// early; the rest of the section is skipped by the top-level loop.
    fn read_properties(&mut self) -> Result<Vec<NodeProperty>> {
        let mut properties = Vec::new();
        while self.parser.lexer().peek()?.kind == TokenKind::Identifier {
            properties.push(self.parser.parse_property()?);
        }

        let next = self.parser.lexer().peek()?;
        let ends_section = next.kind == TokenKind::EndOfInput
            || (next.kind == TokenKind::BracketOpen && next.at_line_start());
        if !ends_section {
            warn!(
                line = next.line(),
                found = %next.kind,
                text = %next.text,
                "unsupported property syntax, skipping the rest of the section"
            );
        }
        Ok(properties)
    }

    fn add_external_resource(&mut self, tag: Tag) {
        let resource = Resource {
            id: tag.field_str("id").unwrap_or_default(),
            uid: tag.field_str("uid"),
            kind: tag.field_str("type").unwrap_or_default(),
            path: tag.field_str("path"),
            line: tag.line,
            body: tag.text,
            properties: Vec::new(),
        };
        self.scene
            .external_resources
            .insert(resource.id.clone(), resource);
    }

    fn add_sub_resource(&mut self, tag: Tag, properties: Vec<NodeProperty>) {
        let resource = Resource {
            id: tag.field_str("id").unwrap_or_default(),
            uid: tag.field_str("uid"),
            kind: tag.field_str("type").unwrap_or_default(),
            path: None,
            line: tag.line,
            body: join_body(&tag.text, &properties),
            properties,
        };
        self.scene.sub_resources.insert(resource.id.clone(), resource);
    }

    fn add_node(&mut self, tag: Tag, properties: Vec<NodeProperty>) -> Result<()> {
        let label = tag.field_str("name").unwrap_or_default();
        let class_name = tag
            .field_str("type")
            .unwrap_or_else(|| INSTANCE_CLASS.to_string());

        let root_path = self.scene.root().map(|r| r.path.clone()).unwrap_or_default();
        let (path, relative_path, parent) = match tag.field_str("parent") {
            None => (label.clone(), label.clone(), None),
            Some(p) if p == "." => (join_path(&root_path, &label), label.clone(), Some(root_path)),
            Some(p) => {
                let absolute_parent = join_path(&root_path, &p);
                (
                    join_path(&absolute_parent, &label),
                    join_path(&p, &label),
                    Some(absolute_parent),
                )
            }
        };

        if self.scene.index.contains_key(&path) {
            return Err(SceneError::DuplicateNode {
                path,
                line: tag.line,
            });
        }

        let parent_id = match &parent {
            Some(parent_path) => self.scene.id_of(parent_path),
            None => self.scene.root_id(),
        };
        let attach_to_parent = parent.is_some() && parent_id.is_some();
        let becomes_root = parent.is_none() && parent_id.is_none();

        if !attach_to_parent && !becomes_root {
            let parent_path = parent.clone().unwrap_or_default();
            if self.options.strict_order {
                return Err(SceneError::OrphanNode {
                    path,
                    parent: parent_path,
                    line: tag.line,
                });
            }
            warn!(node = %path, parent = %parent_path, line = tag.line, "parent not declared before node");
        }

        let mut node = SceneNode {
            label,
            class_name,
            path: path.clone(),
            relative_path,
            parent,
            text: tag.text.clone(),
            body: join_body(&tag.text, &properties),
            line: tag.line,
            position: tag.position,
            unique: false,
            has_script: false,
            script_id: None,
            instance_id: None,
            resource_path: None,
            tooltip: None,
            instanced_scene: false,
            properties,
            children: Vec::new(),
        };

        node.unique = node
            .property("unique_name_in_owner")
            .and_then(|p| p.value.value.as_bool())
            .unwrap_or(false);

        self.resolve_instance(&tag, &mut node)?;

        if let Some(script) = node.property("script") {
            node.script_id = script.value.value.reference_id();
            node.has_script = true;
        }

        let id = NodeId(self.scene.arena.len());
        self.scene.arena.push(node);
        self.scene.index.insert(path.clone(), id);

        if becomes_root {
            self.scene.root = Some(id);
        } else if let (true, Some(parent_id)) = (attach_to_parent, parent_id) {
            self.scene.arena[parent_id.index()].children.push(id);
        } else {
            self.scene.orphans.push(path);
        }

        Ok(())
    }

    /// Fill in resource metadata for nodes that instance an external resource.
    fn resolve_instance(&self, tag: &Tag, node: &mut SceneNode) -> Result<()> {
        let Some(id) = tag.field("instance").and_then(|v| v.value.reference_id()) else {
            return Ok(());
        };
        node.instance_id = Some(id.clone());

        match self.scene.external_resource(&id) {
            Some(resource) => {
                node.resource_path = resource.path.clone();
                node.tooltip = resource.path.clone();
                node.instanced_scene = resource
                    .path
                    .as_deref()
                    .map(is_scene_path)
                    .unwrap_or(false);
                Ok(())
            }
            None if self.options.strict_references => Err(SceneError::UnresolvedReference {
                kind: "external",
                id,
                line: tag.line,
            }),
            None => {
                warn!(node = %node.path, id = %id, line = tag.line, "unresolved instance reference");
                Ok(())
            }
        }
    }
}

fn header_from(tag: &Tag) -> SceneHeader {
    let number = |name: &str| {
        tag.field(name)
            .and_then(|v| v.value.as_number())
            .map(|n| n as u32)
    };

    SceneHeader {
        tag: tag.name.clone(),
        format: number("format"),
        load_steps: number("load_steps"),
        uid: tag.field_str("uid"),
        resource_type: tag.field_str("type"),
    }
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", base, name)
    }
}

fn join_body(header: &str, properties: &[NodeProperty]) -> String {
    std::iter::once(header)
        .chain(properties.iter().map(|p| p.text.as_str()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_scene_path(path: &str) -> bool {
    path.ends_with(".tscn") || path.ends_with(".scn")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::span::Location;
    use crate::parser::Value;
    use pretty_assertions::assert_eq;

    const PLAYER: &str = r#"[gd_scene load_steps=4 format=3 uid="uid://b8k2"]

[ext_resource type="Script" uid="uid://d1" path="res://player/player.gd" id="1_scr"]
[ext_resource type="PackedScene" uid="uid://d2" path="res://weapons/sword.tscn" id="2_swd"]

[sub_resource type="CapsuleShape2D" id="CapsuleShape2D_a1"]
radius = 6.0
height = 20.0

[node name="Player" type="CharacterBody2D"]
script = ExtResource("1_scr")
metadata/tags = ["hero", "controllable"]

[node name="Shape" type="CollisionShape2D" parent="."]
shape = SubResource("CapsuleShape2D_a1")

[node name="Hand" type="Marker2D" parent="."]
unique_name_in_owner = true
position = Vector2(8, -4)

[node name="Sword" parent="Hand" instance=ExtResource("2_swd")]

[connection signal="hit" from="Sword" to="." method="_on_hit"]
"#;

    fn paths(scene: &Scene, parent: &str) -> Vec<String> {
        scene.children(parent).map(|n| n.path.clone()).collect()
    }

    #[test]
    fn test_path_resolution() {
        let source = "[node name=\"A\"]\n[node name=\"B\" parent=\".\"]\n[node name=\"C\" parent=\"B\"]\n";
        let scene = parse_scene("t.tscn", source).unwrap();

        assert_eq!(scene.root().unwrap().label, "A");
        assert_eq!(scene.node("A/B").unwrap().relative_path, "B");
        assert_eq!(scene.node("A/B/C").unwrap().relative_path, "B/C");
        assert_eq!(scene.node("A/B/C").unwrap().parent.as_deref(), Some("A/B"));
        assert_eq!(paths(&scene, "A"), vec!["A/B"]);
        assert_eq!(paths(&scene, "A/B"), vec!["A/B/C"]);
    }

    #[test]
    fn test_every_reachable_node_is_indexed_once() {
        let scene = parse_scene("player.tscn", PLAYER).unwrap();

        let walked: Vec<&str> = scene.walk().into_iter().map(|(_, n)| n.path.as_str()).collect();
        assert_eq!(walked.len(), scene.nodes().count());
        for path in walked {
            assert_eq!(scene.node(path).unwrap().path, path);
        }
    }

    #[test]
    fn test_resources() {
        let scene = parse_scene("player.tscn", PLAYER).unwrap();

        let script = scene.external_resource("1_scr").unwrap();
        assert_eq!(script.kind, "Script");
        assert_eq!(script.path.as_deref(), Some("res://player/player.gd"));
        assert_eq!(script.uid.as_deref(), Some("uid://d1"));
        assert_eq!(script.line, 3);
        assert_eq!(
            script.body,
            "[ext_resource type=\"Script\" uid=\"uid://d1\" path=\"res://player/player.gd\" id=\"1_scr\"]"
        );

        let shape = scene.sub_resource("CapsuleShape2D_a1").unwrap();
        assert_eq!(shape.kind, "CapsuleShape2D");
        assert_eq!(shape.properties.len(), 2);
        assert_eq!(
            shape.body,
            "[sub_resource type=\"CapsuleShape2D\" id=\"CapsuleShape2D_a1\"]\nradius = 6.0\nheight = 20.0"
        );
    }

    #[test]
    fn test_header() {
        let scene = parse_scene("player.tscn", PLAYER).unwrap();
        let header = scene.header.unwrap();

        assert_eq!(header.tag, "gd_scene");
        assert_eq!(header.format, Some(3));
        assert_eq!(header.load_steps, Some(4));
        assert_eq!(header.uid.as_deref(), Some("uid://b8k2"));
    }

    #[test]
    fn test_script_detection() {
        let scene = parse_scene("player.tscn", PLAYER).unwrap();
        let root = scene.root().unwrap();

        assert!(root.has_script);
        assert_eq!(root.script_id.as_deref(), Some("1_scr"));
        assert!(!scene.node("Player/Shape").unwrap().has_script);
        assert_eq!(scene.scripted_nodes().count(), 1);
    }

    #[test]
    fn test_script_detection_with_any_constructor() {
        let source = "[ext_resource type=\"Script\" path=\"res://a.gd\" id=\"res_1\"]\n\n[node name=\"A\" type=\"Node\"]\nscript = SomeConstruct(\"res_1\")\n";
        let scene = parse_scene("a.tscn", source).unwrap();
        let root = scene.root().unwrap();

        assert!(root.has_script);
        assert_eq!(root.script_id.as_deref(), Some("res_1"));
    }

    #[test]
    fn test_instance_node() {
        let scene = parse_scene("player.tscn", PLAYER).unwrap();
        let sword = scene.node("Player/Hand/Sword").unwrap();

        assert_eq!(sword.class_name, INSTANCE_CLASS);
        assert_eq!(sword.resource_path.as_deref(), Some("res://weapons/sword.tscn"));
        assert_eq!(sword.tooltip.as_deref(), Some("res://weapons/sword.tscn"));
        assert!(sword.instanced_scene);
        assert_eq!(sword.relative_path, "Hand/Sword");
    }

    #[test]
    fn test_unique_and_properties() {
        let scene = parse_scene("player.tscn", PLAYER).unwrap();
        let hand = scene.node("Player/Hand").unwrap();

        assert!(hand.unique);
        assert!(!scene.root().unwrap().unique);
        assert_eq!(hand.properties.len(), 2);
        assert_eq!(
            hand.body,
            "[node name=\"Hand\" type=\"Marker2D\" parent=\".\"]\nunique_name_in_owner = true\nposition = Vector2(8, -4)"
        );
        assert_eq!(hand.line, 17);
    }

    #[test]
    fn test_array_property_on_node() {
        let scene = parse_scene("player.tscn", PLAYER).unwrap();
        let tags = scene.root().unwrap().property("metadata/tags").unwrap();

        assert_eq!(tags.text, "metadata/tags = [\"hero\", \"controllable\"]");
        assert_eq!(tags.elements().len(), 2);
    }

    #[test]
    fn test_unsupported_value_syntax_skips_rest_of_section() {
        let source = "[node name=\"A\"]\nitems = Array[int]([1, 2])\nvisible = false\n\n[node name=\"B\" parent=\".\"]\nz = 1\n";
        let scene = parse_scene("t.tscn", source).unwrap();

        let root = scene.root().unwrap();
        let texts: Vec<&str> = root.properties.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["items = Array"]);
        assert!(root.property("visible").is_none());

        let b = scene.node("A/B").unwrap();
        assert_eq!(b.property("z").unwrap().text, "z = 1");
    }

    #[test]
    fn test_other_tags_are_ignored() {
        let scene = parse_scene("player.tscn", PLAYER).unwrap();
        assert_eq!(scene.node_count(), 4);
    }

    #[test]
    fn test_line_initial_bracket_inside_value_is_not_a_header() {
        let source = "[node name=\"A\"]\npoints = [\n1, 2\n]\n[node name=\"B\" parent=\".\"]\n";
        // The closing bracket at column 1 is consumed by the array itself
        let scene = parse_scene("t.tscn", source).unwrap();

        assert_eq!(scene.node_count(), 2);
        let points = scene.root().unwrap().property("points").unwrap();
        assert_eq!(points.text, "points = [1, 2]");
    }

    #[test]
    fn test_malformed_header_commits_nothing() {
        let source = "[node name=\"A\"]\n[node name=]\n";
        let err = parse_scene("t.tscn", source).unwrap_err();

        match err {
            SceneError::ExpectedValue { found, location } => {
                assert_eq!(found, TokenKind::BracketClose);
                assert_eq!(location, Location::new(27, 2, 12));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_property_aborts_parse() {
        let source = "[node name=\"A\"]\nposition = Vector2(1, 2\n";
        assert!(matches!(
            parse_scene("t.tscn", source),
            Err(SceneError::Lex { .. })
        ));
    }

    #[test]
    fn test_out_of_order_parent_is_orphaned() {
        let source = "[node name=\"A\"]\n[node name=\"C\" parent=\"B\"]\n[node name=\"B\" parent=\".\"]\n";
        let scene = parse_scene("t.tscn", source).unwrap();

        assert_eq!(scene.orphans, vec!["A/B/C".to_string()]);
        assert!(scene.node("A/B/C").is_some());
        assert_eq!(paths(&scene, "A/B"), Vec::<String>::new());
        assert_eq!(scene.walk().len(), 2);
    }

    #[test]
    fn test_out_of_order_parent_strict() {
        let source = "[node name=\"A\"]\n[node name=\"C\" parent=\"B\"]\n";
        let options = ParseOptions {
            strict_order: true,
            ..Default::default()
        };

        let err = parse_scene_with("t.tscn", source, &options).unwrap_err();
        assert!(matches!(err, SceneError::OrphanNode { ref parent, .. } if parent == "A/B"));
    }

    #[test]
    fn test_unresolved_instance_degrades() {
        let source = "[node name=\"A\"]\n[node name=\"B\" parent=\".\" instance=ExtResource(\"9\")]\n";
        let scene = parse_scene("t.tscn", source).unwrap();
        let b = scene.node("A/B").unwrap();

        assert!(b.resource_path.is_none());
        assert_eq!(b.instance_id.as_deref(), Some("9"));
        assert!(!b.instanced_scene);
    }

    #[test]
    fn test_unresolved_instance_strict() {
        let source = "[node name=\"A\"]\n[node name=\"B\" parent=\".\" instance=ExtResource(\"9\")]\n";
        let options = ParseOptions {
            strict_references: true,
            ..Default::default()
        };

        let err = parse_scene_with("t.tscn", source, &options).unwrap_err();
        assert!(matches!(err, SceneError::UnresolvedReference { ref id, line: 2, .. } if id == "9"));
    }

    #[test]
    fn test_duplicate_node_path() {
        let source = "[node name=\"A\"]\n[node name=\"B\" parent=\".\"]\n[node name=\"B\" parent=\".\"]\n";
        assert!(matches!(
            parse_scene("t.tscn", source),
            Err(SceneError::DuplicateNode { line: 3, .. })
        ));
    }

    #[test]
    fn test_second_parentless_node_is_orphan() {
        let source = "[node name=\"A\"]\n[node name=\"Z\"]\n";
        let scene = parse_scene("t.tscn", source).unwrap();

        assert_eq!(scene.root().unwrap().label, "A");
        assert_eq!(scene.orphans, vec!["Z".to_string()]);
    }

    #[test]
    fn test_legacy_numeric_ids() {
        let source = "[gd_scene load_steps=2 format=2]\n\n[ext_resource path=\"res://enemy.tscn\" type=\"PackedScene\" id=1]\n\n[node name=\"Level\" type=\"Node2D\"]\n\n[node name=\"Enemy\" parent=\".\" instance=ExtResource( 1 )]\n";
        let scene = parse_scene("level.tscn", source).unwrap();

        assert!(scene.external_resource("1").is_some());
        assert_eq!(
            scene.node("Level/Enemy").unwrap().resource_path.as_deref(),
            Some("res://enemy.tscn")
        );
    }

    #[test]
    fn test_parse_is_deterministic() {
        let first = parse_scene("player.tscn", PLAYER).unwrap();
        let second = parse_scene("player.tscn", PLAYER).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_source() {
        let scene = parse_scene("empty.tscn", "").unwrap();

        assert!(scene.root().is_none());
        assert_eq!(scene.node_count(), 0);
    }

    #[test]
    fn test_resource_file() {
        let source = "[gd_resource type=\"Theme\" format=3]\n\n[sub_resource type=\"StyleBoxFlat\" id=\"1\"]\nbg_color = Color(0.1, 0.1, 0.1, 1)\n\n[resource]\ndefault_font_size = 14\n";
        let scene = parse_scene("ui.tres", source).unwrap();

        assert_eq!(scene.header.as_ref().unwrap().resource_type.as_deref(), Some("Theme"));
        let style = scene.sub_resource("1").unwrap();
        assert!(matches!(
            style.properties[0].value.value,
            Value::Construct { ref name, .. } if name == "Color"
        ));
    }
}
