//! Individual scene checks.
//!
//! Each check takes a `&Scene` and returns a `CheckResult`.

use std::collections::BTreeSet;

use crate::parser::{ReferenceKind, Value};
use crate::scene::Scene;

use super::diagnostic::{CheckResult, Diagnostic};

/// Nodes whose `instance` id names no external resource.
pub fn check_instances(scene: &Scene) -> CheckResult {
    let mut result = CheckResult::new();

    for (_, node) in scene.nodes() {
        let Some(id) = &node.instance_id else {
            continue;
        };
        if scene.external_resource(id).is_none() {
            result.push(
                Diagnostic::error(
                    "tscn::check::unresolved-instance",
                    format!("Node '{}' instances missing external resource '{}'", node.path, id),
                )
                .with_help("Add an [ext_resource] with this id or fix the node's instance field")
                .at_line(node.line),
            );
        }
    }

    result
}

/// Nodes whose `script` id resolves to neither kind of resource.
pub fn check_scripts(scene: &Scene) -> CheckResult {
    let mut result = CheckResult::new();

    for node in scene.scripted_nodes() {
        let Some(id) = &node.script_id else {
            continue;
        };
        if scene.external_resource(id).is_none() && scene.sub_resource(id).is_none() {
            result.push(
                Diagnostic::error(
                    "tscn::check::unresolved-script",
                    format!("Node '{}' uses script '{}' which is not declared", node.path, id),
                )
                .at_line(node.line),
            );
        }
    }

    result
}

/// `SubResource(...)` references without a matching `[sub_resource]`.
pub fn check_sub_resource_refs(scene: &Scene) -> CheckResult {
    let mut result = CheckResult::new();

    for (id, line) in references(scene, ReferenceKind::Sub) {
        if scene.sub_resource(&id).is_none() {
            result.push(
                Diagnostic::error(
                    "tscn::check::unresolved-sub-resource",
                    format!("SubResource '{}' is not declared", id),
                )
                .at_line(line),
            );
        }
    }

    result
}

/// Nodes that were detached because their parent came later.
pub fn check_orphans(scene: &Scene) -> CheckResult {
    let mut result = CheckResult::new();

    for path in &scene.orphans {
        let mut diagnostic = Diagnostic::warning(
            "tscn::check::orphan-node",
            format!("Node '{}' is not reachable from the root", path),
        )
        .with_help("Declare parent nodes before their children");
        if let Some(node) = scene.node(path) {
            diagnostic = diagnostic.at_line(node.line);
        }
        result.push(diagnostic);
    }

    result
}

/// External resources that nothing in the file refers to.
pub fn check_unused_external(scene: &Scene) -> CheckResult {
    let mut result = CheckResult::new();

    let mut used: BTreeSet<String> = references(scene, ReferenceKind::External)
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    used.extend(scene.nodes().filter_map(|(_, n)| n.instance_id.clone()));
    used.extend(scene.nodes().filter_map(|(_, n)| n.script_id.clone()));

    for (id, resource) in &scene.external_resources {
        if !used.contains(id) {
            result.push(
                Diagnostic::warning(
                    "tscn::check::unused-resource",
                    format!(
                        "External resource '{}' ({}) is never used",
                        id,
                        resource.path.as_deref().unwrap_or("no path")
                    ),
                )
                .at_line(resource.line),
            );
        }
    }

    result
}

/// A scene file with no root node.
pub fn check_root(scene: &Scene) -> CheckResult {
    let mut result = CheckResult::new();

    let is_scene = scene
        .header
        .as_ref()
        .map(|h| h.tag == "gd_scene")
        .unwrap_or(true);
    if is_scene && scene.root().is_none() {
        result.push(
            Diagnostic::error(
                "tscn::check::missing-root",
                format!("Scene '{}' has no root node", scene.title),
            )
            .with_help("Add a [node] section without a parent field"),
        );
    }

    result
}

/// Every resource reference of one kind, with the line it appears on.
fn references(scene: &Scene, kind: ReferenceKind) -> Vec<(String, u32)> {
    let mut out = Vec::new();

    let values = scene
        .nodes()
        .flat_map(|(_, n)| n.properties.iter())
        .chain(scene.sub_resources.values().flat_map(|r| r.properties.iter()))
        .map(|p| (&p.value.value, p.line));

    for (value, line) in values {
        collect(value, kind, line, &mut out);
    }

    out.sort();
    out.dedup();
    out
}

fn collect(value: &Value, kind: ReferenceKind, line: u32, out: &mut Vec<(String, u32)>) {
    match value {
        Value::Reference { kind: k, id } if *k == kind => out.push((id.clone(), line)),
        Value::Construct { name, .. } if ReferenceKind::from_constructor(name) == Some(kind) => {
            if let Some(id) = value.reference_id() {
                out.push((id, line));
            }
        }
        Value::Array(items) => {
            for item in items {
                collect(&item.value, kind, item.line, out);
            }
        }
        Value::Dictionary(entries) => {
            for (key, item) in entries {
                collect(&key.value, kind, key.line, out);
                collect(&item.value, kind, item.line, out);
            }
        }
        _ => {}
    }
}
