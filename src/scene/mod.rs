//! Scene graph built from a parsed text scene.
//!
//! Nodes live in a single arena owned by the [`Scene`]. A node's
//! `children` list is the only ownership edge; `parent` is the parent's
//! absolute path, resolved through the path index on demand. This keeps the
//! tree free of reference cycles while still allowing upward navigation.
//!
//! # Example
//!
//! ```ignore
//! use tscn::scene::parse_scene;
//!
//! let scene = parse_scene("res://player.tscn", &source)?;
//! for (depth, node) in scene.walk() {
//!     println!("{}{} ({})", "  ".repeat(depth), node.label, node.class_name);
//! }
//! ```

mod builder;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Serialize, Serializer};

use crate::parser::NodeProperty;

pub use builder::{parse_scene, parse_scene_with, ParseOptions};

/// Class name given to nodes that instance another scene without a `type`.
pub const INSTANCE_CLASS: &str = "PackedScene";

/// Index of a node in its scene's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in the scene arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// An external (`ext_resource`) or inline (`sub_resource`) resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub line: u32,
    /// Header text plus any property lines.
    pub body: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<NodeProperty>,
}

/// One `[node]` section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneNode {
    pub label: String,
    pub class_name: String,
    /// Absolute path from the scene root, e.g. `Root/Body/Sprite`.
    pub path: String,
    /// Path relative to the root as written in the file, e.g. `Body/Sprite`.
    pub relative_path: String,
    /// Absolute path of the parent node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Header text.
    pub text: String,
    /// Header text plus property lines.
    pub body: String,
    pub line: u32,
    /// Byte offset of the header.
    pub position: usize,
    pub unique: bool,
    pub has_script: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_id: Option<String>,
    /// External resource id from the `instance` field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    /// Path of the instanced external resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    /// The node instances another scene file.
    pub instanced_scene: bool,
    pub properties: Vec<NodeProperty>,
    #[serde(skip)]
    pub children: Vec<NodeId>,
}

impl SceneNode {
    /// Get a property by name.
    pub fn property(&self, name: &str) -> Option<&NodeProperty> {
        self.properties
            .iter()
            .find(|p| p.name.as_deref() == Some(name))
    }

    /// Check if the node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Metadata from the leading `[gd_scene]` or `[gd_resource]` header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneHeader {
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_steps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
}

/// A fully parsed scene.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub path: String,
    pub title: String,
    /// Modification time in milliseconds, filled in by the file layer.
    pub mtime: Option<u64>,
    pub header: Option<SceneHeader>,
    pub external_resources: BTreeMap<String, Resource>,
    pub sub_resources: BTreeMap<String, Resource>,
    /// Absolute paths of nodes whose parent was not declared before them.
    pub orphans: Vec<String>,
    pub(crate) root: Option<NodeId>,
    pub(crate) arena: Vec<SceneNode>,
    pub(crate) index: HashMap<String, NodeId>,
}

impl Scene {
    pub(crate) fn new(path: &str) -> Self {
        let title = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());

        Self {
            path: path.to_string(),
            title,
            ..Default::default()
        }
    }

    /// The first parentless node, if any.
    pub fn root(&self) -> Option<&SceneNode> {
        self.root.map(|id| self.get(id))
    }

    /// Arena id of the root node, if the scene has one.
    pub fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    /// Node for an id handed out by this scene. Panics on an id from another scene.
    pub fn get(&self, id: NodeId) -> &SceneNode {
        &self.arena[id.0]
    }

    /// Arena id of the node at an absolute path.
    pub fn id_of(&self, path: &str) -> Option<NodeId> {
        self.index.get(path).copied()
    }

    /// Look a node up by absolute path.
    pub fn node(&self, path: &str) -> Option<&SceneNode> {
        self.id_of(path).map(|id| self.get(id))
    }

    /// Every node with its absolute path, in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &SceneNode)> {
        self.arena.iter().map(|n| (n.path.as_str(), n))
    }

    /// Number of nodes, orphans included.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Direct children of the node at `path`, in declaration order.
    pub fn children(&self, path: &str) -> impl Iterator<Item = &SceneNode> {
        self.node(path)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|id| self.get(*id))
    }

    /// Parent of the node at `path`.
    pub fn parent(&self, path: &str) -> Option<&SceneNode> {
        let parent = self.node(path)?.parent.as_deref()?;
        self.node(parent)
    }

    /// Depth-first pre-order walk from the root, with depth.
    pub fn walk(&self) -> Vec<(usize, &SceneNode)> {
        let mut out = Vec::with_capacity(self.arena.len());
        let mut stack: Vec<(usize, NodeId)> = self.root.map(|id| (0, id)).into_iter().collect();

        while let Some((depth, id)) = stack.pop() {
            let node = self.get(id);
            out.push((depth, node));
            for child in node.children.iter().rev() {
                stack.push((depth + 1, *child));
            }
        }

        out
    }

    /// Nodes with a `script` property.
    pub fn scripted_nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.arena.iter().filter(|n| n.has_script)
    }

    /// Get an `[ext_resource]` by id.
    pub fn external_resource(&self, id: &str) -> Option<&Resource> {
        self.external_resources.get(id)
    }

    /// Get a `[sub_resource]` by id.
    pub fn sub_resource(&self, id: &str) -> Option<&Resource> {
        self.sub_resources.get(id)
    }

    /// Nested view of the node tree for serialization.
    pub fn to_tree(&self) -> Option<TreeView<'_>> {
        self.root.map(|id| self.tree_at(id))
    }

    fn tree_at(&self, id: NodeId) -> TreeView<'_> {
        let node = self.get(id);
        TreeView {
            node,
            children: node.children.iter().map(|c| self.tree_at(*c)).collect(),
        }
    }

    /// Serializable summary of the whole scene.
    pub fn export(&self) -> SceneExport<'_> {
        SceneExport {
            path: &self.path,
            title: &self.title,
            mtime: self.mtime,
            header: self.header.as_ref(),
            external_resources: &self.external_resources,
            sub_resources: &self.sub_resources,
            root: self.to_tree(),
            orphans: &self.orphans,
        }
    }
}

/// Serializes as [`SceneExport`], with the tree nested instead of the arena.
impl Serialize for Scene {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.export().serialize(serializer)
    }
}

/// A node with its children expanded inline.
#[derive(Debug, Serialize)]
pub struct TreeView<'a> {
    #[serde(flatten)]
    pub node: &'a SceneNode,
    pub children: Vec<TreeView<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneExport<'a> {
    pub path: &'a str,
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtime: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<&'a SceneHeader>,
    pub external_resources: &'a BTreeMap<String, Resource>,
    pub sub_resources: &'a BTreeMap<String, Resource>,
    pub root: Option<TreeView<'a>>,
    pub orphans: &'a [String],
}
