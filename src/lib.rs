//! tscn - Parser for Godot text scenes
//!
//! Reads `.tscn` files into a navigable scene graph: the scene header,
//! external and inline resources, and the node tree with each node's
//! properties, script and instanced scene.
//!
//! ```ignore
//! let scene = tscn::parse_scene("res://player.tscn", &source)?;
//! let root = scene.root().unwrap();
//! println!("{} has {} children", root.label, root.children.len());
//! ```

pub mod check;
pub mod cli;
pub mod discovery;
pub mod error;
pub mod output;
pub mod parser;
pub mod scene;

pub use check::{check_scene, CheckResult, Diagnostic, Severity};
pub use discovery::{discover, discover_paths, load_scene, DiscoveryResult, Manifest, ScanResult, SceneCache};
pub use error::{Result, SceneError};
pub use parser::{tokenize, Location, NodeProperty, Parser, PropertyValue, Tag, Token, TokenKind, Value, ValueKind};
pub use scene::{parse_scene, parse_scene_with, NodeId, ParseOptions, Resource, Scene, SceneHeader, SceneNode};
