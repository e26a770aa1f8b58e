//! Tree command implementation.
//!
//! Prints each scene's node hierarchy to stdout.

use std::fmt::Write;
use std::path::PathBuf;

use clap::Args;

use crate::discovery::load_scene;
use crate::error::{Result, SceneError};
use crate::output::{display_path, Printer};
use crate::scene::{Scene, SceneNode};

use super::{find_scenes, ParseFlags};

/// Print the node tree of each scene
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Scene files or directories (default: current project)
    pub files: Vec<PathBuf>,

    /// Show absolute node paths instead of names
    #[arg(long)]
    pub paths: bool,

    #[command(flatten)]
    pub parse: ParseFlags,
}

/// Run the tree command.
pub fn run(args: TreeArgs, printer: &Printer) -> Result<()> {
    let discovery = find_scenes(&args.files)?;
    let options = args.parse.apply(discovery.manifest.parse_options());
    let mut failed = 0;

    for path in &discovery.scan.scenes {
        match load_scene(path, &options, None) {
            Ok(scene) => {
                printer.info("Scene", &display_path(path));
                print!("{}", render_tree(&scene, args.paths));
            }
            Err(e) => {
                failed += 1;
                printer.error("Failed", &format!("{}: {}", display_path(path), e));
            }
        }
    }

    if failed > 0 {
        return Err(SceneError::Check {
            message: format!("{} scene(s) failed to parse", failed),
            help: None,
        });
    }
    Ok(())
}

/// Indented listing of the reachable tree followed by any orphans.
pub fn render_tree(scene: &Scene, paths: bool) -> String {
    let mut out = String::new();

    for (depth, node) in scene.walk() {
        let _ = writeln!(out, "{}{}", "  ".repeat(depth), describe(node, paths));
    }

    for path in &scene.orphans {
        if let Some(node) = scene.node(path) {
            let _ = writeln!(out, "(orphan) {}", describe(node, true));
        }
    }

    out
}

fn describe(node: &SceneNode, paths: bool) -> String {
    let name = if paths { &node.path } else { &node.label };
    let mut line = format!(
        "{}{} ({})",
        if node.unique { "%" } else { "" },
        name,
        node.class_name
    );

    if node.has_script {
        line.push_str(" [script]");
    }
    if let Some(resource) = &node.resource_path {
        let _ = write!(line, " -> {}", resource);
    }
    line
}
