//! Resources command implementation.
//!
//! Lists the external and inline resources each scene declares.

use std::fmt::Write;
use std::path::PathBuf;

use clap::Args;

use crate::discovery::load_scene;
use crate::error::Result;
use crate::output::{display_path, plural, Printer};
use crate::scene::Scene;

use super::{find_scenes, ParseFlags};

/// List external and inline resources
#[derive(Args, Debug)]
pub struct ResourcesArgs {
    /// Scene files or directories (default: current project)
    pub files: Vec<PathBuf>,

    /// Only list external resources
    #[arg(long)]
    pub external: bool,

    #[command(flatten)]
    pub parse: ParseFlags,
}

/// Run the resources command.
pub fn run(args: ResourcesArgs, printer: &Printer) -> Result<()> {
    let discovery = find_scenes(&args.files)?;
    let options = args.parse.apply(discovery.manifest.parse_options());

    for path in &discovery.scan.scenes {
        let scene = load_scene(path, &options, None)?;
        printer.info(
            "Scene",
            &format!(
                "{} ({}, {})",
                display_path(path),
                plural(scene.external_resources.len(), "external", "external"),
                plural(scene.sub_resources.len(), "inline", "inline")
            ),
        );
        print!("{}", render_resources(&scene, args.external));
    }

    Ok(())
}

/// One line per resource: `ext <id> <type> <path>` or `sub <id> <type>`.
pub fn render_resources(scene: &Scene, external_only: bool) -> String {
    let mut out = String::new();

    for resource in scene.external_resources.values() {
        let _ = writeln!(
            out,
            "ext {} {} {}",
            resource.id,
            resource.kind,
            resource.path.as_deref().unwrap_or("-")
        );
    }

    if !external_only {
        for resource in scene.sub_resources.values() {
            let _ = writeln!(
                out,
                "sub {} {} ({})",
                resource.id,
                resource.kind,
                plural(resource.properties.len(), "property", "properties")
            );
        }
    }

    out
}
