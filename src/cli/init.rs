//! Init command implementation.
//!
//! Generates a `tscn.yaml` manifest from the scenes found in a project.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::discovery::{discover, Manifest, MANIFEST_FILENAME};
use crate::error::{Result, SceneError};
use crate::output::{display_path, plural, Printer};

/// Initialize a project by generating a tscn.yaml manifest
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project directory (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite an existing tscn.yaml
    #[arg(long)]
    pub force: bool,
}

/// Run the init command.
pub fn run(args: InitArgs, printer: &Printer) -> Result<()> {
    let manifest_path = args.path.join(MANIFEST_FILENAME);

    if manifest_path.exists() && !args.force {
        return Err(SceneError::Config {
            message: format!("{} already exists", MANIFEST_FILENAME),
            help: Some("Use --force to overwrite".to_string()),
        });
    }

    printer.status("Scanning", &display_path(&args.path));
    let discovery = discover(&args.path)?;

    // Top-level directories holding scenes, relative to the project root
    let mut sources = BTreeSet::new();
    for scene in &discovery.scan.scenes {
        let relative = scene.strip_prefix(&discovery.root).unwrap_or(scene);
        if let Some(dir) = top_level_dir(relative) {
            sources.insert(format!("{}/", dir));
        } else {
            sources.insert(".".to_string());
        }
    }

    let manifest = Manifest {
        sources: if sources.contains(".") {
            vec![]
        } else {
            sources.iter().cloned().collect()
        },
        ..Default::default()
    };

    let yaml = serde_yaml::to_string(&manifest).map_err(|e| SceneError::Config {
        message: format!("Failed to render manifest: {}", e),
        help: None,
    })?;

    fs::write(&manifest_path, yaml).map_err(|e| SceneError::Io {
        path: manifest_path.clone(),
        message: format!("Failed to write manifest: {}", e),
    })?;

    if !manifest.sources.is_empty() {
        printer.info("Discovered", &manifest.sources.join(", "));
    }
    printer.status(
        "Created",
        &format!(
            "{} ({} found)",
            MANIFEST_FILENAME,
            plural(discovery.scan.total(), "scene", "scenes")
        ),
    );

    Ok(())
}

fn top_level_dir(relative: &Path) -> Option<String> {
    let mut components = relative.components();
    let first = components.next()?;
    // A bare file name has no directory
    components.next()?;
    Some(first.as_os_str().to_string_lossy().into_owned())
}
