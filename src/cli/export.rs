//! Export command implementation.
//!
//! Serializes a scene (header, resources and nested node tree) as JSON.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::discovery::load_scene;
use crate::error::{Result, SceneError};
use crate::output::{display_path, Printer};
use crate::scene::{ParseOptions, Scene};

use super::ParseFlags;

/// Write a scene as JSON
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Scene file to export
    pub file: PathBuf,

    /// Write to a file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Emit compact JSON on one line
    #[arg(long)]
    pub compact: bool,

    #[command(flatten)]
    pub parse: ParseFlags,
}

/// Run the export command.
pub fn run(args: ExportArgs, printer: &Printer) -> Result<()> {
    let options = args.parse.apply(ParseOptions::default());
    let scene = load_scene(&args.file, &options, None)?;
    let json = to_json(&scene, !args.compact)?;

    match &args.output {
        Some(path) => {
            fs::write(path, format!("{}\n", json)).map_err(|e| SceneError::Io {
                path: path.clone(),
                message: format!("Failed to write export: {}", e),
            })?;
            printer.status(
                "Exported",
                &format!("{} -> {}", display_path(&args.file), display_path(path)),
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Serialize a scene export, pretty-printed or compact.
pub fn to_json(scene: &Scene, pretty: bool) -> Result<String> {
    let export = scene.export();
    let json = if pretty {
        serde_json::to_string_pretty(&export)?
    } else {
        serde_json::to_string(&export)?
    };
    Ok(json)
}
