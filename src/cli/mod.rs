pub mod check;
pub mod completions;
pub mod export;
pub mod init;
pub mod resources;
pub mod tree;
pub mod watch;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::discovery::{discover, discover_paths, DiscoveryResult};
use crate::error::{Result, SceneError};
use crate::scene::ParseOptions;

/// tscn - Inspect and check Godot text scenes
#[derive(Parser, Debug)]
#[command(name = "tscn")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the node tree of each scene
    Tree(tree::TreeArgs),

    /// Report dangling references, orphans and unused resources
    Check(check::CheckArgs),

    /// List external and inline resources
    Resources(resources::ResourcesArgs),

    /// Write a scene as JSON
    Export(export::ExportArgs),

    /// Re-check scenes whenever they change
    Watch(watch::WatchArgs),

    /// Initialize a project (generates tscn.yaml)
    Init(init::InitArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Parse flags shared by the commands that read scenes.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ParseFlags {
    /// Fail on instance ids with no matching ext_resource
    #[arg(long)]
    pub strict_references: bool,

    /// Fail on nodes declared before their parent
    #[arg(long)]
    pub strict_order: bool,
}

impl ParseFlags {
    /// Manifest options with command-line overrides applied.
    pub fn apply(&self, mut options: ParseOptions) -> ParseOptions {
        options.strict_references |= self.strict_references;
        options.strict_order |= self.strict_order;
        options
    }
}

/// Scenes named on the command line, or the current project when none are.
pub(crate) fn find_scenes(files: &[PathBuf]) -> Result<DiscoveryResult> {
    let discovery = if files.is_empty() {
        discover(".")?
    } else {
        discover_paths(files)?
    };

    if discovery.scan.is_empty() {
        return Err(SceneError::Config {
            message: "No scene files found".to_string(),
            help: Some("Pass .tscn files or run inside a Godot project".to_string()),
        });
    }

    Ok(discovery)
}
